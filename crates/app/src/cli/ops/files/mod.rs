use clap::{Args, Subcommand};

pub mod add;
pub mod ls;
pub mod upload;

use crate::cli::op::Op;

crate::command_enum! {
    (Ls, ls::Ls),
    (Add, add::Add),
    (Upload, upload::Upload),
}

// Rename the generated Command to FilesCommand for clarity
pub type FilesCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Files {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[async_trait::async_trait]
impl Op for Files {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

/// One file URL per line, in ledger order.
pub fn render_files(files: &[String]) -> String {
    if files.is_empty() {
        return "No files registered".to_string();
    }
    files
        .iter()
        .enumerate()
        .map(|(i, url)| format!("{:>3}. {}", i + 1, url))
        .collect::<Vec<_>>()
        .join("\n")
}
