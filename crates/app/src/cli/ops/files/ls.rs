use clap::Args;

use common::ledger::LedgerError;

use super::render_files;

#[derive(Args, Debug, Clone)]
pub struct Ls;

#[derive(Debug, thiserror::Error)]
pub enum FilesLsError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = FilesLsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let sync = ctx.connect().await?;
        let files = sync.files?.updated().unwrap_or_default();

        Ok(format!(
            "Files of {}:\n{}",
            sync.identity.short(),
            render_files(&files)
        ))
    }
}
