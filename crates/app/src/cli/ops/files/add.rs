use clap::Args;

use common::ledger::LedgerError;
use common::registry::FileAdded;

use super::render_files;

#[derive(Args, Debug, Clone)]
pub struct Add {
    /// URL of the file to register under the active identity
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FilesAddError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Confirmation plus the listing fetched after the mutation.
///
/// A failed follow-up refresh does not undo the registration, so it is
/// reported inline rather than as an error.
pub fn render_added(added: &FileAdded) -> String {
    match &added.files {
        Ok(refreshed) => match refreshed.clone().updated() {
            Some(files) => format!("Saved {} to the ledger\n{}", added.url, render_files(&files)),
            None => format!("Saved {} to the ledger", added.url),
        },
        Err(e) => format!(
            "Saved {} to the ledger (failed to refresh files: {})",
            added.url, e
        ),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Add {
    type Error = FilesAddError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.connect().await?;
        let added = ctx.registry.add_file(&self.url).await?;
        Ok(render_added(&added))
    }
}
