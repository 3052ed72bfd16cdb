use std::path::PathBuf;

use clap::Args;

use common::ledger::LedgerError;
use common::registry::{Refreshed, RegistryError};
use filereg::pinning::PinataUploader;
use filereg::state::StateError;

use super::add::render_added;

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// Path to the file to pin and register
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum FilesUploadError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("config error: {0}")]
    State(#[from] StateError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = FilesUploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let uploader = PinataUploader::from_config(&ctx.config)?;

        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unnamed".to_string());
        let data = tokio::fs::read(&self.path).await?;

        ctx.connect().await?;
        match ctx.registry.upload_and_add(&uploader, &name, data).await? {
            Refreshed::Updated(added) => Ok(render_added(&added)),
            _ => Ok(format!(
                "Uploaded {} but the identity changed before it was registered",
                name
            )),
        }
    }
}
