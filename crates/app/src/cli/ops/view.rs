use clap::Args;

use common::identity::Identity;
use common::ledger::LedgerError;
use common::registry::{Refreshed, ViewState};

use super::files::render_files;

#[derive(Args, Debug, Clone)]
pub struct View {
    /// Identity whose files to list
    pub owner: Identity,
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("failed to load files of {0}: {1}")]
    Transport(Identity, String),
}

/// Render a settled view. Transport failures are reported as errors.
pub fn render_view(state: &ViewState) -> Result<String, ViewError> {
    match state {
        ViewState::Unqueried => Ok("No identity viewed".to_string()),
        ViewState::Loading { target } => Ok(format!("Loading files of {}...", target.short())),
        ViewState::Loaded { target, files } if files.is_empty() => {
            Ok(format!("{} has not registered any files", target.short()))
        }
        ViewState::Loaded { target, files } => {
            Ok(format!("Files of {}:\n{}", target.short(), render_files(files)))
        }
        ViewState::Denied { target } => Ok(format!(
            "Access denied: {} has not shared their files with you",
            target.short()
        )),
        ViewState::TransportError { target, reason } => {
            Err(ViewError::Transport(target.clone(), reason.clone()))
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for View {
    type Error = ViewError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.connect().await?;

        match ctx.registry.view_files(self.owner.clone()).await? {
            Refreshed::Updated(state) => render_view(&state),
            Refreshed::Disconnected => Err(LedgerError::Unauthenticated.into()),
            Refreshed::Superseded => render_view(ctx.registry.cache().view()),
        }
    }
}
