use clap::Args;

use common::identity::Identity;
use common::ledger::LedgerError;

use super::render_change;

#[derive(Args, Debug, Clone)]
pub struct Allow {
    /// Identity to grant read access to
    pub user: Identity,
}

#[derive(Debug, thiserror::Error)]
pub enum AccessAllowError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Allow {
    type Error = AccessAllowError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.connect().await?;
        let change = ctx.registry.grant(self.user.clone()).await?;
        Ok(render_change(change)?)
    }
}
