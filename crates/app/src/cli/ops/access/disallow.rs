use clap::Args;

use common::identity::Identity;
use common::ledger::LedgerError;

use super::render_change;

#[derive(Args, Debug, Clone)]
pub struct Disallow {
    /// Identity whose read access to revoke
    pub user: Identity,
}

#[derive(Debug, thiserror::Error)]
pub enum AccessDisallowError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Disallow {
    type Error = AccessDisallowError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.connect().await?;
        let change = ctx.registry.revoke(self.user.clone()).await?;
        Ok(render_change(change)?)
    }
}
