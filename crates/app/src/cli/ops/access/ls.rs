use clap::Args;

use common::ledger::LedgerError;

use super::render_grants;

#[derive(Args, Debug, Clone)]
pub struct Ls;

#[derive(Debug, thiserror::Error)]
pub enum AccessLsError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = AccessLsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let sync = ctx.connect().await?;
        let grants = sync.grants?.updated().unwrap_or_default();
        Ok(render_grants(&grants))
    }
}
