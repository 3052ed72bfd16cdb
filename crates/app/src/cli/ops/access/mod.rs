use clap::{Args, Subcommand};

use common::ledger::{AccessGrant, LedgerError};
use common::registry::AccessChange;

pub mod allow;
pub mod disallow;
pub mod ls;

use crate::cli::op::Op;

crate::command_enum! {
    (Ls, ls::Ls),
    (Allow, allow::Allow),
    (Disallow, disallow::Disallow),
}

// Rename the generated Command to AccessCommand for clarity
pub type AccessCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Access {
    #[command(subcommand)]
    pub command: AccessCommand,
}

#[async_trait::async_trait]
impl Op for Access {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

/// The access list as the ledger returned it, duplicates included.
pub fn render_grants(grants: &[AccessGrant]) -> String {
    if grants.is_empty() {
        return "No access granted".to_string();
    }
    grants
        .iter()
        .map(|grant| {
            let status = if grant.access { "Allowed" } else { "Revoked" };
            format!("{} — {}", grant.user.short(), status)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outcome of an allow or disallow.
///
/// Only a failed mutation is an error. The access list is re-read after
/// the mutation either way; if that read fails the change still stands, so
/// the failure is reported inline.
pub fn render_change(change: AccessChange) -> Result<String, LedgerError> {
    change.mutation?;

    let action = if change.allow { "Allowed" } else { "Revoked" };
    let header = format!("{} {}", action, change.grantee.short());
    Ok(match change.grants {
        Ok(refreshed) => match refreshed.updated() {
            Some(grants) => format!("{}\n{}", header, render_grants(&grants)),
            None => header,
        },
        Err(e) => format!("{} (failed to refresh access list: {})", header, e),
    })
}
