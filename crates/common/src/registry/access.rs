use crate::identity::Identity;
use crate::ledger::{AccessGrant, LedgerError, LedgerTransport};

use super::{Refreshed, Registry};

/// Outcome of a grant or revoke.
///
/// The access list is always re-queried after the mutation, whether it
/// succeeded or not, so both outcomes are reported side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessChange {
    pub grantee: Identity,
    pub allow: bool,
    pub mutation: Result<(), LedgerError>,
    pub grants: Result<Refreshed<Vec<AccessGrant>>, LedgerError>,
}

impl AccessChange {
    /// Collapse into the mutation's outcome, yielding the refreshed access
    /// list on success.
    pub fn into_result(self) -> Result<Refreshed<Vec<AccessGrant>>, LedgerError> {
        self.mutation?;
        self.grants
    }
}

impl<T: LedgerTransport> Registry<T> {
    /// Allow `grantee` to read the caller's files.
    pub async fn grant(&self, grantee: Identity) -> Result<AccessChange, LedgerError> {
        self.change_access(grantee, true).await
    }

    /// Revoke `grantee`'s read access to the caller's files.
    pub async fn revoke(&self, grantee: Identity) -> Result<AccessChange, LedgerError> {
        self.change_access(grantee, false).await
    }

    /// Errors in the returned `Result` are validation failures, raised
    /// before anything reaches the ledger. Ledger outcomes are reported in
    /// the [`AccessChange`].
    async fn change_access(
        &self,
        grantee: Identity,
        allow: bool,
    ) -> Result<AccessChange, LedgerError> {
        let snapshot = self.connected_snapshot()?;
        if grantee.is_empty() {
            return Err(LedgerError::InvalidInput("grantee"));
        }

        let mutation = self
            .gateway
            .set_access(&snapshot.identity, &grantee, allow)
            .await;
        match &mutation {
            Ok(()) if allow => tracing::info!(%grantee, "access allowed"),
            Ok(()) => tracing::info!(%grantee, "access removed"),
            Err(e) => tracing::warn!(%grantee, allow, "access change failed: {}", e),
        }

        // no optimistic update: the list shown is whatever the ledger says now
        let grants = self.refresh_grants_for(&snapshot).await;

        Ok(AccessChange {
            grantee,
            allow,
            mutation,
            grants,
        })
    }
}
