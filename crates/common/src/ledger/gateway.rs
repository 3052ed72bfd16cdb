use crate::identity::Identity;

use super::{AccessGrant, LedgerError, LedgerTransport};

/// Typed access to the four logical ledger operations.
///
/// Input validation happens here, before the transport is touched, so an
/// `Unauthenticated` or `InvalidInput` error guarantees no call was issued.
#[derive(Debug, Clone)]
pub struct LedgerGateway<T> {
    transport: T,
}

fn require_caller(caller: &Identity) -> Result<(), LedgerError> {
    if caller.is_empty() {
        return Err(LedgerError::Unauthenticated);
    }
    Ok(())
}

impl<T: LedgerTransport> LedgerGateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Query the files owned by `owner` on behalf of `caller`.
    ///
    /// `owner` may be the caller or anyone else; authorization is the
    /// ledger's call, surfaced as `LedgerError::AccessDenied`.
    pub async fn list_files(
        &self,
        caller: &Identity,
        owner: &Identity,
    ) -> Result<Vec<String>, LedgerError> {
        require_caller(caller)?;
        if owner.is_empty() {
            return Err(LedgerError::InvalidInput("owner"));
        }

        tracing::debug!(%caller, %owner, "querying files");
        self.transport.display(caller, owner).await
    }

    /// Query the grants `caller` has handed out to others.
    pub async fn list_grants(&self, caller: &Identity) -> Result<Vec<AccessGrant>, LedgerError> {
        require_caller(caller)?;

        tracing::debug!(%caller, "querying access list");
        self.transport.share_access(caller).await
    }

    /// Register `url` as a file owned by `owner`.
    pub async fn register_file(
        &self,
        caller: &Identity,
        owner: &Identity,
        url: &str,
    ) -> Result<(), LedgerError> {
        require_caller(caller)?;
        if owner.is_empty() {
            return Err(LedgerError::InvalidInput("owner"));
        }
        if url.trim().is_empty() {
            return Err(LedgerError::InvalidInput("url"));
        }

        tracing::info!(%caller, %owner, url, "registering file");
        self.transport.add(caller, owner, url).await
    }

    /// Allow or disallow `grantee` from reading the caller's files.
    ///
    /// The contract exposes two entry points; which one runs is picked by
    /// `allow`.
    pub async fn set_access(
        &self,
        caller: &Identity,
        grantee: &Identity,
        allow: bool,
    ) -> Result<(), LedgerError> {
        require_caller(caller)?;
        if grantee.is_empty() {
            return Err(LedgerError::InvalidInput("grantee"));
        }

        tracing::info!(%caller, %grantee, allow, "updating access");
        if allow {
            self.transport.allow(caller, grantee).await
        } else {
            self.transport.disallow(caller, grantee).await
        }
    }
}
