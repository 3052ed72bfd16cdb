//! # Ledger
//!
//! The ledger is the authoritative store for file ownership and access
//! grants. We only ever reach it through two kinds of calls:
//!
//! - **queries**, which have no side effects and may be served by any
//!   up-to-date replica
//! - **mutations**, which are ordered, finalized externally and
//!   irreversible once accepted
//!
//! [`LedgerTransport`] mirrors the raw entry points the registry contract
//! exposes. [`LedgerGateway`] is the typed wrapper the rest of the client
//! talks to: it validates inputs before touching the network and folds the
//! contract's separate allow/disallow entry points into one `set_access`.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

mod gateway;
pub mod memory;

pub use gateway::LedgerGateway;
pub use memory::MemoryLedger;

/// Everything that can go wrong talking to the ledger.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No identity is active for an operation that needs one
    #[error("no active identity; connect a wallet first")]
    Unauthenticated,
    /// A required field was empty
    #[error("invalid input: {0} must not be empty")]
    InvalidInput(&'static str),
    /// The ledger refused a query for files the caller may not read
    #[error("access denied to files of {owner}")]
    AccessDenied { owner: Identity },
    /// A mutation was declined by the signer or the ledger
    #[error("transaction rejected: {0}")]
    Rejected(String),
    /// Network or transport failure
    #[error("ledger unreachable: {0}")]
    Unreachable(String),
}

/// A read grant from the caller to another identity.
///
/// The ledger keeps one entry per grantee and flips `access` in place, but
/// the client mirrors whatever list it gets back without deduplicating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessGrant {
    pub user: Identity,
    pub access: bool,
}

impl AccessGrant {
    pub fn new(user: impl Into<Identity>, access: bool) -> Self {
        Self {
            user: user.into(),
            access,
        }
    }
}

/// Raw entry points of the registry contract.
///
/// Every call is made on behalf of `caller`. Implementations enforce
/// authorization themselves; the client never second-guesses them.
#[async_trait]
pub trait LedgerTransport: Send + Sync + Debug + 'static {
    /// List the file URLs owned by `owner`, in insertion order.
    ///
    /// Should fail with `LedgerError::AccessDenied` when `owner` is not the
    /// caller and has not granted the caller access.
    async fn display(&self, caller: &Identity, owner: &Identity) -> Result<Vec<String>, LedgerError>;

    /// List the grants the caller has handed out.
    async fn share_access(&self, caller: &Identity) -> Result<Vec<AccessGrant>, LedgerError>;

    /// Append `url` to the files owned by `owner`.
    async fn add(&self, caller: &Identity, owner: &Identity, url: &str) -> Result<(), LedgerError>;

    /// Allow `user` to read the caller's files.
    async fn allow(&self, caller: &Identity, user: &Identity) -> Result<(), LedgerError>;

    /// Revoke `user`'s read access to the caller's files.
    async fn disallow(&self, caller: &Identity, user: &Identity) -> Result<(), LedgerError>;
}

#[async_trait]
impl<T: LedgerTransport + ?Sized> LedgerTransport for std::sync::Arc<T> {
    async fn display(&self, caller: &Identity, owner: &Identity) -> Result<Vec<String>, LedgerError> {
        (**self).display(caller, owner).await
    }

    async fn share_access(&self, caller: &Identity) -> Result<Vec<AccessGrant>, LedgerError> {
        (**self).share_access(caller).await
    }

    async fn add(&self, caller: &Identity, owner: &Identity, url: &str) -> Result<(), LedgerError> {
        (**self).add(caller, owner, url).await
    }

    async fn allow(&self, caller: &Identity, user: &Identity) -> Result<(), LedgerError> {
        (**self).allow(caller, user).await
    }

    async fn disallow(&self, caller: &Identity, user: &Identity) -> Result<(), LedgerError> {
        (**self).disallow(caller, user).await
    }
}
