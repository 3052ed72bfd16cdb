//! # Registry
//!
//! The [`Registry`] is the single coordinator owning client-side state: the
//! active identity, its [`Epoch`], and the [`RegistryCache`] rendered by the
//! presentation layer. State only changes through the workflow operations
//! defined here and in the submodules:
//!
//! - identity transitions ([`Registry::set_identity`], or
//!   [`RegistryEvent`]s fed to [`Registry::run`])
//! - cache refreshes (`refresh_own_files`, `refresh_grants`,
//!   `refresh_other_files`)
//! - file registration (`add_file`, `upload_and_add`)
//! - the access workflow (`grant`, `revoke`)
//! - the cross-identity viewer (`view_files`)
//!
//! ## Consistency
//!
//! Every query result is a snapshot that may already be stale by the time it
//! lands. Writes into the cache follow two rules:
//!
//! - a result computed under an older epoch is dropped, so nothing fetched
//!   for a previous identity ever appears under the current one
//! - within an epoch the last response to settle wins its slot, except the
//!   cross-identity view, where only the most recently issued query may
//!   write
//!
//! No lock is held across a ledger call; mutations are never retried.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::identity::{Epoch, Identity, IdentitySnapshot};
use crate::ledger::{AccessGrant, LedgerError, LedgerGateway, LedgerTransport};
use crate::upload::UploadError;

mod access;
mod cache;
mod files;
mod viewer;

pub use access::AccessChange;
pub use cache::{RegistryCache, ViewState, ViewTicket};
pub use files::FileAdded;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Inbound messages from the identity/session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// The wallet switched accounts; an empty identity means logged out
    IdentityChanged(Identity),
}

/// Outcome of a refresh that may have been overtaken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refreshed<T> {
    /// The slot now holds this value
    Updated(T),
    /// No identity is active; nothing was queried
    Disconnected,
    /// The identity changed, or a newer query was issued, while this one
    /// was in flight. The result was dropped.
    Superseded,
}

impl<T> Refreshed<T> {
    pub fn updated(self) -> Option<T> {
        match self {
            Refreshed::Updated(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Refreshed::Superseded)
    }
}

/// Result of an identity transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySync {
    pub identity: Identity,
    pub epoch: Epoch,
    /// Whether the transition actually changed the identity
    pub changed: bool,
    pub files: Result<Refreshed<Vec<String>>, LedgerError>,
    pub grants: Result<Refreshed<Vec<AccessGrant>>, LedgerError>,
}

#[derive(Debug, Default)]
struct RegistryState {
    identity: IdentitySnapshot,
    cache: RegistryCache,
}

/// Coordinator for the client's view of the ledger.
#[derive(Debug)]
pub struct Registry<T> {
    gateway: LedgerGateway<T>,
    state: Arc<Mutex<RegistryState>>,
}

impl<T> Clone for Registry<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            state: self.state.clone(),
        }
    }
}

/// Create the channel the identity provider pushes [`RegistryEvent`]s on.
pub fn event_channel() -> (flume::Sender<RegistryEvent>, flume::Receiver<RegistryEvent>) {
    flume::unbounded()
}

impl<T: LedgerTransport> Registry<T> {
    /// Create a disconnected registry
    pub fn new(transport: T) -> Self {
        Self {
            gateway: LedgerGateway::new(transport),
            state: Arc::new(Mutex::new(RegistryState::default())),
        }
    }

    /// The active identity (empty when disconnected)
    pub fn identity(&self) -> Identity {
        self.state.lock().identity.identity.clone()
    }

    pub fn snapshot(&self) -> IdentitySnapshot {
        self.state.lock().identity.clone()
    }

    /// A copy of the cache for rendering
    pub fn cache(&self) -> RegistryCache {
        self.state.lock().cache.clone()
    }

    /// Request activation of `identity`, as a wallet connect would.
    pub async fn activate(&self, identity: Identity) -> IdentitySync {
        self.set_identity(identity).await
    }

    /// Switch the active identity.
    ///
    /// Caller-scoped slots are cleared and the epoch advanced before this
    /// returns control to any other workflow, then own files and grants
    /// are refreshed for the new identity. Re-announcing the identity that
    /// is already active keeps the epoch and cache and only refreshes.
    pub async fn set_identity(&self, identity: Identity) -> IdentitySync {
        let (snapshot, changed) = {
            let mut state = self.state.lock();
            if state.identity.identity == identity {
                (state.identity.clone(), false)
            } else {
                let previous = std::mem::replace(&mut state.identity.identity, identity);
                state.identity.epoch = state.identity.epoch.next();
                state.cache.clear();
                tracing::info!(
                    from = %previous,
                    to = %state.identity.identity,
                    epoch = %state.identity.epoch,
                    "active identity changed"
                );
                (state.identity.clone(), true)
            }
        };

        let (files, grants) = futures::future::join(
            self.refresh_own_files_for(&snapshot),
            self.refresh_grants_for(&snapshot),
        )
        .await;

        IdentitySync {
            identity: snapshot.identity,
            epoch: snapshot.epoch,
            changed,
            files,
            grants,
        }
    }

    /// Process identity events until every sender is dropped.
    ///
    /// Events are handled one at a time, so transitions apply in the order
    /// the provider emitted them.
    pub async fn run(self, receiver: flume::Receiver<RegistryEvent>) {
        tracing::info!("registry coordinator started");

        while let Ok(event) = receiver.recv_async().await {
            tracing::debug!(?event, "received registry event");
            match event {
                RegistryEvent::IdentityChanged(identity) => {
                    let sync = self.set_identity(identity).await;
                    if let Err(e) = &sync.files {
                        tracing::warn!(identity = %sync.identity, "failed to refresh files: {}", e);
                    }
                    if let Err(e) = &sync.grants {
                        tracing::warn!(identity = %sync.identity, "failed to refresh access list: {}", e);
                    }
                }
            }
        }

        tracing::info!("registry coordinator stopped");
    }

    /// Re-query the caller's own files.
    ///
    /// On failure the previous listing stays in place and the error is
    /// returned.
    pub async fn refresh_own_files(&self) -> Result<Refreshed<Vec<String>>, LedgerError> {
        let snapshot = self.snapshot();
        self.refresh_own_files_for(&snapshot).await
    }

    /// Re-query the grants the caller has handed out.
    pub async fn refresh_grants(&self) -> Result<Refreshed<Vec<AccessGrant>>, LedgerError> {
        let snapshot = self.snapshot();
        self.refresh_grants_for(&snapshot).await
    }

    async fn refresh_own_files_for(
        &self,
        snapshot: &IdentitySnapshot,
    ) -> Result<Refreshed<Vec<String>>, LedgerError> {
        if !snapshot.is_connected() {
            return Ok(Refreshed::Disconnected);
        }

        let result = self
            .gateway
            .list_files(&snapshot.identity, &snapshot.identity)
            .await;

        let mut state = self.state.lock();
        if state.identity.epoch != snapshot.epoch {
            tracing::warn!(
                identity = %snapshot.identity,
                "dropping file listing fetched for a previous identity"
            );
            return Ok(Refreshed::Superseded);
        }

        let files = result?;
        state.cache.replace_own_files(files.clone());
        tracing::debug!(identity = %snapshot.identity, count = files.len(), "own files refreshed");
        Ok(Refreshed::Updated(files))
    }

    async fn refresh_grants_for(
        &self,
        snapshot: &IdentitySnapshot,
    ) -> Result<Refreshed<Vec<AccessGrant>>, LedgerError> {
        if !snapshot.is_connected() {
            return Ok(Refreshed::Disconnected);
        }

        let result = self.gateway.list_grants(&snapshot.identity).await;

        let mut state = self.state.lock();
        if state.identity.epoch != snapshot.epoch {
            tracing::warn!(
                identity = %snapshot.identity,
                "dropping access list fetched for a previous identity"
            );
            return Ok(Refreshed::Superseded);
        }

        let grants = result?;
        state.cache.replace_grants(grants.clone());
        tracing::debug!(identity = %snapshot.identity, count = grants.len(), "access list refreshed");
        Ok(Refreshed::Updated(grants))
    }

    /// Snapshot the active identity, failing if there is none.
    fn connected_snapshot(&self) -> Result<IdentitySnapshot, LedgerError> {
        let snapshot = self.snapshot();
        if !snapshot.is_connected() {
            return Err(LedgerError::Unauthenticated);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;

    #[tokio::test]
    async fn test_starts_disconnected() {
        let registry = Registry::new(MemoryLedger::new());
        assert!(registry.identity().is_empty());
        assert_eq!(registry.refresh_own_files().await, Ok(Refreshed::Disconnected));
        assert_eq!(registry.refresh_grants().await, Ok(Refreshed::Disconnected));
        assert_eq!(registry.cache(), RegistryCache::new());
    }

    #[tokio::test]
    async fn test_set_identity_refreshes() {
        let ledger = MemoryLedger::new();
        let a = Identity::from("0xA");
        ledger.add(&a, &a, "https://host/f1").await.unwrap();

        let registry = Registry::new(ledger);
        let sync = registry.set_identity(a.clone()).await;

        assert!(sync.changed);
        assert_eq!(sync.epoch.value(), 1);
        assert_eq!(
            sync.files,
            Ok(Refreshed::Updated(vec!["https://host/f1".to_string()]))
        );
        assert_eq!(sync.grants, Ok(Refreshed::Updated(vec![])));
        assert_eq!(
            registry.cache().own_files(),
            Some(&["https://host/f1".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_same_identity_keeps_epoch() {
        let ledger = MemoryLedger::new();
        let registry = Registry::new(ledger.clone());
        let a = Identity::from("0xA");

        registry.set_identity(a.clone()).await;
        registry.view_files(Identity::from("0xA")).await.unwrap();
        let calls = ledger.call_count();

        let sync = registry.set_identity(a).await;
        assert!(!sync.changed);
        assert_eq!(sync.epoch.value(), 1);
        // refreshed again, but the view survives
        assert_eq!(ledger.call_count(), calls + 2);
        assert!(registry.cache().view().is_terminal());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_listing() {
        let ledger = MemoryLedger::new();
        let a = Identity::from("0xA");
        ledger.add(&a, &a, "https://host/f1").await.unwrap();

        let registry = Registry::new(ledger.clone());
        registry.set_identity(a).await;

        ledger.set_reachable(false);
        assert!(matches!(
            registry.refresh_own_files().await,
            Err(LedgerError::Unreachable(_))
        ));
        assert!(registry.refresh_grants().await.is_err());

        let cache = registry.cache();
        assert_eq!(cache.own_files(), Some(&["https://host/f1".to_string()][..]));
        assert_eq!(cache.grants(), Some(&[][..]));
    }

    #[tokio::test]
    async fn test_run_applies_events_in_order() {
        let ledger = MemoryLedger::new();
        let registry = Registry::new(ledger);
        let (tx, rx) = event_channel();

        let handle = tokio::spawn(registry.clone().run(rx));
        tx.send(RegistryEvent::IdentityChanged(Identity::from("0xA")))
            .unwrap();
        tx.send(RegistryEvent::IdentityChanged(Identity::from("0xB")))
            .unwrap();
        drop(tx);
        handle.await.unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.identity, Identity::from("0xB"));
        assert_eq!(snapshot.epoch.value(), 2);
        assert_eq!(registry.cache().own_files(), Some(&[][..]));
    }
}
