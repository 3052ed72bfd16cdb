//! Identity transitions and the cancellation boundary they form

mod support;

use async_trait::async_trait;
use common::identity::Identity;
use common::ledger::LedgerTransport;
use common::registry::{event_channel, Refreshed, RegistryEvent, ViewState};
use common::testkit::LedgerCall;
use common::upload::{UploadError, Uploader};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use support::{id, A, B, C};

#[tokio::test]
async fn test_logout_clears_caller_scoped_slots() {
    let (registry, ledger) = support::connected(A).await;
    registry.add_file("https://host/a1").await.unwrap();
    registry.grant(id(C)).await.unwrap();

    ledger.add(&id(B), &id(B), "https://host/b1").await.unwrap();
    let sync = registry.set_identity(id(B)).await;
    assert!(sync.changed);
    assert_eq!(
        registry.cache().own_files(),
        Some(&["https://host/b1".to_string()][..])
    );
    assert_eq!(registry.cache().grants(), Some(&[][..]));

    let sync = registry.set_identity(Identity::none()).await;
    assert_eq!(sync.files, Ok(Refreshed::Disconnected));
    assert_eq!(sync.grants, Ok(Refreshed::Disconnected));

    let cache = registry.cache();
    assert_eq!(cache.own_files(), None);
    assert_eq!(cache.grants(), None);
    assert_eq!(cache.view(), &ViewState::Unqueried);
}

#[tokio::test]
async fn test_no_stale_listing_under_new_identity() {
    let (registry, _) = support::connected(A).await;
    registry.add_file("https://host/a1").await.unwrap();

    registry.set_identity(id(B)).await;
    assert_eq!(registry.cache().own_files(), Some(&[][..]));
}

#[tokio::test]
async fn test_late_result_for_previous_identity_is_dropped() {
    let (registry, ledger) = support::gated();
    ledger.ledger().add(&id(A), &id(A), "https://host/a1").await.unwrap();
    ledger.ledger().add(&id(B), &id(B), "https://host/b1").await.unwrap();
    registry.set_identity(id(A)).await;

    let mut gate = ledger.hold(LedgerCall::display(A, A));
    let task = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.refresh_own_files().await })
    };
    gate.arrived().await;

    registry.set_identity(id(B)).await;
    gate.release();

    let late = task.await.unwrap().unwrap();
    assert!(late.is_superseded());
    assert_eq!(
        registry.cache().own_files(),
        Some(&["https://host/b1".to_string()][..])
    );
}

#[tokio::test]
async fn test_late_grants_for_previous_identity_are_dropped() {
    let (registry, ledger) = support::gated();
    registry.set_identity(id(A)).await;

    let mut gate = ledger.hold(LedgerCall::share_access(A));
    let task = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.grant(id(C)).await })
    };
    gate.arrived().await;

    registry.set_identity(Identity::none()).await;
    gate.release();

    let change = task.await.unwrap().unwrap();
    assert_eq!(change.mutation, Ok(()));
    assert_eq!(change.grants, Ok(Refreshed::Superseded));
    assert_eq!(registry.cache().grants(), None);
}

#[tokio::test]
async fn test_later_settle_wins_within_an_identity() {
    let (registry, ledger) = support::gated();
    registry.set_identity(id(A)).await;

    let mut gate = ledger.hold(LedgerCall::display(A, A));
    let first = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.refresh_own_files().await })
    };
    gate.arrived().await;

    // issued second, settles first
    assert_eq!(registry.refresh_own_files().await, Ok(Refreshed::Updated(vec![])));

    ledger.ledger().add(&id(A), &id(A), "https://host/a1").await.unwrap();
    gate.release();

    let first = first.await.unwrap().unwrap();
    assert_eq!(first, Refreshed::Updated(vec!["https://host/a1".to_string()]));
    assert_eq!(
        registry.cache().own_files(),
        Some(&["https://host/a1".to_string()][..])
    );
}

#[tokio::test]
async fn test_identity_events_drive_refresh() {
    let (registry, ledger) = support::gated();
    ledger.ledger().add(&id(B), &id(B), "https://host/b1").await.unwrap();
    let (tx, rx) = event_channel();
    let coordinator = tokio::spawn(registry.clone().run(rx));

    tx.send(RegistryEvent::IdentityChanged(id(A))).unwrap();
    tx.send(RegistryEvent::IdentityChanged(id(B))).unwrap();
    drop(tx);
    coordinator.await.unwrap();

    assert_eq!(registry.identity(), id(B));
    assert_eq!(
        registry.cache().own_files(),
        Some(&["https://host/b1".to_string()][..])
    );

    let calls = ledger.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|call| !call.is_mutation()));
    assert!(calls.contains(&LedgerCall::display(B, B)));
    assert!(calls.contains(&LedgerCall::share_access(B)));
}

/// Uploader that signals when an upload starts and waits to be released.
#[derive(Debug)]
struct HeldUploader {
    started: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<Option<oneshot::Receiver<()>>>,
}

impl HeldUploader {
    fn new() -> (Self, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let uploader = Self {
            started: Mutex::new(Some(started_tx)),
            release: Mutex::new(Some(release_rx)),
        };
        (uploader, started_rx, release_tx)
    }
}

#[async_trait]
impl Uploader for HeldUploader {
    async fn upload(&self, name: &str, _data: Vec<u8>) -> Result<String, UploadError> {
        let started = self.started.lock().take();
        if let Some(started) = started {
            let _ = started.send(());
        }
        let release = self.release.lock().take();
        if let Some(release) = release {
            let _ = release.await;
        }
        Ok(format!("https://gw/ipfs/{}", name))
    }
}

#[tokio::test]
async fn test_upload_is_not_registered_after_identity_change() {
    let (registry, ledger) = support::connected(A).await;
    let (uploader, started, release) = HeldUploader::new();

    let task = {
        let registry = registry.clone();
        tokio::spawn(async move {
            registry
                .upload_and_add(&uploader, "a-secret.pdf", b"pdf".to_vec())
                .await
        })
    };
    started.await.unwrap();

    registry.set_identity(id(B)).await;
    let calls = ledger.call_count();
    release.send(()).unwrap();

    let result = task.await.unwrap().unwrap();
    assert!(result.is_superseded());
    // no mutation was issued after the switch
    assert_eq!(ledger.call_count(), calls);
    assert!(ledger.display(&id(A), &id(A)).await.unwrap().is_empty());
    assert!(ledger.display(&id(B), &id(B)).await.unwrap().is_empty());
    assert_eq!(registry.cache().own_files(), Some(&[][..]));
}
