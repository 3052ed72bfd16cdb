//! End-to-end scenarios against the in-memory ledger

mod support;

use common::ledger::{LedgerError, LedgerGateway, LedgerTransport, MemoryLedger};
use common::registry::{Refreshed, Registry, ViewState};
use support::{id, A, B};

#[tokio::test]
async fn test_register_then_list() {
    let ledger = MemoryLedger::new();
    let gateway = LedgerGateway::new(ledger.clone());

    gateway
        .register_file(&id(A), &id(A), "https://host/f1")
        .await
        .unwrap();

    let files = gateway.list_files(&id(A), &id(A)).await.unwrap();
    assert_eq!(files, vec!["https://host/f1".to_string()]);
}

#[tokio::test]
async fn test_allow_then_disallow_across_identities() {
    let ledger = MemoryLedger::new();
    let gateway = LedgerGateway::new(ledger.clone());
    gateway
        .register_file(&id(A), &id(A), "https://host/f1")
        .await
        .unwrap();

    gateway.set_access(&id(A), &id(B), true).await.unwrap();
    assert_eq!(
        gateway.list_files(&id(B), &id(A)).await.unwrap(),
        vec!["https://host/f1".to_string()]
    );

    gateway.set_access(&id(A), &id(B), false).await.unwrap();
    assert_eq!(
        gateway.list_files(&id(B), &id(A)).await,
        Err(LedgerError::AccessDenied { owner: id(A) })
    );
}

#[tokio::test]
async fn test_two_clients_share_a_ledger() {
    let ledger = MemoryLedger::new();
    let alice = Registry::new(ledger.clone());
    let bob = Registry::new(ledger.clone());
    alice.set_identity(id(A)).await;
    bob.set_identity(id(B)).await;

    alice.add_file("https://host/f1").await.unwrap();
    alice.add_file("https://host/f2").await.unwrap();

    let denied = bob.view_files(id(A)).await.unwrap();
    assert_eq!(denied, Refreshed::Updated(ViewState::Denied { target: id(A) }));

    alice.grant(id(B)).await.unwrap().into_result().unwrap();
    let loaded = bob.view_files(id(A)).await.unwrap();
    assert_eq!(
        loaded,
        Refreshed::Updated(ViewState::Loaded {
            target: id(A),
            files: vec!["https://host/f1".to_string(), "https://host/f2".to_string()],
        })
    );

    alice.revoke(id(B)).await.unwrap().into_result().unwrap();
    let denied = bob.view_files(id(A)).await.unwrap();
    assert_eq!(denied, Refreshed::Updated(ViewState::Denied { target: id(A) }));
    assert!(bob.cache().view().files().is_empty());
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let (registry, ledger) = support::connected(A).await;
    ledger.add(&id(A), &id(A), "https://host/f1").await.unwrap();
    ledger.add(&id(A), &id(A), "https://host/f2").await.unwrap();

    let first = registry.refresh_own_files().await.unwrap();
    let second = registry.refresh_own_files().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        registry.cache().own_files(),
        Some(&["https://host/f1".to_string(), "https://host/f2".to_string()][..])
    );
}

#[tokio::test]
async fn test_files_owned_by_someone_else_are_not_own_files() {
    // the contract lets any caller add to any owner's list
    let (registry, ledger) = support::connected(A).await;
    ledger.add(&id(B), &id(A), "https://host/gift").await.unwrap();

    let files = registry.refresh_own_files().await.unwrap();
    assert_eq!(files, Refreshed::Updated(vec!["https://host/gift".to_string()]));
}
