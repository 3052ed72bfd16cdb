//! Shared setup for registry integration tests
#![allow(dead_code)]

use common::identity::Identity;
use common::ledger::MemoryLedger;
use common::registry::Registry;
use common::testkit::GatedLedger;

pub const A: &str = "0xA";
pub const B: &str = "0xB";
pub const C: &str = "0xC";

/// Route registry logs to the test harness; set RUST_LOG to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn id(address: &str) -> Identity {
    Identity::from(address)
}

/// A registry over a fresh in-memory ledger, connected as `identity`
pub async fn connected(identity: &str) -> (Registry<MemoryLedger>, MemoryLedger) {
    init_tracing();
    let ledger = MemoryLedger::new();
    let registry = Registry::new(ledger.clone());
    registry.set_identity(id(identity)).await;
    (registry, ledger)
}

/// A registry over a gated ledger, still disconnected
pub fn gated() -> (Registry<GatedLedger>, GatedLedger) {
    init_tracing();
    let ledger = GatedLedger::new(MemoryLedger::new());
    (Registry::new(ledger.clone()), ledger)
}

/// Let spawned tasks run until they block on a gate
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
