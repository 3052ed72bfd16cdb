//! Test helpers for driving the registry against a scripted ledger.
//!
//! [`GatedLedger`] wraps a [`MemoryLedger`], records every call that
//! reaches it and can hold individual calls in flight until the test
//! releases them. That is enough to reproduce the interleavings the
//! registry has to survive: responses landing after an identity switch,
//! or after a newer query for the same slot.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::identity::Identity;
use crate::ledger::{AccessGrant, LedgerError, LedgerTransport, MemoryLedger};

/// A call as it reached the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    Display { caller: Identity, owner: Identity },
    ShareAccess { caller: Identity },
    Add { caller: Identity, owner: Identity, url: String },
    Allow { caller: Identity, user: Identity },
    Disallow { caller: Identity, user: Identity },
}

impl LedgerCall {
    pub fn display(caller: &str, owner: &str) -> Self {
        Self::Display {
            caller: caller.into(),
            owner: owner.into(),
        }
    }

    pub fn share_access(caller: &str) -> Self {
        Self::ShareAccess {
            caller: caller.into(),
        }
    }

    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Add { .. } | Self::Allow { .. } | Self::Disallow { .. }
        )
    }
}

struct Hold {
    call: LedgerCall,
    arrived: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// Handle on a held call.
pub struct Gate {
    arrived: Option<oneshot::Receiver<()>>,
    release: oneshot::Sender<()>,
}

impl Gate {
    /// Wait until the held call has reached the ledger
    pub async fn arrived(&mut self) {
        if let Some(rx) = self.arrived.take() {
            let _ = rx.await;
        }
    }

    /// Let the held call proceed
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

#[derive(Clone, Default)]
pub struct GatedLedger {
    inner: MemoryLedger,
    calls: Arc<Mutex<Vec<LedgerCall>>>,
    holds: Arc<Mutex<Vec<Hold>>>,
}

impl std::fmt::Debug for GatedLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatedLedger")
            .field("inner", &self.inner)
            .field("calls", &self.calls.lock().len())
            .field("holds", &self.holds.lock().len())
            .finish()
    }
}

impl GatedLedger {
    pub fn new(inner: MemoryLedger) -> Self {
        Self {
            inner,
            calls: Arc::default(),
            holds: Arc::default(),
        }
    }

    /// The wrapped ledger, for seeding state behind the registry's back
    pub fn ledger(&self) -> &MemoryLedger {
        &self.inner
    }

    /// Every call received so far, in arrival order
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Hold the next call equal to `call` until the returned gate is
    /// released.
    pub fn hold(&self, call: LedgerCall) -> Gate {
        let (arrived_tx, arrived_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.holds.lock().push(Hold {
            call,
            arrived: arrived_tx,
            release: release_rx,
        });
        Gate {
            arrived: Some(arrived_rx),
            release: release_tx,
        }
    }

    async fn pass(&self, call: LedgerCall) {
        self.calls.lock().push(call.clone());

        let hold = {
            let mut holds = self.holds.lock();
            holds
                .iter()
                .position(|hold| hold.call == call)
                .map(|i| holds.remove(i))
        };

        if let Some(hold) = hold {
            let _ = hold.arrived.send(());
            let _ = hold.release.await;
        }
    }
}

#[async_trait]
impl LedgerTransport for GatedLedger {
    async fn display(&self, caller: &Identity, owner: &Identity) -> Result<Vec<String>, LedgerError> {
        self.pass(LedgerCall::Display {
            caller: caller.clone(),
            owner: owner.clone(),
        })
        .await;
        self.inner.display(caller, owner).await
    }

    async fn share_access(&self, caller: &Identity) -> Result<Vec<AccessGrant>, LedgerError> {
        self.pass(LedgerCall::ShareAccess {
            caller: caller.clone(),
        })
        .await;
        self.inner.share_access(caller).await
    }

    async fn add(&self, caller: &Identity, owner: &Identity, url: &str) -> Result<(), LedgerError> {
        self.pass(LedgerCall::Add {
            caller: caller.clone(),
            owner: owner.clone(),
            url: url.to_string(),
        })
        .await;
        self.inner.add(caller, owner, url).await
    }

    async fn allow(&self, caller: &Identity, user: &Identity) -> Result<(), LedgerError> {
        self.pass(LedgerCall::Allow {
            caller: caller.clone(),
            user: user.clone(),
        })
        .await;
        self.inner.allow(caller, user).await
    }

    async fn disallow(&self, caller: &Identity, user: &Identity) -> Result<(), LedgerError> {
        self.pass(LedgerCall::Disallow {
            caller: caller.clone(),
            user: user.clone(),
        })
        .await;
        self.inner.disallow(caller, user).await
    }
}
