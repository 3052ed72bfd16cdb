use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{AccessGrant, LedgerError, LedgerTransport};
use crate::identity::Identity;

/// In-memory ledger implementing the registry contract's rules.
///
/// Used by the development ledger server and by tests. Besides the
/// contract itself it can simulate an unreachable node and signer
/// rejections.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<RwLock<MemoryLedgerInner>>,
    calls: Arc<AtomicUsize>,
}

#[derive(Debug)]
struct MemoryLedgerInner {
    /// owner -> urls in insertion order
    files: HashMap<Identity, Vec<String>>,
    /// owner -> grantee -> may read
    ownership: HashMap<Identity, HashMap<Identity, bool>>,
    /// owner -> grants handed out, one entry per grantee ever allowed
    access_list: HashMap<Identity, Vec<AccessGrant>>,
    /// queued rejection reasons, consumed by the next mutations
    rejections: VecDeque<String>,
    reachable: bool,
}

impl Default for MemoryLedgerInner {
    fn default() -> Self {
        Self {
            files: HashMap::new(),
            ownership: HashMap::new(),
            access_list: HashMap::new(),
            rejections: VecDeque::new(),
            reachable: true,
        }
    }
}

impl MemoryLedgerInner {
    fn check_reachable(&self) -> Result<(), LedgerError> {
        if !self.reachable {
            return Err(LedgerError::Unreachable(
                "memory ledger is offline".to_string(),
            ));
        }
        Ok(())
    }

    fn check_mutation(&mut self) -> Result<(), LedgerError> {
        self.check_reachable()?;
        match self.rejections.pop_front() {
            Some(reason) => Err(LedgerError::Rejected(reason)),
            None => Ok(()),
        }
    }

    fn can_read(&self, caller: &Identity, owner: &Identity) -> bool {
        caller == owner
            || self
                .ownership
                .get(owner)
                .and_then(|grants| grants.get(caller))
                .copied()
                .unwrap_or(false)
    }

    fn set_access(&mut self, owner: &Identity, user: &Identity, access: bool) {
        self.ownership
            .entry(owner.clone())
            .or_default()
            .insert(user.clone(), access);

        let list = self.access_list.entry(owner.clone()).or_default();
        match list.iter_mut().find(|grant| &grant.user == user) {
            Some(grant) => grant.access = access,
            // disallowing someone never allowed leaves the list alone
            None if access => list.push(AccessGrant::new(user.clone(), true)),
            None => {}
        }
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle whether calls reach the ledger at all
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.write().reachable = reachable;
    }

    /// Make the next mutation fail with `LedgerError::Rejected`
    pub fn reject_next(&self, reason: impl Into<String>) {
        self.inner.write().rejections.push_back(reason.into());
    }

    /// Number of calls that reached this ledger, successful or not
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerTransport for MemoryLedger {
    async fn display(&self, caller: &Identity, owner: &Identity) -> Result<Vec<String>, LedgerError> {
        self.record_call();
        let inner = self.inner.read();
        inner.check_reachable()?;

        if !inner.can_read(caller, owner) {
            return Err(LedgerError::AccessDenied {
                owner: owner.clone(),
            });
        }

        Ok(inner.files.get(owner).cloned().unwrap_or_default())
    }

    async fn share_access(&self, caller: &Identity) -> Result<Vec<AccessGrant>, LedgerError> {
        self.record_call();
        let inner = self.inner.read();
        inner.check_reachable()?;

        Ok(inner.access_list.get(caller).cloned().unwrap_or_default())
    }

    async fn add(&self, _caller: &Identity, owner: &Identity, url: &str) -> Result<(), LedgerError> {
        self.record_call();
        let mut inner = self.inner.write();
        inner.check_mutation()?;

        inner
            .files
            .entry(owner.clone())
            .or_default()
            .push(url.to_string());
        Ok(())
    }

    async fn allow(&self, caller: &Identity, user: &Identity) -> Result<(), LedgerError> {
        self.record_call();
        let mut inner = self.inner.write();
        inner.check_mutation()?;

        inner.set_access(caller, user, true);
        Ok(())
    }

    async fn disallow(&self, caller: &Identity, user: &Identity) -> Result<(), LedgerError> {
        self.record_call();
        let mut inner = self.inner.write();
        inner.check_mutation()?;

        inner.set_access(caller, user, false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Identity, Identity, Identity) {
        (
            Identity::from("0xA"),
            Identity::from("0xB"),
            Identity::from("0xC"),
        )
    }

    #[tokio::test]
    async fn test_add_then_display() {
        let ledger = MemoryLedger::new();
        let (a, _, _) = ids();

        ledger.add(&a, &a, "https://host/f1").await.unwrap();
        ledger.add(&a, &a, "https://host/f2").await.unwrap();

        let files = ledger.display(&a, &a).await.unwrap();
        assert_eq!(files, vec!["https://host/f1", "https://host/f2"]);
    }

    #[tokio::test]
    async fn test_display_requires_grant() {
        let ledger = MemoryLedger::new();
        let (a, b, c) = ids();
        ledger.add(&a, &a, "https://host/f1").await.unwrap();

        assert!(matches!(
            ledger.display(&b, &a).await,
            Err(LedgerError::AccessDenied { .. })
        ));

        ledger.allow(&a, &b).await.unwrap();
        assert_eq!(ledger.display(&b, &a).await.unwrap(), vec!["https://host/f1"]);
        // grants are not transitive
        assert!(ledger.display(&c, &a).await.is_err());

        ledger.disallow(&a, &b).await.unwrap();
        assert_eq!(
            ledger.display(&b, &a).await,
            Err(LedgerError::AccessDenied { owner: a })
        );
    }

    #[tokio::test]
    async fn test_access_list_flips_in_place() {
        let ledger = MemoryLedger::new();
        let (a, b, c) = ids();

        ledger.allow(&a, &b).await.unwrap();
        ledger.allow(&a, &c).await.unwrap();
        ledger.disallow(&a, &b).await.unwrap();
        ledger.allow(&a, &b).await.unwrap();
        ledger.disallow(&a, &b).await.unwrap();

        assert_eq!(
            ledger.share_access(&a).await.unwrap(),
            vec![AccessGrant::new("0xB", false), AccessGrant::new("0xC", true)]
        );
        assert!(ledger.share_access(&b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disallow_unknown_user_is_silent() {
        let ledger = MemoryLedger::new();
        let (a, b, _) = ids();

        ledger.disallow(&a, &b).await.unwrap();
        assert!(ledger.share_access(&a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_and_offline() {
        let ledger = MemoryLedger::new();
        let (a, b, _) = ids();

        ledger.reject_next("user rejected the request");
        assert_eq!(
            ledger.allow(&a, &b).await,
            Err(LedgerError::Rejected("user rejected the request".to_string()))
        );
        // only one mutation is rejected
        ledger.allow(&a, &b).await.unwrap();

        ledger.set_reachable(false);
        assert!(matches!(
            ledger.display(&a, &a).await,
            Err(LedgerError::Unreachable(_))
        ));
        assert_eq!(ledger.call_count(), 3);
    }
}
