use crate::identity::Identity;
use crate::ledger::{LedgerError, LedgerTransport};

use super::{Refreshed, Registry, ViewState};

impl<T: LedgerTransport> Registry<T> {
    /// Query the files of `target` into the cross-identity slot.
    ///
    /// The slot is separate from the caller's own files. On any failure it
    /// is cleared and the error returned, so a denial never leaves an older
    /// listing on screen.
    pub async fn refresh_other_files(
        &self,
        target: Identity,
    ) -> Result<Refreshed<Vec<String>>, LedgerError> {
        match self.query_view(target).await? {
            None => Ok(Refreshed::Superseded),
            Some((_, result)) => result.map(Refreshed::Updated),
        }
    }

    /// View the files owned by `target`.
    ///
    /// Returns the terminal state the view settled into: `Loaded` (possibly
    /// empty), `Denied` or `TransportError`. `Refreshed::Superseded` means a
    /// newer view or an identity change took over the slot. Errors are
    /// validation failures only.
    pub async fn view_files(&self, target: Identity) -> Result<Refreshed<ViewState>, LedgerError> {
        Ok(match self.query_view(target).await? {
            None => Refreshed::Superseded,
            Some((state, _)) => Refreshed::Updated(state),
        })
    }

    /// Run one view query through `Loading` to a terminal state.
    ///
    /// Yields `None` when the result was dropped because a newer view query
    /// was issued or the identity changed while it was in flight.
    async fn query_view(
        &self,
        target: Identity,
    ) -> Result<Option<(ViewState, Result<Vec<String>, LedgerError>)>, LedgerError> {
        let (snapshot, ticket) = {
            let mut state = self.state.lock();
            if state.identity.identity.is_empty() {
                return Err(LedgerError::Unauthenticated);
            }
            if target.is_empty() {
                return Err(LedgerError::InvalidInput("target"));
            }
            let ticket = state.cache.begin_view(target.clone());
            (state.identity.clone(), ticket)
        };

        let result = self.gateway.list_files(&snapshot.identity, &target).await;

        let mut state = self.state.lock();
        if state.identity.epoch != snapshot.epoch {
            tracing::warn!(%target, "dropping view fetched for a previous identity");
            return Ok(None);
        }
        let Some(settled) = state
            .cache
            .settle_view(ticket, target.clone(), result.clone())
        else {
            tracing::debug!(%target, "dropping view overtaken by a newer query");
            return Ok(None);
        };

        match &result {
            Ok(files) => tracing::debug!(%target, count = files.len(), "view refreshed"),
            Err(e) => tracing::warn!(%target, "view failed: {}", e),
        }
        Ok(Some((settled, result)))
    }
}
