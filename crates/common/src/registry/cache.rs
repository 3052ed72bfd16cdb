use serde::Serialize;

use crate::identity::Identity;
use crate::ledger::{AccessGrant, LedgerError};

/// State of the cross-identity view.
///
/// `Loaded` with an empty list (access granted, nothing registered),
/// `Denied` and `Unqueried` are three different answers and must be
/// rendered differently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Unqueried,
    Loading {
        target: Identity,
    },
    Loaded {
        target: Identity,
        files: Vec<String>,
    },
    Denied {
        target: Identity,
    },
    TransportError {
        target: Identity,
        reason: String,
    },
}

impl ViewState {
    pub fn target(&self) -> Option<&Identity> {
        match self {
            ViewState::Unqueried => None,
            ViewState::Loading { target }
            | ViewState::Loaded { target, .. }
            | ViewState::Denied { target }
            | ViewState::TransportError { target, .. } => Some(target),
        }
    }

    /// Files to render for the viewed identity. Anything but `Loaded`
    /// renders as an empty list.
    pub fn files(&self) -> &[String] {
        match self {
            ViewState::Loaded { files, .. } => files,
            _ => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ViewState::Unqueried | ViewState::Loading { .. })
    }

    fn settled(target: Identity, result: Result<Vec<String>, LedgerError>) -> Self {
        match result {
            Ok(files) => ViewState::Loaded { target, files },
            Err(LedgerError::AccessDenied { .. }) => ViewState::Denied { target },
            Err(e) => ViewState::TransportError {
                target,
                reason: e.to_string(),
            },
        }
    }
}

/// Issuance number of a cross-identity query.
///
/// Only the most recently issued ticket may write the view slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ViewTicket(u64);

/// Last-known-good snapshot of ledger state for the active identity.
///
/// Slots are replaced wholesale on every successful refresh, never
/// patched. `None` means the slot has not been filled since the last
/// identity change and must not be rendered as data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryCache {
    own_files: Option<Vec<String>>,
    grants: Option<Vec<AccessGrant>>,
    view: ViewState,
    view_ticket: u64,
}

impl RegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The caller's own files, if fetched under the current identity
    pub fn own_files(&self) -> Option<&[String]> {
        self.own_files.as_deref()
    }

    /// Grants handed out by the caller, if fetched under the current identity
    pub fn grants(&self) -> Option<&[AccessGrant]> {
        self.grants.as_deref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub(crate) fn replace_own_files(&mut self, files: Vec<String>) {
        self.own_files = Some(files);
    }

    pub(crate) fn replace_grants(&mut self, grants: Vec<AccessGrant>) {
        self.grants = Some(grants);
    }

    /// Drop everything scoped to the caller, including the cross-identity
    /// view, and invalidate any view query still in flight.
    pub(crate) fn clear(&mut self) {
        self.own_files = None;
        self.grants = None;
        self.view = ViewState::Unqueried;
        self.view_ticket += 1;
    }

    /// Enter `Loading` for `target`, discarding the previous view.
    pub(crate) fn begin_view(&mut self, target: Identity) -> ViewTicket {
        self.view_ticket += 1;
        self.view = ViewState::Loading { target };
        ViewTicket(self.view_ticket)
    }

    /// Settle the view query identified by `ticket`.
    ///
    /// Any failure clears the slot rather than keeping an older listing.
    /// Returns the settled state, or `None` if a newer query has been
    /// issued since and the result was dropped.
    pub(crate) fn settle_view(
        &mut self,
        ticket: ViewTicket,
        target: Identity,
        result: Result<Vec<String>, LedgerError>,
    ) -> Option<ViewState> {
        if ticket.0 != self.view_ticket {
            return None;
        }
        self.view = ViewState::settled(target, result);
        Some(self.view.clone())
    }
}
