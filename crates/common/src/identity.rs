//! # Identities
//!
//! An [`Identity`] is the externally verifiable address of a ledger account.
//! The client never interprets it: equality is exact and case-sensitive,
//! so `0xAb` and `0xab` are different identities as far as we are concerned.
//!
//! The empty identity is the disconnected state. Exactly one identity is
//! active at a time, tracked by the registry coordinator together with an
//! [`Epoch`] that advances on every change.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque ledger account address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The disconnected identity
    pub fn none() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display, e.g. `0x1234...abcd`.
    ///
    /// Addresses too short to abbreviate are returned whole.
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::str::FromStr for Identity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

/// Version counter for the active identity.
///
/// Any result computed under an older epoch belongs to a previous
/// identity and must be dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The active identity as seen at a single point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub identity: Identity,
    pub epoch: Epoch,
}

impl IdentitySnapshot {
    pub fn is_connected(&self) -> bool {
        !self.identity.is_empty()
    }
}
