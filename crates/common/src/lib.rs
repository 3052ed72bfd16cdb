/**
 * Ledger account identities and the epoch
 *  counter that versions the active one.
 */
pub mod identity;
/**
 * Typed gateway over the registry contract.
 *  - The transport trait mirroring the contract's entry points
 *  - An in-memory ledger enforcing the same rules
 */
pub mod ledger;
/**
 * Client-side coordinator: the registry cache and
 *  the workflows that keep it in sync with the ledger.
 */
pub mod registry;
/**
 * Scripted ledger for exercising interleavings in tests.
 */
pub mod testkit;
/**
 * Seam for the content-hosting upload service.
 */
pub mod upload;

pub mod prelude {
    pub use crate::identity::{Epoch, Identity, IdentitySnapshot};
    pub use crate::ledger::{
        AccessGrant, LedgerError, LedgerGateway, LedgerTransport, MemoryLedger,
    };
    pub use crate::registry::{
        event_channel, AccessChange, FileAdded, IdentitySync, Refreshed, Registry, RegistryCache,
        RegistryError, RegistryEvent, ViewState,
    };
    pub use crate::upload::{UploadError, Uploader};
}
