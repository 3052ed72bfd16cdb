// Library exports for the CLI and integration tests

// Ledger HTTP server and the transport that talks to it
pub mod ledger_api;
// Pinata uploader
pub mod pinning;
// Logging and signal handling
pub mod process;
// App state (configuration, paths)
pub mod state;

pub use ledger_api::HttpLedger;
pub use pinning::PinataUploader;
pub use state::{AppConfig, AppState, StateError};
