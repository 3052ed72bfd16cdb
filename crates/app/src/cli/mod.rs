pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Access, Files, Init, Ledger, Version, View};
