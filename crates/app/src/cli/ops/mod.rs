pub mod access;
pub mod files;
pub mod init;
pub mod ledger;
pub mod version;
pub mod view;

pub use access::Access;
pub use files::Files;
pub use init::Init;
pub use ledger::Ledger;
pub use version::Version;
pub use view::View;
