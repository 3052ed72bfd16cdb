pub use clap::Parser;

use std::path::PathBuf;

use common::identity::Identity;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "filereg")]
#[command(about = "Register files on a ledger and share read access to them")]
pub struct Args {
    /// Ledger API URL (defaults to `ledger_url` from config)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the filereg config directory (defaults to ~/.filereg)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Identity to act as (defaults to `identity` from config)
    #[arg(long, global = true)]
    pub identity: Option<Identity>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    #[command(subcommand)]
    pub command: crate::Command,
}
