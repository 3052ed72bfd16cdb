// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Access, Files, Init, Ledger, Version, View};
use filereg::state::AppState;

command_enum! {
    (Access, Access),
    (Files, Files),
    (Init, Init),
    (Ledger, Ledger),
    (Version, Version),
    (View, View),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match AppState::load_config(args.config_path.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    // Log level: explicit flag > config > warn
    let log_level = args.log_level.unwrap_or_else(|| config.log_level());
    let guard = filereg::process::init_logging(log_level);

    // Resolve remote URL: explicit flag > config ledger_url
    let remote = match cli::op::resolve_remote(args.remote, &config) {
        Ok(remote) => remote,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = match cli::op::OpContext::new(remote, args.identity, config, args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create ledger client: {}", e);
            std::process::exit(1);
        }
    };

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    // flush buffered logs before exiting
    drop(guard);
    std::process::exit(code);
}
