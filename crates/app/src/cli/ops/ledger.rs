use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Context;
use clap::{Args, Subcommand};

use common::ledger::MemoryLedger;
use filereg::ledger_api::{self, LedgerState};
use filereg::process::graceful_shutdown_blocker;

use crate::cli::op::Op;

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Override the listen port (default from config)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

#[async_trait::async_trait]
impl Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let port = self.port.unwrap_or(ctx.config.ledger_port);
        let config = ledger_api::Config {
            listen_addr: SocketAddr::new(self.host, port),
            log_level: tracing::Level::DEBUG,
        };

        let (signal_handle, shutdown_rx) =
            graceful_shutdown_blocker().context("failed to install signal handlers")?;

        // local development ledger; state lives as long as the process
        let state = LedgerState::new(MemoryLedger::new());
        ledger_api::run(config, state, shutdown_rx)
            .await
            .with_context(|| format!("ledger server on port {} failed", port))?;

        signal_handle.abort();
        Ok("ledger stopped".to_string())
    }
}

crate::command_enum! {
    (Serve, Serve),
}

// Rename the generated Command to LedgerCommand for clarity
pub type LedgerCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Ledger {
    #[command(subcommand)]
    pub command: LedgerCommand,
}

#[async_trait::async_trait]
impl Op for Ledger {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
