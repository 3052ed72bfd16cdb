use clap::Args;

use filereg::state::{AppConfig, AppState, DEFAULT_LEDGER_PORT};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Ledger API URL
    #[arg(long, default_value = "http://localhost:8545")]
    pub ledger_url: String,

    /// Port for `ledger serve` to listen on
    #[arg(long, default_value_t = DEFAULT_LEDGER_PORT)]
    pub ledger_port: u16,

    /// Pinata JWT used by `files upload` (PINATA_JWT takes precedence)
    #[arg(long)]
    pub pinata_jwt: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] filereg::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            identity: ctx.identity.clone(),
            ledger_url: self.ledger_url.clone(),
            ledger_port: self.ledger_port,
            pinata_jwt: self.pinata_jwt.clone(),
            ..Default::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let identity = match &state.config.identity {
            Some(identity) if !identity.is_empty() => identity.to_string(),
            _ => "none (pass --identity to act as one)".to_string(),
        };

        let output = format!(
            "Initialized filereg directory at: {}\n\
             - Config: {}\n\
             - Identity: {}\n\
             - Ledger URL: {}\n\
             - Ledger port: {}",
            state.app_dir.display(),
            state.config_path.display(),
            identity,
            state.config.ledger_url,
            state.config.ledger_port,
        );

        Ok(output)
    }
}
