use std::error::Error;
use std::path::PathBuf;

use url::Url;

use common::identity::Identity;
use common::ledger::LedgerError;
use common::registry::{IdentitySync, Registry};
use filereg::ledger_api::client::ApiError;
use filereg::ledger_api::HttpLedger;
use filereg::state::{AppConfig, StateError};

/// Resolve the ledger URL.
///
/// Priority: explicit `--remote` flag > config file `ledger_url`.
pub fn resolve_remote(explicit: Option<Url>, config: &AppConfig) -> Result<Url, StateError> {
    match explicit {
        Some(url) => Ok(url),
        None => config.ledger_url(),
    }
}

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Registry over the remote ledger, disconnected until `connect`
    pub registry: Registry<HttpLedger>,
    /// Identity from `--identity`, overriding the config
    pub identity: Option<Identity>,
    pub config: AppConfig,
    /// Optional custom config path (defaults to ~/.filereg)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    pub fn new(
        remote: Url,
        identity: Option<Identity>,
        config: AppConfig,
        config_path: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            registry: Registry::new(HttpLedger::new(&remote)?),
            identity,
            config,
            config_path,
        })
    }

    /// The identity to act as: the flag first, then the config
    pub fn active_identity(&self) -> Option<Identity> {
        self.identity
            .clone()
            .or_else(|| self.config.identity.clone())
            .filter(|identity| !identity.is_empty())
    }

    /// Activate the configured identity, loading its own files and grants.
    pub async fn connect(&self) -> Result<IdentitySync, LedgerError> {
        let identity = self.active_identity().ok_or(LedgerError::Unauthenticated)?;
        Ok(self.registry.activate(identity).await)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(flag: Option<&str>, config: Option<&str>) -> OpContext {
        let config = AppConfig {
            identity: config.map(Identity::from),
            ..Default::default()
        };
        let remote = resolve_remote(None, &config).unwrap();
        OpContext::new(remote, flag.map(Identity::from), config, None).unwrap()
    }

    #[test]
    fn test_resolve_remote_explicit_wins() {
        let explicit = Url::parse("http://example.com:9999").unwrap();
        let result = resolve_remote(Some(explicit.clone()), &AppConfig::default()).unwrap();
        assert_eq!(result, explicit);
    }

    #[test]
    fn test_resolve_remote_falls_back_to_config() {
        let result = resolve_remote(None, &AppConfig::default()).unwrap();
        assert_eq!(result.as_str(), "http://localhost:8545/");
    }

    #[test]
    fn test_identity_flag_overrides_config() {
        assert_eq!(context(Some("0xB"), Some("0xA")).active_identity(), Some(Identity::from("0xB")));
        assert_eq!(context(None, Some("0xA")).active_identity(), Some(Identity::from("0xA")));
        assert_eq!(context(None, Some("")).active_identity(), None);
    }

    #[tokio::test]
    async fn test_connect_without_identity() {
        let ctx = context(None, None);
        assert_eq!(ctx.connect().await.unwrap_err(), LedgerError::Unauthenticated);
    }
}
