use std::{fs, path::PathBuf};

use common::identity::Identity;
use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "filereg";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const PINATA_JWT_ENV: &str = "PINATA_JWT";

pub const DEFAULT_LEDGER_PORT: u16 = 8545;
pub const DEFAULT_PINATA_ENDPOINT: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";
pub const DEFAULT_PINATA_GATEWAY: &str = "https://gateway.pinata.cloud";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Wallet address to act as (empty means disconnected)
    #[serde(default)]
    pub identity: Option<Identity>,
    /// Base URL of the ledger API
    #[serde(default = "default_ledger_url")]
    pub ledger_url: String,
    /// Port for `ledger serve` to listen on
    #[serde(default = "default_ledger_port")]
    pub ledger_port: u16,
    /// Pinata JWT; the PINATA_JWT environment variable takes precedence
    #[serde(default)]
    pub pinata_jwt: Option<String>,
    #[serde(default = "default_pinata_endpoint")]
    pub pinata_endpoint: String,
    #[serde(default = "default_pinata_gateway")]
    pub pinata_gateway: String,
    /// Default log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_ledger_url() -> String {
    format!("http://localhost:{}", DEFAULT_LEDGER_PORT)
}

fn default_ledger_port() -> u16 {
    DEFAULT_LEDGER_PORT
}

fn default_pinata_endpoint() -> String {
    DEFAULT_PINATA_ENDPOINT.to_string()
}

fn default_pinata_gateway() -> String {
    DEFAULT_PINATA_GATEWAY.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            identity: None,
            ledger_url: default_ledger_url(),
            ledger_port: default_ledger_port(),
            pinata_jwt: None,
            pinata_endpoint: default_pinata_endpoint(),
            pinata_gateway: default_pinata_gateway(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn ledger_url(&self) -> Result<Url, StateError> {
        Ok(Url::parse(&self.ledger_url)?)
    }

    /// The Pinata JWT, preferring the environment over the config file
    pub fn pinata_jwt(&self) -> Option<String> {
        std::env::var(PINATA_JWT_ENV)
            .ok()
            .filter(|jwt| !jwt.trim().is_empty())
            .or_else(|| self.pinata_jwt.clone())
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::WARN)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the filereg directory (~/.filereg)
    pub app_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the filereg directory path (custom or default ~/.filereg)
    pub fn app_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new filereg directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;

        if app_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&app_dir)?;

        let config = config.unwrap_or_default();
        // fail before writing anything unreadable
        config.ledger_url()?;
        let config_path = app_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            app_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the filereg directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;

        if !app_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = app_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            app_dir,
            config_path,
            config,
        })
    }

    /// Load the config if the directory has been initialized, defaults
    /// otherwise
    pub fn load_config(custom_path: Option<PathBuf>) -> Result<AppConfig, StateError> {
        match Self::load(custom_path) {
            Ok(state) => Ok(state.config),
            Err(StateError::NotInitialized) | Err(StateError::MissingFile(_)) => {
                Ok(AppConfig::default())
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("filereg directory not initialized. Run 'filereg init' first")]
    NotInitialized,

    #[error("filereg directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid ledger url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filereg");

        let config = AppConfig {
            identity: Some(Identity::from("0xA")),
            ..Default::default()
        };
        let state = AppState::init(Some(path.clone()), Some(config.clone())).unwrap();
        assert!(state.config_path.exists());

        let loaded = AppState::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.config, config);

        assert!(matches!(
            AppState::init(Some(path), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppState::load_config(Some(dir.path().join("missing"))).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.ledger_url().unwrap().port(), Some(DEFAULT_LEDGER_PORT));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("identity = \"0xB\"\n").unwrap();
        assert_eq!(config.identity, Some(Identity::from("0xB")));
        assert_eq!(config.pinata_gateway, DEFAULT_PINATA_GATEWAY);
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_init_rejects_bad_url() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            ledger_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            AppState::init(Some(dir.path().to_path_buf()), Some(config)),
            Err(StateError::InvalidUrl(_))
        ));
    }
}
