//! Configuration module for dwatch-bot.
//!
//! Merges CLI flags and environment variables (both handled by clap) over an
//! optional TOML file over the built-in defaults, then validates the result
//! into the typed configuration the watcher runs with.

pub mod file;

use crate::config::file::FileConfig;
use dwatch_core::config::{
    DEFAULT_CONTRACT, KnownContracts, NotificationStyle, PollingConfig, WatcherConfig,
};
use dwatch_sdk::client::IndexerClient;
use dwatch_sdk::objects::{ContractId, InvalidContractId};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Shortest value accepted as a webhook URL.
const MIN_WEBHOOK_LEN: usize = 5;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("DISCORD_WEBHOOK is not set or is too short")]
    MissingWebhook,

    #[error("invalid {field} URL: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    InvalidContract(#[from] InvalidContractId),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Values that arrive through CLI flags or the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub webhook: Option<String>,
    pub error_report_url: Option<String>,
    pub contract: Option<String>,
    pub indexer_url: Option<String>,
    /// `SENTRY_DSN` left over from older deployments. Never used as an
    /// endpoint, only noticed.
    pub sentry_dsn: Option<String>,
}

/// Fully validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub watcher: WatcherConfig,
    pub webhook_url: Url,
    pub error_report_url: Option<Url>,
    pub indexer_url: Url,
    /// `SENTRY_DSN` is set but no error report URL is.
    pub sentry_dsn_ignored: bool,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    overrides: Overrides,
}

impl ConfigLoader {
    /// Create a new config loader. Without a path only overrides and
    /// defaults apply.
    pub fn new(config_path: Option<&Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.map(Path::to_path_buf),
            overrides,
        }
    }

    /// Load and validate the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, if one was given
    /// 2. Apply CLI and environment overrides
    /// 3. Validate URLs, the contract id, and timing values
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let file_config = match &self.config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)?
            }
            None => FileConfig::default(),
        };

        self.build(file_config)
    }

    fn build(&self, file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        let webhook_url = parse_webhook(self.overrides.webhook.as_deref())?;

        let error_report_url = self
            .overrides
            .error_report_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_url("error report", s))
            .transpose()?;

        let sentry_dsn_ignored = error_report_url.is_none()
            && self
                .overrides
                .sentry_dsn
                .as_deref()
                .is_some_and(|dsn| !dsn.trim().is_empty());

        let contract = match (&self.overrides.contract, file_config.contract.id) {
            (Some(raw), _) => raw.trim().parse::<ContractId>()?,
            (None, Some(id)) => id,
            (None, None) => DEFAULT_CONTRACT.parse()?,
        };

        let indexer_url = match (&self.overrides.indexer_url, file_config.contract.indexer_url) {
            (Some(raw), _) => parse_url("indexer", raw.trim())?,
            (None, Some(url)) => url,
            (None, None) => parse_url("indexer", IndexerClient::DEFAULT_BASE_URL)?,
        };

        let polling = PollingConfig {
            idle_interval: Duration::from_secs(file_config.polling.idle_interval_secs),
            boundary_offset_ms: file_config.polling.boundary_offset_ms,
            send_delay: Duration::from_secs(file_config.polling.send_delay_secs),
            ..PollingConfig::default()
        };
        validate_polling(&polling)?;

        let mut style = NotificationStyle::default();
        let notifications = file_config.notifications;
        if let Some(dao_name) = notifications.dao_name {
            style.dao_name = dao_name;
        }
        if let Some(token_symbol) = notifications.token_symbol {
            style.token_symbol = token_symbol;
        }
        if let Some(governance_url) = notifications.governance_url {
            style.governance_url = governance_url;
        }
        if let Some(known) = file_config.known_contracts {
            style.known_contracts = KnownContracts::new(known);
        }

        Ok(LoadedConfig {
            watcher: WatcherConfig {
                contract,
                polling,
                style,
            },
            webhook_url,
            error_report_url,
            indexer_url,
            sentry_dsn_ignored,
        })
    }
}

fn parse_webhook(raw: Option<&str>) -> Result<Url, ConfigError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.len() < MIN_WEBHOOK_LEN {
        return Err(ConfigError::MissingWebhook);
    }
    parse_url("webhook", raw)
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })
}

fn validate_polling(polling: &PollingConfig) -> Result<(), ConfigError> {
    if polling.idle_interval.is_zero() {
        return Err(ConfigError::ValidationError(
            "polling.idle_interval_secs must be greater than zero".to_string(),
        ));
    }
    if polling.boundary_offset_ms < 0 {
        return Err(ConfigError::ValidationError(
            "polling.boundary_offset_ms must not be negative".to_string(),
        ));
    }
    Ok(())
}
