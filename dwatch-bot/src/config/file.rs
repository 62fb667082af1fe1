//! TOML file configuration structures.
//!
//! Every section is optional; missing keys fall back to the built-in
//! defaults, so an empty file is a valid configuration.

use dwatch_sdk::objects::ContractId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub contract: ContractConfig,
    pub polling: PollingConfig,
    pub notifications: NotificationsConfig,
    /// Friendly names for call destinations, `address = "name"`. Replaces
    /// the built-in table when present.
    pub known_contracts: Option<HashMap<String, String>>,
}

/// Which contract to watch and where to ask about it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// `<network>/<address>`.
    pub id: Option<ContractId>,
    pub indexer_url: Option<Url>,
}

/// Loop timing section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub idle_interval_secs: u64,
    pub boundary_offset_ms: i64,
    pub send_delay_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            idle_interval_secs: 30,
            boundary_offset_ms: 1000,
            send_delay_secs: 1,
        }
    }
}

/// Text baked into notifications. Unset keys keep the built-in style.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub dao_name: Option<String>,
    pub token_symbol: Option<String>,
    pub governance_url: Option<String>,
}
