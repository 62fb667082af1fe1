//! Runtime configuration types for the watcher.
//!
//! These are the validated values the processors run with. Loading them from
//! the environment, CLI, and TOML is handled by the bot crate.

mod polling;
mod style;

pub use polling::PollingConfig;
pub use style::{KnownContracts, NotificationStyle};

use dwatch_sdk::objects::ContractId;

/// Default contract: the Kolibri DAO governance contract on mainnet.
pub const DEFAULT_CONTRACT: &str = "mainnet/KT1WZ1HJyx5wPt96ZTjtWPotoPUk7pXNPfT2";

/// Everything the watcher needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Contract whose operations are watched.
    pub contract: ContractId,
    /// Loop timing.
    pub polling: PollingConfig,
    /// Message templates.
    pub style: NotificationStyle,
}
