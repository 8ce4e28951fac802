//! Configuration shared by duel clients and the relay server

use std::time::Duration;

/// Main configuration for a duel link or server
#[derive(Debug, Clone)]
pub struct DuelConfig {
    /// Zenoh configuration
    pub zenoh_config: zenoh::Config,

    /// Key expression prefix for all duel traffic
    pub keyexpr_prefix: String,

    /// How often the local state is sampled for publication
    pub sample_interval: Duration,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            zenoh_config: zenoh::Config::default(),
            keyexpr_prefix: "tetris/duel".to_string(),
            sample_interval: Duration::from_millis(250),
        }
    }
}

impl DuelConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Zenoh configuration
    pub fn with_zenoh_config(mut self, config: zenoh::Config) -> Self {
        self.zenoh_config = config;
        self
    }

    /// Set the key expression prefix
    pub fn with_keyexpr_prefix(mut self, prefix: String) -> Self {
        self.keyexpr_prefix = prefix;
        self
    }

    /// Set the sampling interval
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }
}
