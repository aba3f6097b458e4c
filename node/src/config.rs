//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};

use tessera_types::ProtocolParams;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a ledger node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Capacity of the chain-update intake channel. Producers wait when it
    /// is full.
    #[serde(default = "default_update_queue_capacity")]
    pub update_queue_capacity: usize,

    /// Buffer size of each notification broadcast channel.
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to expose Prometheus metrics.
    #[serde(default)]
    pub enable_metrics: bool,

    /// Maturity windows and other ledger parameters.
    #[serde(default)]
    pub params: ProtocolParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_update_queue_capacity() -> usize {
    100
}

fn default_notification_capacity() -> usize {
    256
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.update_queue_capacity == 0 {
            return Err(NodeError::Config("update_queue_capacity must be positive".into()));
        }
        if self.notification_capacity == 0 {
            return Err(NodeError::Config("notification_capacity must be positive".into()));
        }
        self.log_format()?;
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            update_queue_capacity: default_update_queue_capacity(),
            notification_capacity: default_notification_capacity(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
            params: ProtocolParams::default(),
        }
    }
}
