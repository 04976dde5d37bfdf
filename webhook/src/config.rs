//! Bot configuration with TOML file support.

use std::path::PathBuf;

use barlink_types::EngineParams;
use serde::{Deserialize, Serialize};

use crate::WebhookError;

/// Configuration for the BarLink bot.
///
/// Can be loaded from a TOML file via [`BotConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Secrets are usually supplied
/// through environment overrides rather than the file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// Port the webhook listener binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared token echoed back during the GET verification handshake.
    #[serde(default)]
    pub verify_token: String,

    /// Graph API bearer token.
    #[serde(default)]
    pub access_token: String,

    /// The WhatsApp business phone number id messages are sent from.
    #[serde(default)]
    pub phone_number_id: String,

    /// App secret for `X-Hub-Signature-256` verification. When absent,
    /// payload signatures are not checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,

    /// Graph API base URL.
    #[serde(default = "default_graph_api_base")]
    pub graph_api_base: String,

    /// Where the JSON record store lives.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// How many recent message ids the dedup tracker keeps.
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Engine policy knobs.
    #[serde(default)]
    pub params: EngineParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_port() -> u16 {
    8080
}

fn default_graph_api_base() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}

fn default_data_file() -> PathBuf {
    PathBuf::from("./barlink_data/records.json")
}

fn default_dedup_capacity() -> usize {
    crate::dedup::DEFAULT_DEDUP_CAPACITY
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl BotConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, WebhookError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WebhookError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WebhookError> {
        toml::from_str(s).map_err(|e| WebhookError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("BotConfig is always serializable to TOML")
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            verify_token: String::new(),
            access_token: String::new(),
            phone_number_id: String::new(),
            app_secret: None,
            graph_api_base: default_graph_api_base(),
            data_file: default_data_file(),
            dedup_capacity: default_dedup_capacity(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            params: EngineParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = BotConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = BotConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.port, config.port);
        assert_eq!(parsed.dedup_capacity, config.dedup_capacity);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = BotConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.params.access_cap_months, 9);
        assert!(config.app_secret.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            port = 9999
            verify_token = "hunter2"

            [params]
            access_cap_months = 6
        "#;
        let config = BotConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.port, 9999);
        assert_eq!(config.verify_token, "hunter2");
        assert_eq!(config.params.access_cap_months, 6);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = BotConfig::from_toml_file("/nonexistent/barlink.toml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), WebhookError::Config(_)));
    }
}
