//! Client configuration with TOML file support.

use serde::{Deserialize, Serialize};
use url::Url;

use parallax_capture::{DEFAULT_SAMPLE_RATE_HZ, DEFAULT_SEGMENT_INTERVAL_MS};
use parallax_challenge::DwellTimes;
use parallax_channel::{CONNECT_TIMEOUT_MS, RECONNECT_DELAY_MS};

use crate::telemetry::DEFAULT_BATCH_SIZE;
use crate::ClientError;

/// Configuration for the capture client.
///
/// Can be loaded from a TOML file via [`ClientConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend origin the session stream and health probe are derived from.
    #[serde(default = "default_origin")]
    pub origin: Url,

    /// Milliseconds of video accumulated per segment.
    #[serde(default = "default_segment_interval_ms")]
    pub segment_interval_ms: u64,

    /// Motion sampling rate in samples per second.
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: u32,

    /// Motion samples accumulated per telemetry batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Milliseconds allowed for one stream dial before it counts as failed.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Milliseconds between losing the stream and redialing it.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Whether to probe the backend health endpoint before dialing a
    /// development host.
    #[serde(default = "default_true")]
    pub health_preflight: bool,

    /// How long each challenge phase holds before advancing.
    #[serde(default)]
    pub dwell: DwellTimes,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_origin() -> Url {
    Url::parse("https://localhost:8443").expect("static origin is a valid URL")
}

fn default_segment_interval_ms() -> u64 {
    DEFAULT_SEGMENT_INTERVAL_MS
}

fn default_sample_rate_hz() -> u32 {
    DEFAULT_SAMPLE_RATE_HZ
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_connect_timeout_ms() -> u64 {
    CONNECT_TIMEOUT_MS
}

fn default_reconnect_delay_ms() -> u64 {
    RECONNECT_DELAY_MS
}

fn default_true() -> bool {
    true
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ClientError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ClientError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ClientError> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ClientConfig is always serializable to TOML")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            segment_interval_ms: default_segment_interval_ms(),
            sample_rate_hz: default_sample_rate_hz(),
            batch_size: default_batch_size(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            health_preflight: default_true(),
            dwell: DwellTimes::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ClientConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = ClientConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.origin, config.origin);
        assert_eq!(parsed.batch_size, config.batch_size);
        assert_eq!(parsed.dwell, config.dwell);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.origin.as_str(), "https://localhost:8443/");
        assert_eq!(config.segment_interval_ms, 250);
        assert_eq!(config.sample_rate_hz, 60);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.reconnect_delay_ms, 5_000);
        assert!(config.health_preflight);
        assert_eq!(config.log_format, "human");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            origin = "https://verify.example.com"
            batch_size = 4

            [dwell]
            baseline_ms = 100
        "#;
        let config = ClientConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.origin.as_str(), "https://verify.example.com/");
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.dwell.baseline_ms, 100);
        assert_eq!(config.dwell.pan_ms, 4_000); // default
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn invalid_origin_returns_config_error() {
        let result = ClientConfig::from_toml_str(r#"origin = "not a url""#);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ClientError::Config(_)));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = ClientConfig::from_toml_file("/nonexistent/parallax.toml");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn config_file_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("parallax.toml");
        let mut config = ClientConfig::default();
        config.batch_size = 25;
        std::fs::write(&path, config.to_toml_string()).expect("write config");

        let loaded = ClientConfig::from_toml_file(path.to_str().expect("utf8 path"))
            .expect("should load");
        assert_eq!(loaded.batch_size, 25);
        assert_eq!(loaded.origin, config.origin);
    }
}
