//! Watcher configuration with TOML file support.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock behavior: poll every 30s, 10s request timeouts, alert below
//! health factor 1.0, 5% fallback bonus, never evict recovered owners.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use watcher_api::{
    DEFAULT_API_BASE, DEFAULT_EXPLORER_ACCOUNT_URL, DEFAULT_MARKETS_URL, DEFAULT_PROTOCOL_URL,
};

use crate::risk::RiskParams;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "WATCHER_CONFIG";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Profile name (for logging/identification)
    #[serde(default = "default_profile_name")]
    pub profile: String,

    /// Market-data endpoint
    #[serde(default)]
    pub market: MarketConfig,

    /// Risk assessment thresholds
    #[serde(default)]
    pub risk: RiskConfig,

    /// Alert state retention
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Polling cadence
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Messaging webhook settings (credentials come from the environment)
    #[serde(default)]
    pub notifier: NotifierConfig,
}

fn default_profile_name() -> String {
    "default".to_string()
}

/// Market-data endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Full markets URL including query string
    #[serde(default = "default_market_url")]
    pub url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_market_url() -> String {
    DEFAULT_MARKETS_URL.to_string()
}
fn default_request_timeout() -> u64 {
    10
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            url: default_market_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl MarketConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Risk assessment thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Obligations strictly below this health factor are at risk
    #[serde(default = "default_hf_threshold")]
    pub health_factor_threshold: f64,

    /// Bonus rate used when the reserve bonus cannot be resolved
    #[serde(default = "default_bonus_rate")]
    pub default_bonus_rate: f64,
}

fn default_hf_threshold() -> f64 {
    1.0
}
fn default_bonus_rate() -> f64 {
    0.05
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            health_factor_threshold: default_hf_threshold(),
            default_bonus_rate: default_bonus_rate(),
        }
    }
}

impl RiskConfig {
    pub fn params(&self) -> RiskParams {
        RiskParams {
            health_factor_threshold: self.health_factor_threshold,
            default_bonus_rate: self.default_bonus_rate,
        }
    }
}

/// Alert state retention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Forget owners that have been recovered for this long (seconds).
    /// Unset keeps every owner for the life of the process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovered_ttl_secs: Option<u64>,
}

impl AlertConfig {
    pub fn recovered_ttl(&self) -> Option<Duration> {
        self.recovered_ttl_secs.map(Duration::from_secs)
    }
}

/// Polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Sleep between the end of one cycle and the start of the next (seconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    30
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl ScannerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Messaging webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Bot API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Explorer account page prefix; the owner address is appended
    #[serde(default = "default_explorer_account_url")]
    pub explorer_account_url: String,

    /// Protocol homepage
    #[serde(default = "default_protocol_url")]
    pub protocol_url: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
fn default_explorer_account_url() -> String {
    DEFAULT_EXPLORER_ACCOUNT_URL.to_string()
}
fn default_protocol_url() -> String {
    DEFAULT_PROTOCOL_URL.to_string()
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout(),
            explorer_account_url: default_explorer_account_url(),
            protocol_url: default_protocol_url(),
        }
    }
}

impl NotifierConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            profile: default_profile_name(),
            market: MarketConfig::default(),
            risk: RiskConfig::default(),
            alerts: AlertConfig::default(),
            scanner: ScannerConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl WatcherConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `WATCHER_CONFIG`, or defaults if unset.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.scanner.poll_interval_secs == 0 {
            anyhow::bail!("scanner.poll_interval_secs must be greater than zero");
        }
        if self.market.request_timeout_secs == 0 || self.notifier.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        if !self.risk.default_bonus_rate.is_finite() || self.risk.default_bonus_rate < 0.0 {
            anyhow::bail!("risk.default_bonus_rate must be a non-negative number");
        }
        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        tracing::info!(profile = %self.profile, "Watcher configuration loaded");
        tracing::info!(
            url = %self.market.url,
            timeout_secs = self.market.request_timeout_secs,
            "Market data endpoint"
        );
        tracing::info!(
            hf_threshold = self.risk.health_factor_threshold,
            default_bonus = self.risk.default_bonus_rate,
            "Risk thresholds"
        );
        tracing::info!(
            poll_interval_secs = self.scanner.poll_interval_secs,
            recovered_ttl_secs = ?self.alerts.recovered_ttl_secs,
            "Scanner timing"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatcherConfig::default();
        assert_eq!(config.scanner.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.market.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.notifier.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.risk.health_factor_threshold, 1.0);
        assert_eq!(config.risk.default_bonus_rate, 0.05);
        assert!(config.alerts.recovered_ttl().is_none());
        assert_eq!(config.market.url, DEFAULT_MARKETS_URL);
    }

    #[test]
    fn test_partial_toml() {
        let config = WatcherConfig::from_toml(
            r#"
            profile = "staging"

            [scanner]
            poll_interval_secs = 5

            [alerts]
            recovered_ttl_secs = 86400
            "#,
        )
        .unwrap();

        assert_eq!(config.profile, "staging");
        assert_eq!(config.scanner.poll_interval_secs, 5);
        assert_eq!(config.alerts.recovered_ttl(), Some(Duration::from_secs(86400)));
        // untouched sections keep defaults
        assert_eq!(config.risk.default_bonus_rate, 0.05);
        assert_eq!(config.notifier.protocol_url, DEFAULT_PROTOCOL_URL);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = WatcherConfig::from_toml("").unwrap();
        assert_eq!(config.profile, "default");
        assert_eq!(config.scanner.poll_interval_secs, 30);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = WatcherConfig::from_toml("[scanner]\npoll_interval_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn test_risk_params() {
        let params = RiskConfig::default().params();
        assert_eq!(params.health_factor_threshold, 1.0);
        assert_eq!(params.default_bonus_rate, 0.05);
    }

    #[test]
    fn test_serialization() {
        let config = WatcherConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("profile = \"default\""));

        let parsed = WatcherConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.market.url, config.market.url);
    }
}
