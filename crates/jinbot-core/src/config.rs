//! Configuration for Jinbot.
//!
//! All configuration comes from environment variables, read once at
//! startup into typed structs. The binary loads `.env` via dotenvy
//! before calling into here.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! Optional:
//! - `TELEGRAM_CHAT_ID`: Chat the operator talks from (also the alert destination)
//! - `TELEGRAM_ALLOWED_USER`: Operator username, matched case-insensitively
//! - `WEBHOOK_SECRET`: Shared secret for the inbound webhook receiver
//! - `WEBHOOK_PORT`: Port for the webhook receiver (default: 8787)
//! - `JINBOT_STATE_DIR`: Override the state directory (default: ~/.jinbot)
//! - `MONITOR_ENDPOINTS`: Comma-separated URLs to probe
//! - `MONITOR_TIMEOUT_MS`: Probe timeout / latency threshold (default: 5000)
//! - `MONITOR_SLOW_RATIO`: Slow-response warning ratio (default: 0.8)
//! - `MONITOR_MEMORY_CAP_MB`: RSS above this raises a medium alert (default: 512)
//! - `MONITOR_INTERVAL_SECS`: Seconds between scheduled runs (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Environment variable holding the bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable for the operator chat id.
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Environment variable for the operator username.
pub const ALLOWED_USER_ENV: &str = "TELEGRAM_ALLOWED_USER";

/// Environment variable for the webhook shared secret.
pub const WEBHOOK_SECRET_ENV: &str = "WEBHOOK_SECRET";

/// Environment variable for the webhook port.
pub const WEBHOOK_PORT_ENV: &str = "WEBHOOK_PORT";

/// Environment variable for the state directory.
pub const STATE_DIR_ENV: &str = "JINBOT_STATE_DIR";

/// Environment variable for the endpoint list.
pub const ENDPOINTS_ENV: &str = "MONITOR_ENDPOINTS";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".jinbot";

/// Default webhook port.
const DEFAULT_WEBHOOK_PORT: u16 = 8787;

/// Default probe timeout / latency threshold in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default slow-response warning ratio (fraction of the threshold).
const DEFAULT_SLOW_RATIO: f64 = 0.8;

/// Default memory alert cap in megabytes.
const DEFAULT_MEMORY_CAP_MB: u64 = 512;

/// Default interval between scheduled monitoring runs, in seconds.
const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable holds a value that does not parse.
    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Bot-level configuration: identity, secrets, and state location.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token.
    pub token: String,
    /// Chat id of the operator; alerts and notifications go here.
    pub owner_chat_id: Option<i64>,
    /// Username of the operator, matched case-insensitively.
    pub owner_username: Option<String>,
    /// Shared secret expected by the webhook receiver.
    pub webhook_secret: Option<String>,
    /// Port the webhook receiver binds to.
    pub webhook_port: u16,
    /// Directory for the durable record store.
    pub state_dir: PathBuf,
}

impl BotConfig {
    /// Reads the bot configuration from the environment.
    ///
    /// Only the bot token is required; everything else has a default or
    /// is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token =
            std::env::var(BOT_TOKEN_ENV).map_err(|_| ConfigError::MissingVar(BOT_TOKEN_ENV))?;

        let owner_chat_id = match std::env::var(CHAT_ID_ENV) {
            Ok(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                ConfigError::InvalidVar {
                    name: CHAT_ID_ENV,
                    value: raw.clone(),
                }
            })?),
            Err(_) => None,
        };

        let owner_username = std::env::var(ALLOWED_USER_ENV)
            .ok()
            .map(|u| u.trim_start_matches('@').to_string())
            .filter(|u| !u.is_empty());

        let webhook_secret = std::env::var(WEBHOOK_SECRET_ENV)
            .ok()
            .filter(|s| !s.is_empty());

        let webhook_port = match std::env::var(WEBHOOK_PORT_ENV) {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidVar {
                name: WEBHOOK_PORT_ENV,
                value: raw.clone(),
            })?,
            Err(_) => DEFAULT_WEBHOOK_PORT,
        };

        Ok(Self {
            token,
            owner_chat_id,
            owner_username,
            webhook_secret,
            webhook_port,
            state_dir: state_dir(),
        })
    }
}

/// Get the Jinbot state directory.
///
/// Determined by:
/// 1. `JINBOT_STATE_DIR` environment variable if set (tilde expanded)
/// 2. `~/.jinbot` if a home directory is available
/// 3. `.jinbot` in the current directory as a fallback
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(|p| PathBuf::from(shellexpand::tilde(&p).to_string()))
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Monitoring configuration.
///
/// The slow-response ratio and the memory cap are knobs rather than
/// fixed behavior; the defaults match the values the bot has always
/// used.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Endpoints to probe, in configuration order. Duplicates are kept.
    pub endpoints: Vec<String>,
    /// Probe timeout, which doubles as the latency threshold.
    pub timeout: Duration,
    /// Fraction of the threshold above which a slow-response warning fires.
    pub slow_ratio: f64,
    /// Process RSS above this many megabytes raises a medium alert.
    pub memory_cap_mb: u64,
    /// Interval between scheduled monitoring runs.
    pub interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            slow_ratio: DEFAULT_SLOW_RATIO,
            memory_cap_mb: DEFAULT_MEMORY_CAP_MB,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
        }
    }
}

impl MonitorConfig {
    /// Reads the monitoring configuration from the environment.
    ///
    /// Never fails: an empty or missing endpoint list is a valid
    /// configuration that checks nothing, and unparseable knobs fall
    /// back to their defaults with a warning.
    pub fn from_env() -> Self {
        let endpoints = std::env::var(ENDPOINTS_ENV)
            .map(|raw| parse_endpoint_list(&raw))
            .unwrap_or_default();

        Self {
            endpoints,
            timeout: Duration::from_millis(env_u64("MONITOR_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)),
            slow_ratio: env_f64("MONITOR_SLOW_RATIO", DEFAULT_SLOW_RATIO),
            memory_cap_mb: env_u64("MONITOR_MEMORY_CAP_MB", DEFAULT_MEMORY_CAP_MB),
            interval: Duration::from_secs(env_u64(
                "MONITOR_INTERVAL_SECS",
                DEFAULT_INTERVAL_SECS,
            )),
        }
    }

    /// Latency threshold in milliseconds.
    pub fn threshold_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    /// Latency above which a healthy endpoint still warrants a slow warning.
    pub fn slow_threshold_ms(&self) -> u64 {
        (self.threshold_ms() as f64 * self.slow_ratio) as u64
    }
}

/// Splits a comma-separated endpoint list, trimming and dropping empties.
///
/// Duplicates are kept: each configured entry is probed independently.
pub fn parse_endpoint_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn env_u64(name: &'static str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, "unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}

fn env_f64(name: &'static str, default: f64) -> f64 {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, "unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_list() {
        let endpoints =
            parse_endpoint_list("https://a.example.com, https://b.example.com ,,https://a.example.com");
        assert_eq!(
            endpoints,
            vec![
                "https://a.example.com".to_string(),
                "https://b.example.com".to_string(),
                "https://a.example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_endpoint_list_empty() {
        assert!(parse_endpoint_list("").is_empty());
        assert!(parse_endpoint_list(" , ,").is_empty());
    }

    #[test]
    fn test_monitor_config_defaults() {
        let config = MonitorConfig::default();
        assert!(config.endpoints.is_empty());
        assert_eq!(config.threshold_ms(), 5000);
        assert_eq!(config.slow_threshold_ms(), 4000);
        assert_eq!(config.memory_cap_mb, 512);
    }

    #[test]
    fn test_slow_threshold_tracks_ratio() {
        let config = MonitorConfig {
            slow_ratio: 0.5,
            ..MonitorConfig::default()
        };
        assert_eq!(config.slow_threshold_ms(), 2500);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingVar(BOT_TOKEN_ENV);
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }
}
