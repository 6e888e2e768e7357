//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Bot token not provided or invalid.
    #[error("Telegram bot token not set. Set TELEGRAM_BOT_TOKEN environment variable.")]
    NoToken,

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] jinbot_core::ConfigError),

    /// Record store error.
    #[error("Store error: {0}")]
    Store(#[from] jinbot_store::StoreError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;
