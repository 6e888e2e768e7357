//! Telegram bot interface for Jinbot.
//!
//! This crate wires everything together: the record store, the endpoint
//! monitor, the webhook receiver, and the chat command surface.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! Optional:
//! - `TELEGRAM_CHAT_ID`: Operator chat (also the alert destination)
//! - `TELEGRAM_ALLOWED_USER`: Operator username
//! - `WEBHOOK_SECRET` / `WEBHOOK_PORT`: Enable the webhook receiver
//! - `MONITOR_ENDPOINTS`: Comma-separated URLs to watch
//!
//! # Example
//!
//! ```no_run
//! use jinbot_core::{BotConfig, MonitorConfig};
//! use jinbot_telegram::JinBot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BotConfig::from_env()?;
//!     let monitor_config = MonitorConfig::from_env();
//!
//!     let bot = JinBot::new(config, monitor_config)?;
//!     bot.start_polling().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/task`, `/done`, `/tasks`, `/find` - task tracking
//! - `/note`, `/messages`, `/recent` - saved messages
//! - `/check`, `/status`, `/stats` - monitoring and health
//! - `/set`, `/settings` - operator preferences

pub mod auth;
pub mod bot;
pub mod error;
pub mod handlers;
pub mod notifier;
pub mod state;

pub use auth::{AuthLevel, Authorizer};
pub use bot::JinBot;
pub use error::{BotError, Result};
pub use notifier::TelegramNotifier;
pub use state::BotState;
