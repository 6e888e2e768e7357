//! Main Telegram bot implementation.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::watch;
use tracing::{error, info, warn};

use jinbot_core::{BotConfig, MonitorConfig};
use jinbot_monitor::{AlertSink, LogSink, Monitor, MonitorLoop};
use jinbot_store::RecordStore;
use jinbot_webhook::AppState;

use crate::auth::Authorizer;
use crate::error::{BotError, Result};
use crate::handlers::{handle_command, handle_message, handle_unknown_command, Command};
use crate::notifier::TelegramNotifier;
use crate::state::BotState;

/// The Jinbot Telegram bot.
pub struct JinBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Bot-level configuration.
    config: BotConfig,
    /// Shared state across handlers.
    state: Arc<BotState>,
    /// Where alerts are delivered (operator chat, or the log).
    sink: Arc<dyn AlertSink>,
}

impl JinBot {
    /// Creates a new bot from configuration.
    ///
    /// With no operator chat configured, alerts fall back to the log so
    /// monitoring stays observable.
    pub fn new(config: BotConfig, monitor_config: MonitorConfig) -> Result<Self> {
        if config.token.is_empty() {
            return Err(BotError::NoToken);
        }

        let bot = Bot::new(config.token.clone());
        let store = RecordStore::open(&config.state_dir);
        let authorizer = Authorizer::new(config.owner_chat_id, config.owner_username.clone());

        let sink: Arc<dyn AlertSink> = match config.owner_chat_id {
            Some(chat_id) => Arc::new(TelegramNotifier::new(bot.clone(), ChatId(chat_id))),
            None => {
                warn!("TELEGRAM_CHAT_ID not set; alerts go to the log only");
                Arc::new(LogSink)
            }
        };

        let monitor = Arc::new(Monitor::new(monitor_config, Arc::clone(&sink)));
        let state = BotState::new(store, authorizer, monitor);

        Ok(Self {
            bot,
            config,
            state,
            sink,
        })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| BotError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Shared state, mostly for tests.
    pub fn state(&self) -> &Arc<BotState> {
        &self.state
    }

    /// Start the bot in polling mode.
    ///
    /// Spawns the scheduled monitor loop and the webhook receiver when
    /// configured, then blocks on the Telegram dispatcher.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Jinbot in polling mode...");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Scheduled endpoint monitoring
        if self.state.monitor.config().endpoints.is_empty() {
            info!("no endpoints configured; scheduled monitoring disabled");
        } else {
            let mut monitor_loop =
                MonitorLoop::new(Arc::clone(&self.state.monitor), shutdown_rx.clone());
            tokio::spawn(async move {
                monitor_loop.run().await;
            });
        }

        // Webhook receiver
        if let Some(secret) = self.config.webhook_secret.clone() {
            let port = self.config.webhook_port;
            let app_state = AppState::new(Some(secret), Arc::clone(&self.sink));
            tokio::spawn(async move {
                if let Err(e) = jinbot_webhook::serve(port, app_state).await {
                    error!(error = %e, "webhook receiver failed");
                }
            });
        } else {
            info!("WEBHOOK_SECRET not set; webhook receiver disabled");
        }

        // Set up the command and message handlers
        let state_for_commands = Arc::clone(&self.state);
        let state_for_messages = Arc::clone(&self.state);

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let state = Arc::clone(&state_for_commands);
                        info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                        async move { handle_command(bot, msg, cmd, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        // Commands that start with / but didn't parse
                        msg.text().map(|t| t.starts_with('/')).unwrap_or(false)
                    })
                    .endpoint(|bot: Bot, msg: Message| async move {
                        handle_unknown_command(bot, msg).await
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        // Only handle non-command text messages
                        msg.text().map(|t| !t.starts_with('/')).unwrap_or(false)
                    })
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_messages);
                        async move { handle_message(bot, msg, state).await }
                    }),
            );

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        // Stop the background tasks once the dispatcher returns.
        let _ = shutdown_tx.send(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Dispatcher tests would require mocking the Telegram API; the
    // pieces behind it (store, monitor, auth, webhook) are covered in
    // their own crates and modules.
}
