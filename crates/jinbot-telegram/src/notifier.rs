//! Outbound message delivery to the operator chat.

use futures::future::BoxFuture;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::html;
use tracing::{info, warn};

use jinbot_models::Alert;
use jinbot_monitor::AlertSink;

/// Telegram's hard limit on message length, in characters.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Truncates a message to the Telegram limit with a trailing ellipsis.
pub fn truncate_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_LEN {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_MESSAGE_LEN - 1).collect();
    truncated.push('…');
    truncated
}

/// Sends messages and alerts to the single configured chat.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    /// Creates a notifier for the given destination chat.
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    /// Renders an alert for Telegram: severity marker, source, message,
    /// then context on its own paragraph.
    pub fn format_alert(alert: &Alert) -> String {
        let mut text = format!(
            "{} <b>{}</b> [{}]\n{}",
            alert.severity.marker(),
            alert.severity.label(),
            html::escape(&alert.source),
            html::escape(&alert.message),
        );
        if let Some(context) = &alert.context {
            text.push_str("\n\n");
            text.push_str(&html::escape(context));
        }
        text
    }

    /// Sends one message, truncated to the Telegram limit.
    ///
    /// The first attempt uses HTML formatting; if that delivery fails
    /// the message is retried once as plain text before giving up.
    pub async fn send(&self, text: &str) -> bool {
        let text = truncate_message(text);

        match self
            .bot
            .send_message(self.chat_id, &text)
            .parse_mode(ParseMode::Html)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(chat_id = %self.chat_id.0, error = %e, "formatted send failed, retrying plain");
                match self.bot.send_message(self.chat_id, &text).await {
                    Ok(_) => true,
                    Err(e) => {
                        warn!(chat_id = %self.chat_id.0, error = %e, "plain send failed, giving up");
                        false
                    }
                }
            }
        }
    }
}

impl AlertSink for TelegramNotifier {
    fn deliver<'a>(&'a self, alert: &'a Alert) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let delivered = self.send(&Self::format_alert(alert)).await;
            if delivered {
                info!(severity = alert.severity.label(), source = %alert.source, "alert sent");
            }
            delivered
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jinbot_models::Severity;

    #[test]
    fn test_short_message_untouched() {
        assert_eq!(truncate_message("hello"), "hello");
    }

    #[test]
    fn test_exact_limit_untouched() {
        let text = "a".repeat(MAX_MESSAGE_LEN);
        assert_eq!(truncate_message(&text), text);
    }

    #[test]
    fn test_long_message_truncated_with_ellipsis() {
        let text = "a".repeat(MAX_MESSAGE_LEN + 100);
        let truncated = truncate_message(&text);

        assert_eq!(truncated.chars().count(), MAX_MESSAGE_LEN);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // Multi-byte characters must not be split.
        let text = "é".repeat(MAX_MESSAGE_LEN + 10);
        let truncated = truncate_message(&text);
        assert_eq!(truncated.chars().count(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn test_format_alert_escapes_html() {
        let alert = Alert::new("<script> is down", Severity::High, "monitor");
        let text = TelegramNotifier::format_alert(&alert);

        assert!(text.contains("&lt;script&gt;"));
        assert!(text.contains("<b>HIGH</b>"));
        assert!(text.contains("🟠"));
    }

    #[test]
    fn test_format_alert_includes_context() {
        let alert = Alert::new("slow", Severity::Medium, "monitor").with_context("4200ms");
        let text = TelegramNotifier::format_alert(&alert);
        assert!(text.contains("4200ms"));
    }
}
