//! Stored chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::MessageId;

/// A chat message saved to the record store.
///
/// Tags and action items are derived once at creation time and never
/// recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier for the message.
    pub id: MessageId,

    /// The message text. Never empty.
    pub text: String,

    /// Label identifying the chat the message came from.
    pub source_chat: String,

    /// Auto-derived tags merged with any caller-supplied tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Candidate task descriptions extracted from the text (0-3 entries).
    #[serde(default)]
    pub action_items: Vec<String>,

    /// When the message was saved.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a new message with no tags or action items.
    pub fn new(text: impl Into<String>, source_chat: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            text: text.into(),
            source_chat: source_chat.into(),
            tags: Vec::new(),
            action_items: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Case-insensitive substring match against text, tags, or source chat.
    ///
    /// `needle` must already be lowercased by the caller.
    pub fn matches(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
            || self.source_chat.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}
