//! Shared state for the Telegram bot.

use std::sync::Arc;
use std::time::Instant;

use jinbot_monitor::Monitor;
use jinbot_store::RecordStore;

use crate::auth::Authorizer;

/// State shared across all handlers.
pub struct BotState {
    /// The record store (tasks, messages, settings).
    pub store: RecordStore,
    /// Resolves callers to authorization levels.
    pub authorizer: Authorizer,
    /// The endpoint monitor, shared with the scheduled loop.
    pub monitor: Arc<Monitor>,
    /// When this process started, for uptime reporting.
    pub started_at: Instant,
}

impl BotState {
    /// Creates shared bot state.
    pub fn new(store: RecordStore, authorizer: Authorizer, monitor: Arc<Monitor>) -> Arc<Self> {
        Arc::new(Self {
            store,
            authorizer,
            monitor,
            started_at: Instant::now(),
        })
    }

    /// Seconds since the bot started.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
