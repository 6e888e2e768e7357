//! Shared state for the webhook receiver.

use std::sync::Arc;

use jinbot_monitor::AlertSink;

/// State handed to every webhook handler.
#[derive(Clone)]
pub struct AppState {
    /// Shared secret expected from callers. `None` disables the
    /// receiver (requests get a structured 503).
    pub secret: Option<String>,
    /// Where normalized alerts are delivered.
    pub sink: Arc<dyn AlertSink>,
}

impl AppState {
    /// Creates the webhook state.
    pub fn new(secret: Option<String>, sink: Arc<dyn AlertSink>) -> Self {
        Self { secret, sink }
    }
}
