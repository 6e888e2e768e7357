//! Alert delivery seam.

use futures::future::BoxFuture;
use tracing::info;

use jinbot_models::Alert;

/// Something that can deliver an alert to the operator.
///
/// `deliver` returns a success flag instead of an error: delivery
/// failures are logged and absorbed, never retried or queued.
pub trait AlertSink: Send + Sync {
    /// Delivers one alert. Returns true when the alert reached its
    /// destination.
    fn deliver<'a>(&'a self, alert: &'a Alert) -> BoxFuture<'a, bool>;
}

/// Sink that only writes alerts to the log.
///
/// Used when no chat destination is configured, so monitoring keeps
/// producing a visible trail instead of silently dropping results.
#[derive(Debug, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn deliver<'a>(&'a self, alert: &'a Alert) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            info!(
                severity = alert.severity.label(),
                source = %alert.source,
                message = %alert.message,
                "alert"
            );
            true
        })
    }
}
