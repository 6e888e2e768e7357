//! Scheduled monitoring loop.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::debug;

use crate::checker::Monitor;

/// Drives [`Monitor::run_check`] on a fixed interval until shutdown.
///
/// Overlapping runs cannot happen within one loop (the next tick waits
/// for the previous run), but nothing coordinates across processes;
/// duplicate alerts from overlapping deployments are tolerated.
pub struct MonitorLoop {
    monitor: Arc<Monitor>,
    shutdown: watch::Receiver<bool>,
}

impl MonitorLoop {
    /// Creates a new scheduled loop.
    pub fn new(monitor: Arc<Monitor>, shutdown: watch::Receiver<bool>) -> Self {
        Self { monitor, shutdown }
    }

    /// Run the loop until the shutdown signal flips.
    pub async fn run(&mut self) {
        let mut ticker = interval(self.monitor.config().interval);

        debug!(
            interval_secs = self.monitor.config().interval.as_secs(),
            endpoints = self.monitor.config().endpoints.len(),
            "starting monitor loop"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let summary = self.monitor.run_check().await;
                    debug!(
                        checked = summary.endpoints_checked,
                        alerts = summary.alerts_generated,
                        "scheduled run complete"
                    );
                }
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        debug!("monitor loop received shutdown signal");
                        break;
                    }
                }
            }
        }

        debug!("monitor loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::LogSink;
    use jinbot_core::MonitorConfig;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_loop_stops_on_shutdown() {
        let config = MonitorConfig {
            interval: Duration::from_millis(10),
            ..MonitorConfig::default()
        };
        let monitor = Arc::new(Monitor::new(config, Arc::new(LogSink)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut monitor_loop = MonitorLoop::new(monitor, shutdown_rx);
        let handle = tokio::spawn(async move {
            monitor_loop.run().await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();

        let result = tokio::time::timeout(Duration::from_millis(200), handle).await;
        assert!(result.is_ok(), "loop should stop after shutdown signal");
    }
}
