//! The monitoring run loop.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use url::Url;

use jinbot_core::MonitorConfig;
use jinbot_models::{Alert, EndpointHealth, RunSummary, Severity};

use crate::memory::process_rss_mb;
use crate::probe::probe_endpoint;
use crate::sink::AlertSink;

/// Source label on alerts raised by the monitor.
const MONITOR_SOURCE: &str = "monitor";

/// Classifies a probe result into an alert, if it warrants one.
///
/// Unhealthy with a network error is critical, unhealthy from a bad
/// status is high, and a healthy-but-near-threshold response gets a
/// medium slow-response warning.
pub fn classify_result(health: &EndpointHealth, config: &MonitorConfig) -> Option<Alert> {
    if !health.healthy {
        let (message, severity) = match &health.error {
            Some(err) => (
                format!("{} is unreachable: {}", health.url, err),
                Severity::Critical,
            ),
            None => (
                format!("{} returned HTTP {}", health.url, health.status_code),
                Severity::High,
            ),
        };
        return Some(
            Alert::new(message, severity, MONITOR_SOURCE)
                .with_context(format!("response time: {}ms", health.response_time_ms)),
        );
    }

    if health.response_time_ms >= config.slow_threshold_ms() {
        return Some(Alert::new(
            format!(
                "{} is slow: {}ms (threshold {}ms)",
                health.url,
                health.response_time_ms,
                config.threshold_ms()
            ),
            Severity::Medium,
            MONITOR_SOURCE,
        ));
    }

    None
}

/// Runs health checks over the configured endpoints.
pub struct Monitor {
    config: MonitorConfig,
    client: reqwest::Client,
    sink: Arc<dyn AlertSink>,
}

impl Monitor {
    /// Creates a monitor delivering alerts through the given sink.
    pub fn new(config: MonitorConfig, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            sink,
        }
    }

    /// The monitoring configuration this monitor runs with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Performs one monitoring run and returns its summary.
    ///
    /// Probes run sequentially in configuration order; one endpoint's
    /// failure never aborts the loop. An empty endpoint list is a valid
    /// run that checks nothing.
    pub async fn run_check(&self) -> RunSummary {
        let started_at = Utc::now();
        let mut alerts_generated = 0;
        let mut healthy_count = 0;

        if let Some(problem) = self.self_check() {
            self.raise(
                Alert::new(
                    format!("monitor self-check failed: {}", problem),
                    Severity::Critical,
                    MONITOR_SOURCE,
                ),
                &mut alerts_generated,
            )
            .await;
        }

        for url in &self.config.endpoints {
            let health = probe_endpoint(&self.client, url, self.config.timeout).await;
            if health.healthy {
                healthy_count += 1;
            }
            if let Some(alert) = classify_result(&health, &self.config) {
                self.raise(alert, &mut alerts_generated).await;
            }
        }

        if let Some(rss_mb) = process_rss_mb() {
            if rss_mb > self.config.memory_cap_mb {
                self.raise(
                    Alert::new(
                        format!(
                            "process memory at {}MB (cap {}MB)",
                            rss_mb, self.config.memory_cap_mb
                        ),
                        Severity::Medium,
                        MONITOR_SOURCE,
                    ),
                    &mut alerts_generated,
                )
                .await;
            }
        }

        let summary = RunSummary {
            endpoints_checked: self.config.endpoints.len(),
            healthy_count,
            alerts_generated,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            checked = summary.endpoints_checked,
            healthy = summary.healthy_count,
            alerts = summary.alerts_generated,
            "monitoring run finished"
        );
        summary
    }

    /// Trivial runtime self-check: every configured endpoint must be an
    /// http(s) URL. A bad entry means the deployment configuration is
    /// broken, which is worth one loud alert per run.
    fn self_check(&self) -> Option<String> {
        let invalid: Vec<&str> = self
            .config
            .endpoints
            .iter()
            .filter(|raw| {
                Url::parse(raw)
                    .map(|u| !matches!(u.scheme(), "http" | "https"))
                    .unwrap_or(true)
            })
            .map(String::as_str)
            .collect();

        if invalid.is_empty() {
            None
        } else {
            Some(format!("invalid endpoint configuration: {}", invalid.join(", ")))
        }
    }

    async fn raise(&self, alert: Alert, alerts_generated: &mut usize) {
        *alerts_generated += 1;
        if !self.sink.deliver(&alert).await {
            warn!(
                severity = alert.severity.label(),
                message = %alert.message,
                "alert delivery failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Sink that records everything it is handed.
    #[derive(Default)]
    struct RecordingSink {
        alerts: Mutex<Vec<Alert>>,
    }

    impl RecordingSink {
        fn taken(&self) -> Vec<Alert> {
            self.alerts.lock().unwrap().clone()
        }
    }

    impl AlertSink for RecordingSink {
        fn deliver<'a>(&'a self, alert: &'a Alert) -> BoxFuture<'a, bool> {
            Box::pin(async move {
                self.alerts.lock().unwrap().push(alert.clone());
                true
            })
        }
    }

    fn config_with(endpoints: Vec<String>) -> MonitorConfig {
        MonitorConfig {
            endpoints,
            memory_cap_mb: u64::MAX, // keep the memory check quiet in tests
            ..MonitorConfig::default()
        }
    }

    async fn spawn_server(status_line: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "{}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                    status_line
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}/", addr)
    }

    fn health(status_code: u16, response_time_ms: u64, error: Option<&str>) -> EndpointHealth {
        EndpointHealth {
            url: "https://svc.example.com".to_string(),
            status_code,
            response_time_ms,
            healthy: error.is_none() && (200..300).contains(&status_code) && response_time_ms < 5000,
            error: error.map(String::from),
        }
    }

    #[test]
    fn test_classify_network_error_critical() {
        let config = MonitorConfig::default();
        let alert = classify_result(&health(0, 12, Some("ECONNREFUSED")), &config).unwrap();
        assert_eq!(alert.severity, Severity::Critical);
        assert!(alert.message.contains("unreachable"));
    }

    #[test]
    fn test_classify_bad_status_high() {
        let config = MonitorConfig::default();
        let alert = classify_result(&health(500, 120, None), &config).unwrap();
        assert_eq!(alert.severity, Severity::High);
        assert!(alert.message.contains("500"));
    }

    #[test]
    fn test_classify_slow_response_medium() {
        let config = MonitorConfig::default();
        // 4200 >= 0.8 * 5000
        let alert = classify_result(&health(200, 4200, None), &config).unwrap();
        assert_eq!(alert.severity, Severity::Medium);
        assert!(alert.message.contains("slow"));
    }

    #[test]
    fn test_classify_fast_healthy_no_alert() {
        let config = MonitorConfig::default();
        assert!(classify_result(&health(200, 80, None), &config).is_none());
    }

    #[test]
    fn test_classify_slow_boundary() {
        let config = MonitorConfig::default();
        assert!(classify_result(&health(200, 3999, None), &config).is_none());
        assert!(classify_result(&health(200, 4000, None), &config).is_some());
    }

    #[tokio::test]
    async fn test_run_check_empty_configuration() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = Monitor::new(config_with(Vec::new()), sink.clone());

        let summary = monitor.run_check().await;

        assert_eq!(summary.endpoints_checked, 0);
        assert_eq!(summary.healthy_count, 0);
        assert_eq!(summary.alerts_generated, 0);
        assert!(sink.taken().is_empty());
    }

    #[tokio::test]
    async fn test_run_check_healthy_endpoint() {
        let url = spawn_server("HTTP/1.1 200 OK").await;
        let sink = Arc::new(RecordingSink::default());
        let monitor = Monitor::new(config_with(vec![url]), sink.clone());

        let summary = monitor.run_check().await;

        assert_eq!(summary.endpoints_checked, 1);
        assert_eq!(summary.healthy_count, 1);
        assert_eq!(summary.alerts_generated, 0);
    }

    #[tokio::test]
    async fn test_run_check_bad_status_raises_high() {
        let url = spawn_server("HTTP/1.1 503 Service Unavailable").await;
        let sink = Arc::new(RecordingSink::default());
        let monitor = Monitor::new(config_with(vec![url]), sink.clone());

        let summary = monitor.run_check().await;

        assert_eq!(summary.healthy_count, 0);
        assert_eq!(summary.alerts_generated, 1);
        assert_eq!(sink.taken()[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn test_run_check_unreachable_raises_critical() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let sink = Arc::new(RecordingSink::default());
        let monitor = Monitor::new(config_with(vec![url]), sink.clone());

        let summary = monitor.run_check().await;

        assert_eq!(summary.alerts_generated, 1);
        assert_eq!(sink.taken()[0].severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_run_check_continues_past_failures() {
        let bad = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            let url = format!("http://{}/", listener.local_addr().unwrap());
            drop(listener);
            url
        };
        let good = spawn_server("HTTP/1.1 200 OK").await;

        let sink = Arc::new(RecordingSink::default());
        let monitor = Monitor::new(config_with(vec![bad, good]), sink.clone());

        let summary = monitor.run_check().await;

        assert_eq!(summary.endpoints_checked, 2);
        assert_eq!(summary.healthy_count, 1);
        assert_eq!(summary.alerts_generated, 1);
    }

    #[tokio::test]
    async fn test_run_check_duplicate_endpoints_probed_independently() {
        let url = spawn_server("HTTP/1.1 500 Internal Server Error").await;
        let sink = Arc::new(RecordingSink::default());
        let monitor = Monitor::new(config_with(vec![url.clone(), url]), sink.clone());

        let summary = monitor.run_check().await;

        assert_eq!(summary.endpoints_checked, 2);
        assert_eq!(summary.alerts_generated, 2);
    }

    #[tokio::test]
    async fn test_self_check_flags_invalid_configuration() {
        let sink = Arc::new(RecordingSink::default());
        let monitor = Monitor::new(
            config_with(vec!["ftp://example.com".to_string()]),
            sink.clone(),
        );

        let summary = monitor.run_check().await;

        // One critical for the self-check, one for the failed probe.
        assert!(summary.alerts_generated >= 1);
        let alerts = sink.taken();
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert!(alerts[0].message.contains("self-check"));
    }
}
