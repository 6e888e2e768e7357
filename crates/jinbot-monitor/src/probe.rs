//! HTTP probe: one bounded GET per endpoint.

use std::time::{Duration, Instant};

use jinbot_models::EndpointHealth;

/// Probes a single endpoint with one GET request.
///
/// Wall-clock time is captured regardless of outcome. The result is
/// healthy only for a 2xx response that came back below the threshold;
/// the `error` field is set only for network-level failures (DNS,
/// connection refused, timeout), never for a plain non-2xx status.
///
/// Never fails: every failure mode is represented in the returned
/// result.
pub async fn probe_endpoint(
    client: &reqwest::Client,
    url: &str,
    threshold: Duration,
) -> EndpointHealth {
    let started = Instant::now();
    let outcome = client.get(url).timeout(threshold).send().await;
    let response_time_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(response) => {
            let status_code = response.status().as_u16();
            let healthy = response.status().is_success()
                && response_time_ms < threshold.as_millis() as u64;
            EndpointHealth {
                url: url.to_string(),
                status_code,
                response_time_ms,
                healthy,
                error: None,
            }
        }
        Err(e) => EndpointHealth {
            url: url.to_string(),
            status_code: 0,
            response_time_ms,
            healthy: false,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Serves a fixed HTTP/1.1 response on a local port.
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

    /// Returns a URL nothing is listening on.
    fn dead_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_probe_healthy_endpoint() {
        let url = spawn_server("HTTP/1.1 200 OK").await;
        let client = reqwest::Client::new();

        let health = probe_endpoint(&client, &url, Duration::from_secs(5)).await;

        assert_eq!(health.status_code, 200);
        assert!(health.healthy);
        assert!(health.error.is_none());
    }

    #[tokio::test]
    async fn test_probe_server_error_is_unhealthy_without_error_field() {
        let url = spawn_server("HTTP/1.1 500 Internal Server Error").await;
        let client = reqwest::Client::new();

        let health = probe_endpoint(&client, &url, Duration::from_secs(5)).await;

        assert_eq!(health.status_code, 500);
        assert!(!health.healthy);
        assert!(health.error.is_none());
    }

    #[tokio::test]
    async fn test_probe_connection_refused_sets_error() {
        let url = dead_url();
        let client = reqwest::Client::new();

        let health = probe_endpoint(&client, &url, Duration::from_secs(5)).await;

        assert_eq!(health.status_code, 0);
        assert!(!health.healthy);
        assert!(health.error.is_some());
    }

    #[tokio::test]
    async fn test_probe_measures_elapsed_time() {
        let url = spawn_server("HTTP/1.1 200 OK").await;
        let client = reqwest::Client::new();

        let health = probe_endpoint(&client, &url, Duration::from_secs(5)).await;

        // Local roundtrips finish well inside the threshold.
        assert!(health.response_time_ms < 5000);
    }
}
