//! Endpoint health results and monitoring run summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of probing a single endpoint.
///
/// `healthy` is true iff the request returned a 2xx status AND the
/// elapsed time stayed below the configured threshold. `error` is set
/// only for network-level failures (DNS, connection refused, timeout);
/// a plain non-2xx response leaves it empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointHealth {
    /// The URL that was probed.
    pub url: String,

    /// HTTP status code, or 0 when the request never completed.
    pub status_code: u16,

    /// Wall-clock time spent on the request, regardless of outcome.
    pub response_time_ms: u64,

    /// Whether the endpoint counts as healthy.
    pub healthy: bool,

    /// Network-level failure description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EndpointHealth {
    /// Returns true if the probe failed at the network level.
    pub fn is_network_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregated result of one monitoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// How many endpoints were probed.
    pub endpoints_checked: usize,

    /// How many of them were healthy.
    pub healthy_count: usize,

    /// How many alerts the run raised.
    pub alerts_generated: usize,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}
