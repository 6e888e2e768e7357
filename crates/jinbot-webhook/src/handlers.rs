//! Webhook request handlers.

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::WebhookError;
use crate::normalize::{normalize, sniff};
use crate::state::AppState;

/// Header the shared secret is expected in.
const SECRET_HEADER: &str = "x-webhook-secret";

/// GET /health - receiver liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /webhook - authenticate, sniff, normalize, deliver.
///
/// A payload that matches no alerting rule is still a 200: the caller
/// delivered fine, there was just nothing to say about it.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, WebhookError> {
    let Some(expected) = state.secret.as_deref() else {
        return Err(WebhookError::NotConfigured);
    };

    let provided = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| payload.get("secret").and_then(Value::as_str));

    if provided != Some(expected) {
        warn!("webhook rejected: bad or missing secret");
        return Err(WebhookError::Unauthorized);
    }

    match normalize(sniff(&headers, payload)) {
        Some(alert) => {
            let delivered = state.sink.deliver(&alert).await;
            if delivered {
                info!(severity = alert.severity.label(), source = %alert.source, "webhook alert delivered");
            } else {
                warn!(severity = alert.severity.label(), source = %alert.source, "webhook alert delivery failed");
            }
            Ok(Json(json!({
                "status": "alert_sent",
                "delivered": delivered,
                "severity": alert.severity,
            })))
        }
        None => Ok(Json(json!({"status": "ignored"}))),
    }
}
