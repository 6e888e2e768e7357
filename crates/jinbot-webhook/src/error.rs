//! Webhook receiver error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors returned to webhook callers as structured JSON.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The shared secret was missing or wrong.
    #[error("unauthorized")]
    Unauthorized,

    /// No shared secret is configured, so nothing can authenticate.
    #[error("webhook secret not configured")]
    NotConfigured,

    /// The payload could not be handled.
    #[error("bad payload: {0}")]
    BadPayload(String),
}

impl WebhookError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebhookError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            WebhookError::BadPayload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WebhookError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebhookError::NotConfigured.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            WebhookError::BadPayload("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(WebhookError::Unauthorized.to_string(), "unauthorized");
    }
}
