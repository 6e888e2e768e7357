//! Payload sniffing and normalization.
//!
//! Each known source is a tagged variant with its own rule table.
//! Sniffing is an ordered sequence of "does this look like source X"
//! checks, falling through to the generic variant. A `None` from
//! [`normalize`] means "acknowledge receipt, no alert", not an error.

use axum::http::HeaderMap;
use serde_json::Value;

use jinbot_models::{Alert, Severity};

/// Header GitHub stamps on every webhook delivery.
const GITHUB_EVENT_HEADER: &str = "x-github-event";

/// A webhook payload classified by source.
#[derive(Debug)]
pub enum WebhookSource {
    /// GitHub event, identified by the `x-github-event` header.
    GitHub { event: String, payload: Value },
    /// Vercel deployment event, identified by its payload shape.
    Vercel { payload: Value },
    /// Anything else: treated as a generic alert payload.
    Generic { payload: Value },
}

/// Classifies an incoming payload by headers and shape.
pub fn sniff(headers: &HeaderMap, payload: Value) -> WebhookSource {
    if let Some(event) = headers
        .get(GITHUB_EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        return WebhookSource::GitHub {
            event: event.to_string(),
            payload,
        };
    }

    let looks_like_vercel = payload
        .get("type")
        .and_then(Value::as_str)
        .map(|t| t.starts_with("deployment."))
        .unwrap_or(false);
    if looks_like_vercel {
        return WebhookSource::Vercel { payload };
    }

    WebhookSource::Generic { payload }
}

/// Runs a classified payload through its rule table.
pub fn normalize(source: WebhookSource) -> Option<Alert> {
    match source {
        WebhookSource::GitHub { event, payload } => normalize_github(&event, &payload),
        WebhookSource::Vercel { payload } => normalize_vercel(&payload),
        WebhookSource::Generic { payload } => normalize_generic(&payload),
    }
}

fn normalize_github(event: &str, payload: &Value) -> Option<Alert> {
    let repo = payload
        .pointer("/repository/full_name")
        .and_then(Value::as_str)
        .unwrap_or("unknown repo");

    match event {
        "push" => {
            let pusher = payload
                .pointer("/pusher/name")
                .and_then(Value::as_str)
                .unwrap_or("someone");
            Some(Alert::new(
                format!("Push to {} by {}", repo, pusher),
                Severity::Low,
                "github",
            ))
        }
        "workflow_run" => {
            let conclusion = payload
                .pointer("/workflow_run/conclusion")
                .and_then(Value::as_str)?;
            if conclusion != "failure" {
                return None;
            }
            let name = payload
                .pointer("/workflow_run/name")
                .and_then(Value::as_str)
                .unwrap_or("workflow");
            Some(Alert::new(
                format!("CI failed: {} on {}", name, repo),
                Severity::High,
                "github",
            ))
        }
        "issues" => {
            if payload.get("action").and_then(Value::as_str) != Some("opened") {
                return None;
            }
            let title = payload
                .pointer("/issue/title")
                .and_then(Value::as_str)
                .unwrap_or("untitled");
            Some(Alert::new(
                format!("Issue opened on {}: {}", repo, title),
                Severity::Medium,
                "github",
            ))
        }
        _ => None,
    }
}

fn normalize_vercel(payload: &Value) -> Option<Alert> {
    let project = payload
        .pointer("/payload/deployment/name")
        .or_else(|| payload.pointer("/payload/name"))
        .and_then(Value::as_str)
        .unwrap_or("unknown project");

    match payload.get("type").and_then(Value::as_str)? {
        "deployment.error" | "deployment.failed" => Some(Alert::new(
            format!("Deployment failed: {}", project),
            Severity::High,
            "vercel",
        )),
        "deployment.succeeded" => Some(Alert::new(
            format!("Deployed: {}", project),
            Severity::Low,
            "vercel",
        )),
        _ => None,
    }
}

fn normalize_generic(payload: &Value) -> Option<Alert> {
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())?;

    let severity = payload
        .get("severity")
        .and_then(Value::as_str)
        .and_then(Severity::from_keyword)
        .unwrap_or(Severity::Medium);

    let source = payload
        .get("source")
        .and_then(Value::as_str)
        .unwrap_or("webhook");

    let mut alert = Alert::new(message, severity, source);
    if let Some(context) = payload.get("context").and_then(Value::as_str) {
        alert = alert.with_context(context);
    }
    Some(alert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn github_headers(event: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(GITHUB_EVENT_HEADER, event.parse().unwrap());
        headers
    }

    #[test]
    fn test_sniff_github_by_header() {
        let source = sniff(&github_headers("push"), json!({}));
        assert!(matches!(source, WebhookSource::GitHub { event, .. } if event == "push"));
    }

    #[test]
    fn test_sniff_vercel_by_shape() {
        let source = sniff(&HeaderMap::new(), json!({"type": "deployment.succeeded"}));
        assert!(matches!(source, WebhookSource::Vercel { .. }));
    }

    #[test]
    fn test_sniff_falls_through_to_generic() {
        let source = sniff(&HeaderMap::new(), json!({"message": "hi"}));
        assert!(matches!(source, WebhookSource::Generic { .. }));
    }

    #[test]
    fn test_github_workflow_failure_is_high() {
        let payload = json!({
            "repository": {"full_name": "jin/jinbot"},
            "workflow_run": {"name": "ci", "conclusion": "failure"}
        });
        let alert = normalize(WebhookSource::GitHub {
            event: "workflow_run".to_string(),
            payload,
        })
        .unwrap();

        assert_eq!(alert.severity, Severity::High);
        assert!(alert.message.contains("jin/jinbot"));
    }

    #[test]
    fn test_github_workflow_success_is_quiet() {
        let payload = json!({
            "workflow_run": {"name": "ci", "conclusion": "success"}
        });
        assert!(normalize(WebhookSource::GitHub {
            event: "workflow_run".to_string(),
            payload,
        })
        .is_none());
    }

    #[test]
    fn test_github_push_is_low() {
        let payload = json!({
            "repository": {"full_name": "jin/jinbot"},
            "pusher": {"name": "jin"}
        });
        let alert = normalize(WebhookSource::GitHub {
            event: "push".to_string(),
            payload,
        })
        .unwrap();

        assert_eq!(alert.severity, Severity::Low);
        assert_eq!(alert.message, "Push to jin/jinbot by jin");
    }

    #[test]
    fn test_github_issue_closed_has_no_rule() {
        let payload = json!({"action": "closed", "issue": {"title": "broken"}});
        assert!(normalize(WebhookSource::GitHub {
            event: "issues".to_string(),
            payload,
        })
        .is_none());
    }

    #[test]
    fn test_github_unknown_event_has_no_rule() {
        assert!(normalize(WebhookSource::GitHub {
            event: "star".to_string(),
            payload: json!({}),
        })
        .is_none());
    }

    #[test]
    fn test_vercel_error_is_high() {
        let payload = json!({
            "type": "deployment.error",
            "payload": {"deployment": {"name": "jinbot"}}
        });
        let alert = normalize(WebhookSource::Vercel { payload }).unwrap();

        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.message, "Deployment failed: jinbot");
    }

    #[test]
    fn test_vercel_created_is_quiet() {
        let payload = json!({"type": "deployment.created"});
        assert!(normalize(WebhookSource::Vercel { payload }).is_none());
    }

    #[test]
    fn test_generic_with_message() {
        let payload = json!({
            "message": "disk almost full",
            "severity": "critical",
            "source": "backup-box",
            "context": "93% used"
        });
        let alert = normalize(WebhookSource::Generic { payload }).unwrap();

        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.source, "backup-box");
        assert_eq!(alert.context.as_deref(), Some("93% used"));
    }

    #[test]
    fn test_generic_defaults_to_medium() {
        let payload = json!({"message": "heads up"});
        let alert = normalize(WebhookSource::Generic { payload }).unwrap();
        assert_eq!(alert.severity, Severity::Medium);
        assert_eq!(alert.source, "webhook");
    }

    #[test]
    fn test_generic_without_message_is_quiet() {
        assert!(normalize(WebhookSource::Generic {
            payload: json!({"severity": "high"})
        })
        .is_none());
        assert!(normalize(WebhookSource::Generic {
            payload: json!({"message": "   "})
        })
        .is_none());
    }
}
