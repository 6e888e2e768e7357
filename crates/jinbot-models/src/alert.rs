//! Monitoring alerts.
//!
//! Alerts are ephemeral: produced by the monitoring loop or the webhook
//! normalizer, consumed once by a delivery sink, never persisted.

use serde::{Deserialize, Serialize};

/// Alert severity.
///
/// Higher numeric value = more urgent.
/// Critical (4) > High (3) > Medium (2) > Low (1)
///
/// Severity controls presentation only; every alert goes to the single
/// configured destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational (1).
    Low,
    /// Worth a look (2).
    #[default]
    Medium,
    /// Needs attention soon (3).
    High,
    /// Needs attention now (4).
    Critical,
}

impl Severity {
    /// Returns the numeric value of this severity.
    /// Higher value = more urgent.
    pub fn as_value(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    /// Fixed presentation marker shown in front of the alert message.
    pub fn marker(&self) -> &'static str {
        match self {
            Severity::Low => "🔵",
            Severity::Medium => "🟡",
            Severity::High => "🟠",
            Severity::Critical => "🔴",
        }
    }

    /// Upper-case label for the alert header.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Parses a severity keyword, case-insensitive.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_value().cmp(&other.as_value())
    }
}

/// A single alert headed for the configured chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Main alert message.
    pub message: String,

    /// How urgent this is.
    pub severity: Severity,

    /// Which subsystem produced the alert (e.g. "monitor", "github").
    pub source: String,

    /// Optional extra context shown below the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Alert {
    /// Creates a new alert without context.
    pub fn new(message: impl Into<String>, severity: Severity, source: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            source: source.into(),
            context: None,
        }
    }

    /// Attaches context to the alert.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
