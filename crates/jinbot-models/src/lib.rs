//! Shared data types for Jinbot.
//!
//! This crate defines the records the bot persists (tasks, chat messages),
//! the ephemeral monitoring types (alerts, endpoint health results), and
//! the ID wrappers used across the workspace.

pub mod alert;
pub mod health;
pub mod ids;
pub mod message;
pub mod task;

pub use alert::{Alert, Severity};
pub use health::{EndpointHealth, RunSummary};
pub use ids::MessageId;
pub use message::ChatMessage;
pub use task::{Task, TaskPriority, TaskStatus};
