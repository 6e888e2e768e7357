//! Shared configuration and text heuristics for Jinbot.
//!
//! This crate holds what every other Jinbot crate needs: the env-var
//! driven configuration structs and the keyword heuristics that turn
//! free text into tags and candidate tasks.

pub mod config;
pub mod extract;

pub use config::{BotConfig, ConfigError, MonitorConfig};
pub use extract::{auto_tags, extract_action_items, merge_tags};
