//! The record store: tasks, messages, and operator settings.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use jinbot_core::extract::{auto_tags, extract_action_items, merge_tags};
use jinbot_models::{ChatMessage, Task, TaskPriority, TaskStatus};

use crate::backend::{FileBackend, KvBackend, MemoryBackend};
use crate::error::{Result, StoreError};

/// Fixed key for the task collection (and its id counter).
const TASKS_KEY: &str = "tasks";

/// Fixed key for the message collection.
const MESSAGES_KEY: &str = "messages";

/// Fixed key for the operator settings map.
const SETTINGS_KEY: &str = "settings";

/// The message collection never holds more than this many entries.
const MESSAGE_RETENTION: usize = 1000;

/// Action items at or below this length do not become tasks.
const MIN_ACTION_ITEM_LEN: usize = 10;

/// Tag marking tasks created from extracted action items.
const AUTO_TAG: &str = "auto-extracted";

/// Task collection as stored: the id counter lives alongside the tasks
/// so both are covered by the same read-modify-write cycle.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TaskCollection {
    /// Last assigned task id.
    next_id: u64,
    tasks: Vec<Task>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MessageCollection {
    messages: Vec<ChatMessage>,
}

/// Statistics over the stored collections.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    /// Total number of tasks, any status.
    pub total_tasks: usize,
    /// Tasks still pending.
    pub pending_tasks: usize,
    /// Tasks completed.
    pub completed_tasks: usize,
    /// Number of stored messages.
    pub message_count: usize,
    /// Which backend reads and writes currently hit.
    pub storage: &'static str,
}

/// The record store.
///
/// Every operation reads the whole collection, mutates it, and writes
/// the whole collection back. Concurrent writers can lose updates; that
/// is an accepted limitation of single-operator usage, not a bug the
/// store tries to fix with locks or transactions.
pub struct RecordStore {
    durable: Box<dyn KvBackend>,
    fallback: MemoryBackend,
    /// Set once a durable write has failed; from then on the store
    /// reads and writes the in-process fallback.
    degraded: AtomicBool,
}

impl RecordStore {
    /// Creates a store over the given durable backend.
    pub fn new(durable: Box<dyn KvBackend>) -> Self {
        Self {
            durable,
            fallback: MemoryBackend::new(),
            degraded: AtomicBool::new(false),
        }
    }

    /// Creates a store over a file-backed durable backend in `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileBackend::new(dir)))
    }

    /// Creates a purely in-process store (nothing survives a restart).
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Which backend operations currently hit.
    pub fn storage_label(&self) -> &'static str {
        if self.degraded.load(Ordering::Relaxed) {
            self.fallback.label()
        } else {
            self.durable.label()
        }
    }

    fn backend(&self) -> &dyn KvBackend {
        if self.degraded.load(Ordering::Relaxed) {
            &self.fallback
        } else {
            self.durable.as_ref()
        }
    }

    /// Loads a collection, treating every failure mode as "nothing
    /// stored yet".
    fn load<T: Default + DeserializeOwned>(&self, key: &str) -> T {
        match self.backend().get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "stored value does not parse, treating as empty");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, error = %e, "backend read failed, treating as empty");
                T::default()
            }
        }
    }

    /// Saves a collection. Returns true when the write reached durable
    /// storage; false means the value only lives in the in-process
    /// fallback now.
    fn save<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize collection");
                return false;
            }
        };

        if !self.degraded.load(Ordering::Relaxed) {
            match self.durable.put(key, &raw) {
                Ok(()) => return true,
                Err(e) => {
                    warn!(key, error = %e, "durable write failed, degrading to in-process storage");
                    self.degraded.store(true, Ordering::Relaxed);
                }
            }
        }

        if let Err(e) = self.fallback.put(key, &raw) {
            warn!(key, error = %e, "fallback write failed");
        }
        false
    }

    // ---- Tasks ----

    /// Adds a task and returns it with its assigned id.
    pub fn add_task(
        &self,
        description: impl Into<String>,
        priority: TaskPriority,
        tags: Vec<String>,
    ) -> Result<Task> {
        self.create_task(description.into(), priority, tags, None)
    }

    fn create_task(
        &self,
        description: String,
        priority: TaskPriority,
        tags: Vec<String>,
        source: Option<String>,
    ) -> Result<Task> {
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(StoreError::EmptyDescription);
        }

        let mut collection: TaskCollection = self.load(TASKS_KEY);
        collection.next_id += 1;

        let mut task = Task::with_priority(collection.next_id, description, priority);
        task.source = source;
        for tag in tags {
            task.add_tag(tag);
        }

        collection.tasks.push(task.clone());
        if !self.save(TASKS_KEY, &collection) {
            debug!(task_id = task.id, "task saved to non-durable storage");
        }
        Ok(task)
    }

    /// Completes a task by id.
    ///
    /// Returns the completed record, the unchanged record when it was
    /// already completed, or `None` for an unknown id.
    pub fn complete_task(&self, id: u64) -> Option<Task> {
        let mut collection: TaskCollection = self.load(TASKS_KEY);
        let task = collection.tasks.iter_mut().find(|t| t.id == id)?;

        if !task.is_pending() {
            return Some(task.clone());
        }

        task.complete();
        let snapshot = task.clone();
        self.save(TASKS_KEY, &collection);
        Some(snapshot)
    }

    /// Pending tasks, highest priority first, newest first within a
    /// priority, truncated to `limit`.
    pub fn pending_tasks(&self, limit: usize) -> Vec<Task> {
        let collection: TaskCollection = self.load(TASKS_KEY);
        let mut tasks: Vec<Task> = collection
            .tasks
            .into_iter()
            .filter(|t| t.is_pending())
            .collect();

        tasks.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        tasks.truncate(limit);
        tasks
    }

    /// Case-insensitive substring search over descriptions and tags,
    /// optionally filtered by status. Results keep stored order.
    pub fn search_tasks(&self, keyword: &str, status: Option<TaskStatus>) -> Vec<Task> {
        let needle = keyword.to_lowercase();
        let collection: TaskCollection = self.load(TASKS_KEY);
        collection
            .tasks
            .into_iter()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .filter(|t| t.matches(&needle))
            .collect()
    }

    // ---- Messages ----

    /// Saves a message: derives tags and action items, enforces the
    /// retention cap, and creates one auto-extracted task per action
    /// item longer than 10 characters.
    pub fn add_message(
        &self,
        text: impl Into<String>,
        source_chat: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<ChatMessage> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let source_chat = source_chat.into();

        let mut message = ChatMessage::new(text, source_chat.clone());
        message.tags = merge_tags(auto_tags(&message.text), &tags);
        message.action_items = extract_action_items(&message.text);

        let mut collection: MessageCollection = self.load(MESSAGES_KEY);
        collection.messages.push(message.clone());
        if collection.messages.len() > MESSAGE_RETENTION {
            let excess = collection.messages.len() - MESSAGE_RETENTION;
            collection.messages.drain(..excess);
        }
        self.save(MESSAGES_KEY, &collection);

        // Fire-and-forget: the message does not remember which tasks it
        // spawned, and a task failure never fails the message.
        for item in &message.action_items {
            if item.chars().count() > MIN_ACTION_ITEM_LEN {
                if let Err(e) = self.create_task(
                    item.clone(),
                    TaskPriority::Medium,
                    vec![AUTO_TAG.to_string()],
                    Some(source_chat.clone()),
                ) {
                    warn!(error = %e, "could not create auto-extracted task");
                }
            }
        }

        Ok(message)
    }

    /// Case-insensitive substring search over text, tags, and source
    /// chat, newest first, truncated to `limit`.
    pub fn search_messages(&self, keyword: &str, limit: usize) -> Vec<ChatMessage> {
        let needle = keyword.to_lowercase();
        let collection: MessageCollection = self.load(MESSAGES_KEY);
        let mut matches: Vec<ChatMessage> = collection
            .messages
            .into_iter()
            .filter(|m| m.matches(&needle))
            .collect();

        matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matches.truncate(limit);
        matches
    }

    /// Messages from the last `hours` hours, newest first, truncated to
    /// `limit`.
    pub fn recent_messages(&self, hours: i64, limit: usize) -> Vec<ChatMessage> {
        let cutoff = Utc::now() - Duration::hours(hours);
        let collection: MessageCollection = self.load(MESSAGES_KEY);
        let mut recent: Vec<ChatMessage> = collection
            .messages
            .into_iter()
            .filter(|m| m.timestamp > cutoff)
            .collect();

        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit);
        recent
    }

    // ---- Settings ----

    /// Stores an operator setting. Returns the durable-write flag.
    pub fn set_setting(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let mut map: BTreeMap<String, String> = self.load(SETTINGS_KEY);
        map.insert(key.into(), value.into());
        self.save(SETTINGS_KEY, &map)
    }

    /// Fetches an operator setting.
    pub fn get_setting(&self, key: &str) -> Option<String> {
        let map: BTreeMap<String, String> = self.load(SETTINGS_KEY);
        map.get(key).cloned()
    }

    /// All operator settings, sorted by key.
    pub fn settings(&self) -> BTreeMap<String, String> {
        self.load(SETTINGS_KEY)
    }

    // ---- Statistics ----

    /// Counts per collection plus the current storage label.
    pub fn stats(&self) -> StoreStats {
        let tasks: TaskCollection = self.load(TASKS_KEY);
        let messages: MessageCollection = self.load(MESSAGES_KEY);
        let pending = tasks.tasks.iter().filter(|t| t.is_pending()).count();

        StoreStats {
            total_tasks: tasks.tasks.len(),
            pending_tasks: pending,
            completed_tasks: tasks.tasks.len() - pending,
            message_count: messages.messages.len(),
            storage: self.storage_label(),
        }
    }
}
