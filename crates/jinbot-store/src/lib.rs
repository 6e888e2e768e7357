//! Record store for Jinbot.
//!
//! Tasks, messages, and operator settings are each serialized as a single
//! value under a fixed key in a key-value backend. Writes are whole-collection
//! read-modify-write; there is no partial update. When the durable backend
//! fails a write, the store silently degrades to an in-process backend that
//! does not survive restarts, surfaced only through the storage label in
//! [`RecordStore::stats`].
//!
//! # Example
//!
//! ```no_run
//! use jinbot_store::RecordStore;
//! use jinbot_models::TaskPriority;
//!
//! let store = RecordStore::open("/home/user/.jinbot");
//!
//! let task = store.add_task("Water the plants", TaskPriority::Low, Vec::new()).unwrap();
//! store.complete_task(task.id);
//! ```

pub mod backend;
pub mod error;
pub mod store;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::{Result, StoreError};
pub use store::{RecordStore, StoreStats};
