//! # Storage Backends
//!
//! A collection is one JSON document stored under a name (`products`,
//! `tickets`, ...). Backends only move text; repositories own the JSON.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         dyn Storage                                     │
//! │                                                                         │
//! │  ┌───────────────────────────┐      ┌───────────────────────────┐      │
//! │  │     JsonFileStorage        │      │      MemoryStorage         │      │
//! │  │  <data>/<name>.json        │      │  Mutex<HashMap>            │      │
//! │  │  backup → temp → rename    │      │  tests, embedding          │      │
//! │  └───────────────────────────┘      └───────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation reads the whole collection and rewrites it. There are
//! no cross-collection transactions; services order their writes and
//! restore snapshots when a later write fails.

pub mod backup;
pub mod json_file;
pub mod memory;

use std::fmt;

use crate::error::StoreResult;

pub use backup::BackupPolicy;
pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

/// Persistence of named JSON documents.
pub trait Storage: fmt::Debug + Send + Sync {
    /// Returns the stored text, or `None` when the collection was never
    /// written.
    fn load(&self, collection: &str) -> StoreResult<Option<String>>;

    /// Replaces the collection with `contents`.
    fn store(&self, collection: &str, contents: &str) -> StoreResult<()>;
}
