//! In-process storage for tests and embedding.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::Storage;
use crate::error::StoreResult;

/// Keeps collections in a map. Nothing touches the file system.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    collections: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, collection: &str) -> StoreResult<Option<String>> {
        let collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(collections.get(collection).cloned())
    }

    fn store(&self, collection: &str, contents: &str) -> StoreResult<()> {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        collections.insert(collection.to_string(), contents.to_string());
        Ok(())
    }
}
