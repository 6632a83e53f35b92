//! # Repository Module
//!
//! Generic repository over one JSON collection.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Catalog / Ledger / Recorder                                           │
//! │       │                                                                 │
//! │       │  catalog.products().get_by_id("...")                           │
//! │       ▼                                                                 │
//! │  Repository<Product>                                                   │
//! │  ├── list()            missing / malformed file → []                   │
//! │  ├── get_by_id(id)     linear scan                                     │
//! │  ├── insert(entity)                                                    │
//! │  ├── replace(entity)   NotFound if absent                              │
//! │  ├── delete(id)        NotFound if absent                              │
//! │  ├── save_all(items)                                                   │
//! │  └── count()                                                           │
//! │       │                                                                 │
//! │       │  whole-collection read / rewrite                               │
//! │       ▼                                                                 │
//! │  dyn Storage ("products")                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories do not check references between collections; the catalog
//! does that before calling them.

pub mod collection;

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::storage::Storage;
use comanda_core::ValidationError;

pub use collection::Collection;

/// Repository over the collection of `T`.
///
/// ## Usage
/// ```rust
/// use comanda_store::Catalog;
///
/// let catalog = Catalog::in_memory();
/// assert_eq!(catalog.products().count(), 0);
/// assert!(catalog.products().get_by_id("nope").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Repository<T> {
    storage: Arc<dyn Storage>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Collection> Repository<T> {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Repository {
            storage,
            _entity: PhantomData,
        }
    }

    /// Loads every entity.
    ///
    /// Never fails: an unreadable or malformed collection reads as empty,
    /// and single records that don't decode are skipped. Both are logged.
    pub fn list(&self) -> Vec<T> {
        let text = match self.storage.load(T::NAME) {
            Ok(Some(text)) => text,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(collection = T::NAME, error = %e, "Collection unreadable, using empty list");
                return Vec::new();
            }
        };

        if text.trim().is_empty() {
            return Vec::new();
        }

        let values: Vec<Value> = match serde_json::from_str(&text) {
            Ok(values) => values,
            Err(e) => {
                warn!(collection = T::NAME, error = %e, "Collection malformed, using empty list");
                return Vec::new();
            }
        };

        values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!(collection = T::NAME, index, error = %e, "Skipping malformed record");
                    None
                }
            })
            .collect()
    }

    /// Finds an entity by id.
    pub fn get_by_id(&self, id: &str) -> Option<T> {
        self.list().into_iter().find(|entity| entity.id() == id)
    }

    /// Like [`get_by_id`](Self::get_by_id), failing with NotFound.
    pub fn require(&self, id: &str) -> StoreResult<T> {
        self.get_by_id(id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))
    }

    /// Number of stored entities.
    pub fn count(&self) -> usize {
        self.list().len()
    }

    /// Appends an entity.
    ///
    /// ## Returns
    /// * `Ok(T)` - The stored entity
    /// * `Err(Validation(Duplicate))` - An entity with the same id exists
    pub fn insert(&self, entity: T) -> StoreResult<T> {
        debug!(collection = T::NAME, id = %entity.id(), "Inserting");

        let mut items = self.list();
        if items.iter().any(|existing| existing.id() == entity.id()) {
            return Err(ValidationError::Duplicate {
                field: "id".to_string(),
                value: entity.id().to_string(),
            }
            .into());
        }

        items.push(entity.clone());
        self.save_all(&items)?;
        Ok(entity)
    }

    /// Replaces the entity with the same id.
    pub fn replace(&self, entity: T) -> StoreResult<T> {
        debug!(collection = T::NAME, id = %entity.id(), "Replacing");

        let mut items = self.list();
        let slot = items
            .iter_mut()
            .find(|existing| existing.id() == entity.id())
            .ok_or_else(|| StoreError::not_found(T::KIND, entity.id()))?;
        *slot = entity.clone();

        self.save_all(&items)?;
        Ok(entity)
    }

    /// Removes an entity and returns it.
    pub fn delete(&self, id: &str) -> StoreResult<T> {
        debug!(collection = T::NAME, id = %id, "Deleting");

        let mut items = self.list();
        let position = items
            .iter()
            .position(|entity| entity.id() == id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))?;
        let removed = items.remove(position);

        self.save_all(&items)?;
        Ok(removed)
    }

    /// Rewrites the whole collection.
    pub fn save_all(&self, items: &[T]) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(items)?;
        self.storage.store(T::NAME, &text)
    }
}
