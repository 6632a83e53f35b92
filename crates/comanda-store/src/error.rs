//! # Store Error Types
//!
//! Error types for storage and service operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError / CoreError (comanda-core)                            │
//! │  std::io::Error, serde_json::Error                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds path, entity and id context           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError::kind() ← GUI / CLI picks the message and dialog           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use comanda_core::{CoreError, Shortfall, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Storage and service errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - Updating or deleting an id that doesn't exist
    /// - A sale line names a deleted product
    /// - A purchase line names a deleted raw material
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Business rule violation from comanda-core (validation, stock).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Reading or writing a collection file failed.
    ///
    /// ## When This Occurs
    /// - Data directory can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection could not be encoded.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The tickets.csv mirror could not be written.
    #[error("Spreadsheet mirror failed: {0}")]
    Mirror(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an Io error carrying the path involved.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Classifies the error for the calling layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Core(CoreError::InsufficientStock { .. }) => ErrorKind::InsufficientStock,
            StoreError::Core(CoreError::Validation(_)) => ErrorKind::Validation,
            StoreError::Io { .. } | StoreError::Serialization(_) | StoreError::Mirror(_) => {
                ErrorKind::Storage
            }
        }
    }

    /// The short materials when this is a stock error.
    pub fn shortfalls(&self) -> Option<&[Shortfall]> {
        match self {
            StoreError::Core(CoreError::InsufficientStock { shortfalls }) => Some(shortfalls),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Core(CoreError::Validation(err))
    }
}

/// Error categories the GUI / CLI reacts to differently.
///
/// ```text
/// Validation         → show message, let the user fix the form
/// NotFound           → show message, refresh the list
/// InsufficientStock  → list shortfalls, offer "force" or "cancel"
/// Storage            → show message, nothing was written
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    InsufficientStock,
    Storage,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
