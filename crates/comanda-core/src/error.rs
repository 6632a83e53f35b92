//! # Error Types
//!
//! Domain-specific error types for comanda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  comanda-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations (stock)               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  comanda-store errors (separate crate)                                 │
//! │  └── StoreError       - NotFound, I/O, serialization                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → GUI / CLI message    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (material name, field, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Shortfall
// =============================================================================

/// One raw material that cannot cover a requested deduction.
///
/// Carries what the user needs to decide between forcing and cancelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub raw_material_id: String,
    pub name: String,
    pub required: f64,
    pub available: f64,
}

impl Shortfall {
    /// Quantity missing to cover the requirement.
    pub fn missing(&self) -> f64 {
        (self.required - self.available).max(0.0)
    }
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: required {}, available {}",
            self.name, self.required, self.available
        )
    }
}

fn list_shortfalls(shortfalls: &[Shortfall]) -> String {
    shortfalls
        .iter()
        .map(Shortfall::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more raw materials cannot cover a deduction.
    ///
    /// ## When This Occurs
    /// - A sale needs more of an ingredient than is on hand
    /// - A manual adjustment would take stock below zero
    /// - Deleting a purchase would remove stock already consumed
    ///
    /// ## User Workflow
    /// ```text
    /// Sell 3 × Bread (2kg flour each)
    ///      │
    ///      ▼
    /// Check stock: flour available=4
    ///      │
    ///      ▼
    /// InsufficientStock { Flour: required 6, available 4 }
    ///      │
    ///      ▼
    /// UI asks: force the sale or cancel?
    /// ```
    #[error("Insufficient stock: {}", list_shortfalls(.shortfalls))]
    InsufficientStock { shortfalls: Vec<Shortfall> },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InsufficientStock error for a single material.
    pub fn insufficient(shortfall: Shortfall) -> Self {
        CoreError::InsufficientStock {
            shortfalls: vec![shortfall],
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any stock or file is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or positive.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., a second recipe for one product).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A reference to another entity that does not exist.
    #[error("{entity} '{id}' does not exist")]
    UnknownReference { entity: String, id: String },

    /// A product marked unavailable was put on a sale.
    #[error("'{name}' is not available for sale")]
    Unavailable { name: String },

    /// The entity is still referenced and cannot be removed.
    #[error("{entity} '{id}' is still used by {used_by}")]
    InUse {
        entity: String,
        id: String,
        used_by: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn flour(required: f64, available: f64) -> Shortfall {
        Shortfall {
            raw_material_id: "mp-1".to_string(),
            name: "Flour".to_string(),
            required,
            available,
        }
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::insufficient(flour(6.0, 4.0));
        assert_eq!(
            err.to_string(),
            "Insufficient stock: Flour: required 6, available 4"
        );
    }

    #[test]
    fn test_multiple_shortfalls_listed() {
        let mut milk = flour(1.5, 0.25);
        milk.name = "Milk".to_string();
        let err = CoreError::InsufficientStock {
            shortfalls: vec![flour(6.0, 4.0), milk],
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock: Flour: required 6, available 4; Milk: required 1.5, available 0.25"
        );
    }

    #[test]
    fn test_shortfall_missing() {
        assert_eq!(flour(6.0, 4.0).missing(), 2.0);
        assert_eq!(flour(6.0, -1.0).missing(), 7.0);
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "client".to_string(),
        };
        assert_eq!(err.to_string(), "client is required");

        let err = ValidationError::UnknownReference {
            entity: "RawMaterial".to_string(),
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "RawMaterial 'abc' does not exist");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
