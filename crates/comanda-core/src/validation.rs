//! # Validation Module
//!
//! Field-level validation rules shared by entity constructors, patches and
//! the transaction recorder.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Boundary (GUI form, receipt parser)                          │
//! │  └── line_item::normalize → typed input                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Names, lengths                                                    │
//! │  └── Quantities, rates, amounts                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Catalog (comanda-store)                                      │
//! │  ├── References exist (product, raw material, supplier)                │
//! │  └── One recipe per product, no removal while referenced               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use comanda_core::validation::{validate_name, validate_quantity};
//!
//! validate_name("name", "Croissant").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_LINE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of entity names and units.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required short text field (names, units, client).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
///
/// ## Example
/// ```rust
/// use comanda_core::validation::validate_name;
///
/// assert!(validate_name("name", "Café con leche").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// assert!(validate_name("name", &"A".repeat(300)).is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text field against a maximum length.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Trims a name and returns it owned, after validating it.
pub fn clean_name(field: &str, value: &str) -> ValidationResult<String> {
    validate_name(field, value)?;
    Ok(value.trim().to_string())
}

/// Normalizes optional text: trimmed, and `None` when blank.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

// =============================================================================
// Numeric Validators
// =============================================================================

fn require_finite(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        })
    }
}

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Ticket: Add Line                                                       │
/// │                                                                         │
/// │  User enters quantity: 5                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → line joins the draft                                    │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a strictly positive, finite number (recipe quantity, yield,
/// purchase quantity).
///
/// ## Example
/// ```rust
/// use comanda_core::validation::validate_positive;
///
/// assert!(validate_positive("quantity", 0.25).is_ok());
/// assert!(validate_positive("quantity", 0.0).is_err());
/// assert!(validate_positive("quantity", f64::NAN).is_err());
/// ```
pub fn validate_positive(field: &str, value: f64) -> ValidationResult<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a finite number that is zero or greater (unit cost, stock
/// target, margin, VAT).
pub fn validate_finite_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an amount that may be zero (a free product).
///
/// ## Rules
/// - Not negative
/// - At most [`MAX_AMOUNT_CENTS`]
pub fn validate_non_negative_money(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    validate_amount_bound(field, amount)
}

/// Validates an amount that must be above zero (an expense).
pub fn validate_positive_money(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    validate_amount_bound(field, amount)
}

/// Rejects amounts above [`MAX_AMOUNT_CENTS`].
///
/// `Money::from_decimal` saturates, so a huge decimal lands here as an
/// out-of-range amount instead of wrapping later.
pub fn validate_amount_bound(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS / 100,
        });
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines on a document.
///
/// ## Rules
/// - At least one line
/// - At most MAX_LINE_ITEMS (100)
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a reference id: present and not blank.
///
/// Stored ids are UUIDs, but hand-edited files may carry other strings, so
/// lookups only require a non-empty id. Use [`validate_uuid`] for ids this
/// crate generates.
pub fn validate_reference(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use comanda_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    validate_reference("id", id)?;

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Medialuna").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(200)).is_ok());
        assert!(validate_name("name", &"A".repeat(201)).is_err());
    }

    #[test]
    fn test_clean_helpers() {
        assert_eq!(clean_name("name", "  Flour ").unwrap(), "Flour");
        assert_eq!(clean_optional(Some("  ".to_string())), None);
        assert_eq!(clean_optional(Some(" x ".to_string())), Some("x".to_string()));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(matches!(
            validate_quantity(1000),
            Err(ValidationError::OutOfRange { max: 999, .. })
        ));
    }

    #[test]
    fn test_numeric_rules() {
        assert!(validate_finite_non_negative("unit_cost", 0.0).is_ok());
        assert!(matches!(
            validate_finite_non_negative("unit_cost", -0.01),
            Err(ValidationError::MustBeNonNegative { .. })
        ));
        assert!(validate_finite_non_negative("unit_cost", f64::INFINITY).is_err());
        assert!(validate_positive("yield", 12.0).is_ok());
        assert!(validate_positive("yield", -1.0).is_err());
    }

    #[test]
    fn test_money_rules() {
        assert!(validate_non_negative_money("price", Money::zero()).is_ok());
        assert!(validate_non_negative_money("price", Money::from_cents(-1)).is_err());
        assert!(validate_positive_money("amount", Money::zero()).is_err());
        assert!(validate_positive_money("amount", Money::from_cents(1)).is_ok());
    }

    #[test]
    fn test_money_upper_bound() {
        assert!(validate_non_negative_money("price", Money::from_cents(MAX_AMOUNT_CENTS)).is_ok());
        assert!(matches!(
            validate_non_negative_money("price", Money::from_cents(MAX_AMOUNT_CENTS + 1)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_positive_money("amount", Money::from_decimal(1e17)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_amount_bound("line_total", Money::line_total(1e9, 1e9)).is_err());
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(1).is_ok());
        assert!(validate_line_count(100).is_ok());
        assert!(validate_line_count(0).is_err());
        assert!(validate_line_count(101).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
        assert!(validate_reference("product", "legacy-7").is_ok());
    }
}
