//! # Line Item Inputs
//!
//! Typed inputs for document lines, plus the one place where loosely-keyed
//! purchase lines are turned into typed ones.
//!
//! ## Normalization
//! ```text
//! Receipt parser / spreadsheet import
//!   {"nombre": "Harina", "cantidad": "2,5", "precio_unitario": 3.99}
//!        │
//!        ▼
//!   normalize_purchase_line(0, &value) ← THIS MODULE
//!        │
//!        ▼
//!   PurchaseLineInput { name: "Harina", quantity: 2.5, unit_cost: 3.99 }
//! ```
//!
//! Business logic only ever sees [`PurchaseLineInput`] and [`SaleLineInput`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{validate_finite_non_negative, validate_positive, ValidationResult};
use crate::ValidationError;

// =============================================================================
// Key Aliases
// =============================================================================

const RAW_MATERIAL_KEYS: &[&str] = &["raw_material_id", "materia_prima_id", "material_id", "id"];
const NAME_KEYS: &[&str] = &["name", "nombre", "description", "descripcion"];
const QUANTITY_KEYS: &[&str] = &["quantity", "cantidad", "qty"];
const UNIT_COST_KEYS: &[&str] = &[
    "unit_cost",
    "costo_unitario",
    "precio_unitario",
    "unit_price",
    "price",
];
const NOTE_KEYS: &[&str] = &["note", "nota", "notes"];

// =============================================================================
// Typed Inputs
// =============================================================================

/// One line of a sale as entered at the counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineInput {
    pub product_id: String,
    pub quantity: i64,
    /// Overrides the catalog price for this line.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub unit_price: Option<Money>,
}

impl SaleLineInput {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price: None,
        }
    }

    /// Sets a price override.
    pub fn at_price(mut self, unit_price: Money) -> Self {
        self.unit_price = Some(unit_price);
        self
    }
}

/// One received line of a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseLineInput {
    /// Raw material to restock. `None` records the line without stock effect.
    #[serde(default)]
    pub raw_material_id: Option<String>,
    /// Defaults to the raw material's name when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: f64,
    pub unit_cost: f64,
    #[serde(default)]
    pub note: Option<String>,
}

impl PurchaseLineInput {
    /// A line restocking a known raw material.
    pub fn for_material(raw_material_id: impl Into<String>, quantity: f64, unit_cost: f64) -> Self {
        Self {
            raw_material_id: Some(raw_material_id.into()),
            name: None,
            quantity,
            unit_cost,
            note: None,
        }
    }

    /// Checks the line's own numbers. `index` is used in error messages.
    pub fn validate(&self, index: usize) -> ValidationResult<()> {
        if self.raw_material_id.is_none() && self.name.is_none() {
            return Err(ValidationError::Required {
                field: format!("items[{}].name", index),
            });
        }
        validate_positive(&format!("items[{}].quantity", index), self.quantity)?;
        validate_finite_non_negative(&format!("items[{}].unit_cost", index), self.unit_cost)
    }
}

// =============================================================================
// Normalization
// =============================================================================

fn first<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let text = match first(object, keys)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parses a number written as a JSON number or a string such as `"2,5"` or
/// `"$ 3.99"`.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches(|c: char| c == '$' || c == '€' || c.is_whitespace())
                .replace(',', ".");
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn number_field(
    object: &Map<String, Value>,
    keys: &[&str],
    index: usize,
    field: &str,
) -> ValidationResult<f64> {
    let value = first(object, keys).ok_or_else(|| ValidationError::Required {
        field: format!("items[{}].{}", index, field),
    })?;
    parse_number(value).ok_or_else(|| ValidationError::InvalidFormat {
        field: format!("items[{}].{}", index, field),
        reason: format!("{} is not a number", value),
    })
}

/// Builds a typed purchase line from a loosely-keyed JSON object.
///
/// ## Example
/// ```rust
/// use comanda_core::line_item::normalize_purchase_line;
/// use serde_json::json;
///
/// let line = normalize_purchase_line(0, &json!({
///     "materia_prima_id": "mp-1",
///     "cantidad": "2,5",
///     "costo_unitario": 4
/// })).unwrap();
///
/// assert_eq!(line.raw_material_id.as_deref(), Some("mp-1"));
/// assert_eq!(line.quantity, 2.5);
/// assert_eq!(line.unit_cost, 4.0);
/// ```
pub fn normalize_purchase_line(index: usize, value: &Value) -> ValidationResult<PurchaseLineInput> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: format!("items[{}]", index),
            reason: "must be an object".to_string(),
        })?;

    let raw_material_id = text_field(object, RAW_MATERIAL_KEYS);
    let name = text_field(object, NAME_KEYS);
    if raw_material_id.is_none() && name.is_none() {
        return Err(ValidationError::Required {
            field: format!("items[{}].name", index),
        });
    }

    Ok(PurchaseLineInput {
        raw_material_id,
        name,
        quantity: number_field(object, QUANTITY_KEYS, index, "quantity")?,
        unit_cost: number_field(object, UNIT_COST_KEYS, index, "unit_cost")?,
        note: text_field(object, NOTE_KEYS),
    })
}

/// Normalizes every line, failing on the first malformed one.
pub fn normalize_purchase_lines(values: &[Value]) -> ValidationResult<Vec<PurchaseLineInput>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| normalize_purchase_line(index, value))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
