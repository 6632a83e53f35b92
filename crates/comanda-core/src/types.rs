//! # Domain Types
//!
//! Core domain types used throughout Comanda.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │◄──│     Recipe      │──►│  RawMaterial    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  product_id     │   │  id (UUID)      │       │
//! │  │  name           │   │  ingredients[]  │   │  unit_cost      │       │
//! │  │  price (Money)  │   │  yield          │   │  stock          │       │
//! │  │  available      │   │  procedure      │   │  min_stock      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Ticket       │   │    Purchase     │   │ AdditionalExp.  │       │
//! │  │  client         │   │  supplier       │   │  amount         │       │
//! │  │  items[] (snap) │   │  items[] (snap) │   │  timestamp      │       │
//! │  │  total          │   │  total          │   └─────────────────┘       │
//! │  │  stock_movements│   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity and Snapshots
//! - Every entity carries a UUID v4 `id`, stable for its lifetime.
//! - References between collections are ids only, never back-pointers.
//! - Ticket and purchase lines freeze the referenced name and price so
//!   history stays readable after the catalog entry changes or disappears.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::timestamp::parse_timestamp;
use crate::validation::{
    validate_finite_non_negative, validate_name, validate_non_negative_money,
    validate_optional_text, validate_positive, validate_positive_money, validate_quantity,
    ValidationResult,
};
use crate::ValidationError;

/// Generates a new entity identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Entity Trait
// =============================================================================

/// Common surface of every persisted entity.
///
/// ## Usage
/// Repositories are generic over `Entity`: the `KIND` names the entity in
/// error messages and logs, `id()` drives lookups.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// Human-readable entity name ("Product", "RawMaterial", ...).
    const KIND: &'static str;

    /// The entity's unique identifier.
    fn id(&self) -> &str;

    /// Checks the entity's own invariants (not cross-collection references).
    fn validate(&self) -> ValidationResult<()>;
}

// =============================================================================
// Raw Material
// =============================================================================

/// An inventory-tracked input consumed by production (flour, milk).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RawMaterial {
    pub id: String,

    pub name: String,

    /// Unit of measure ("kg", "l", "unit").
    pub unit: String,

    /// Cost per unit of measure.
    pub unit_cost: f64,

    /// Quantity on hand. Only a forced sale may leave it below zero.
    pub stock: f64,

    /// Threshold for low-stock alerts.
    #[serde(default)]
    pub min_stock: f64,
}

impl RawMaterial {
    /// Checks if stock has fallen below the minimum threshold.
    pub fn is_below_minimum(&self) -> bool {
        self.stock < self.min_stock
    }

    /// Value of the stock on hand at current unit cost.
    pub fn stock_value(&self) -> f64 {
        self.stock.max(0.0) * self.unit_cost
    }
}

// =============================================================================
// Product
// =============================================================================

/// A sellable item. Availability of ingredients is derived from raw-material
/// stock through its recipe; products carry no stock of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,

    pub name: String,

    /// Unit sale price.
    #[ts(type = "number")]
    pub price: Money,

    /// Whether the product can be sold.
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Recipe
// =============================================================================

/// One line of a bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ingredient {
    pub raw_material_id: String,

    /// Quantity of the raw material needed for one batch.
    pub quantity: f64,
}

/// Bill of materials for exactly one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Recipe {
    pub id: String,

    pub product_id: String,

    pub ingredients: Vec<Ingredient>,

    /// Sellable units produced by one batch.
    #[serde(rename = "yield", default = "default_yield")]
    pub batch_yield: f64,

    /// Free-text preparation steps.
    #[serde(default)]
    pub procedure: Option<String>,
}

fn default_yield() -> f64 {
    1.0
}

impl Recipe {
    /// Yield used for scaling: a non-positive yield in old data counts as 1.
    pub fn effective_yield(&self) -> f64 {
        if self.batch_yield > 0.0 {
            self.batch_yield
        } else {
            1.0
        }
    }

    /// Checks whether any ingredient uses the given raw material.
    pub fn uses_raw_material(&self, raw_material_id: &str) -> bool {
        self.ingredients
            .iter()
            .any(|i| i.raw_material_id == raw_material_id)
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    /// Phone, email, address: free text.
    #[serde(default)]
    pub contact: Option<String>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A received line on a supplier purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseLineItem {
    /// Raw material restocked by this line. Lines without one (an unmatched
    /// receipt line, a cleaning product) are recorded without stock effect.
    #[serde(default)]
    pub raw_material_id: Option<String>,

    /// Name at time of purchase (frozen).
    pub name: String,

    pub quantity: f64,

    /// Cost per unit of measure at time of purchase (frozen).
    pub unit_cost: f64,

    /// quantity × unit_cost, rounded to cents.
    #[ts(type = "number")]
    pub line_total: Money,

    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Purchase {
    pub id: String,

    pub supplier_id: String,

    /// Supplier name at time of purchase (frozen).
    pub supplier_name: String,

    pub timestamp: String,

    pub items: Vec<PurchaseLineItem>,

    /// Sum of line totals.
    #[ts(type = "number")]
    pub total: Money,
}

impl Purchase {
    /// Parsed timestamp, `None` if the stored text is malformed.
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// Stock received per raw material, in line order.
    pub fn stock_movements(&self) -> Vec<StockMovement> {
        self.items
            .iter()
            .filter_map(|item| {
                item.raw_material_id.as_ref().map(|id| StockMovement {
                    raw_material_id: id.clone(),
                    quantity: item.quantity,
                })
            })
            .collect()
    }
}

// =============================================================================
// Ticket (Sale)
// =============================================================================

/// A sold line on a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineItem {
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub name: String,

    pub quantity: i64,

    /// Unit price at time of sale (frozen).
    #[ts(type = "number")]
    pub unit_price: Money,

    /// unit_price × quantity.
    #[ts(type = "number")]
    pub line_total: Money,
}

/// A raw-material quantity applied to stock by a committed document.
///
/// Always positive; the document type decides the direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockMovement {
    pub raw_material_id: String,
    pub quantity: f64,
}

/// A recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ticket {
    pub id: String,

    pub client: String,

    pub timestamp: String,

    pub items: Vec<SaleLineItem>,

    #[ts(type = "number")]
    pub total: Money,

    /// Raw materials deducted when the ticket was committed.
    #[serde(default)]
    pub stock_movements: Vec<StockMovement>,

    /// Committed with the force flag despite a stock shortfall.
    #[serde(default)]
    pub forced: bool,
}

impl Ticket {
    /// Parsed timestamp, `None` if the stored text is malformed.
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// Total units across all lines.
    pub fn total_units(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Additional Expense
// =============================================================================

/// An operating cost outside purchases (rent, electricity, repairs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdditionalExpense {
    pub id: String,

    pub name: String,

    #[ts(type = "number")]
    pub amount: Money,

    pub timestamp: String,

    #[serde(default)]
    pub description: Option<String>,
}

impl AdditionalExpense {
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }
}

// =============================================================================
// Sales Plan
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesPlanEntry {
    pub product_id: String,

    /// Units forecast for the plan period.
    pub units: i64,

    #[ts(type = "number")]
    pub base_price: Money,
}

/// A named sales forecast used for pricing projections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesPlan {
    pub id: String,
    pub name: String,
    pub entries: Vec<SalesPlanEntry>,
    pub updated_at: String,
}

// =============================================================================
// Entity Implementations
// =============================================================================

impl Entity for RawMaterial {
    const KIND: &'static str = "RawMaterial";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_name("unit", &self.unit)?;
        validate_finite_non_negative("unit_cost", self.unit_cost)?;
        if !self.stock.is_finite() {
            return Err(ValidationError::InvalidFormat {
                field: "stock".to_string(),
                reason: "must be a finite number".to_string(),
            });
        }
        validate_finite_non_negative("min_stock", self.min_stock)
    }
}

impl Entity for Product {
    const KIND: &'static str = "Product";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_non_negative_money("price", self.price)
    }
}

impl Entity for Recipe {
    const KIND: &'static str = "Recipe";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("product_id", &self.product_id)?;
        if self.ingredients.is_empty() {
            return Err(ValidationError::Required {
                field: "ingredients".to_string(),
            });
        }
        for ingredient in &self.ingredients {
            validate_name("raw_material_id", &ingredient.raw_material_id)?;
            validate_positive("ingredient quantity", ingredient.quantity)?;
        }
        validate_positive("yield", self.batch_yield)?;
        validate_optional_text("procedure", self.procedure.as_deref(), 10_000)
    }
}

impl Entity for Supplier {
    const KIND: &'static str = "Supplier";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_optional_text("contact", self.contact.as_deref(), 500)
    }
}

impl Entity for Purchase {
    const KIND: &'static str = "Purchase";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("supplier", &self.supplier_id)?;
        if self.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            });
        }
        for item in &self.items {
            validate_name("item name", &item.name)?;
            validate_positive("quantity", item.quantity)?;
            validate_finite_non_negative("unit_cost", item.unit_cost)?;
        }
        Ok(())
    }
}

impl Entity for Ticket {
    const KIND: &'static str = "Ticket";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("client", &self.client)?;
        if self.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            });
        }
        for item in &self.items {
            validate_quantity(item.quantity)?;
            validate_non_negative_money("unit_price", item.unit_price)?;
        }
        Ok(())
    }
}

impl Entity for AdditionalExpense {
    const KIND: &'static str = "AdditionalExpense";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_positive_money("amount", self.amount)?;
        validate_optional_text("description", self.description.as_deref(), 2_000)
    }
}

impl Entity for SalesPlan {
    const KIND: &'static str = "SalesPlan";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        for entry in &self.entries {
            validate_name("product_id", &entry.product_id)?;
            if entry.units <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "units".to_string(),
                });
            }
            validate_non_negative_money("base_price", entry.base_price)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Entity + PartialEq>(entity: &T) {
        let json = serde_json::to_string(entity).unwrap();
        let back: T = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, entity);
    }

    fn sample_ticket() -> Ticket {
        Ticket {
            id: new_id(),
            client: "Mesa 4".to_string(),
            timestamp: "2024-01-05 10:15:00".to_string(),
            items: vec![SaleLineItem {
                product_id: "p-1".to_string(),
                name: "Bread".to_string(),
                quantity: 3,
                unit_price: Money::from_cents(250),
                line_total: Money::from_cents(750),
            }],
            total: Money::from_cents(750),
            stock_movements: vec![StockMovement {
                raw_material_id: "mp-1".to_string(),
                quantity: 6.0,
            }],
            forced: false,
        }
    }

    #[test]
    fn test_round_trip_every_entity() {
        round_trip(&RawMaterial {
            id: new_id(),
            name: "Flour".to_string(),
            unit: "kg".to_string(),
            unit_cost: 4.0,
            stock: 10.0,
            min_stock: 2.0,
        });
        round_trip(&Product {
            id: new_id(),
            name: "Bread".to_string(),
            price: Money::from_cents(250),
            available: true,
        });
        round_trip(&Recipe {
            id: new_id(),
            product_id: "p-1".to_string(),
            ingredients: vec![Ingredient {
                raw_material_id: "mp-1".to_string(),
                quantity: 2.0,
            }],
            batch_yield: 4.0,
            procedure: Some("Knead, proof, bake".to_string()),
        });
        round_trip(&Supplier {
            id: new_id(),
            name: "Molinos del Sur".to_string(),
            contact: None,
        });
        round_trip(&Purchase {
            id: new_id(),
            supplier_id: "s-1".to_string(),
            supplier_name: "Molinos del Sur".to_string(),
            timestamp: "2024-01-02 08:00:00".to_string(),
            items: vec![PurchaseLineItem {
                raw_material_id: Some("mp-1".to_string()),
                name: "Flour".to_string(),
                quantity: 2.0,
                unit_cost: 4.0,
                line_total: Money::from_cents(800),
                note: Some("25kg bag split".to_string()),
            }],
            total: Money::from_cents(800),
        });
        round_trip(&sample_ticket());
        round_trip(&AdditionalExpense {
            id: new_id(),
            name: "Rent".to_string(),
            amount: Money::from_cents(90000),
            timestamp: "2024-01-01 00:00:00".to_string(),
            description: None,
        });
        round_trip(&SalesPlan {
            id: new_id(),
            name: "Summer".to_string(),
            entries: vec![SalesPlanEntry {
                product_id: "p-1".to_string(),
                units: 300,
                base_price: Money::from_cents(250),
            }],
            updated_at: "2024-06-01 12:00:00".to_string(),
        });
    }

    #[test]
    fn test_round_trip_keeps_inexact_stock() {
        // 720.25 + 275.16 has no short decimal form
        let stock = 720.25 + 275.16;
        let material = RawMaterial {
            id: new_id(),
            name: "Milk".to_string(),
            unit: "l".to_string(),
            unit_cost: 1.1 * 3.0,
            stock,
            min_stock: 0.1 + 0.2,
        };

        let back: RawMaterial =
            serde_json::from_str(&serde_json::to_string(&material).unwrap()).unwrap();
        assert_eq!(back.stock.to_bits(), stock.to_bits());
        assert_eq!(back, material);
    }

    #[test]
    fn test_recipe_yield_key_and_default() {
        let json = r#"{"id":"r","product_id":"p","ingredients":[{"raw_material_id":"m","quantity":1}]}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.batch_yield, 1.0);
        assert_eq!(recipe.procedure, None);

        let out = serde_json::to_value(&recipe).unwrap();
        assert_eq!(out["yield"], 1.0);
    }

    #[test]
    fn test_effective_yield_floors_to_one() {
        let mut recipe: Recipe = serde_json::from_str(
            r#"{"id":"r","product_id":"p","ingredients":[],"yield":0}"#,
        )
        .unwrap();
        assert_eq!(recipe.effective_yield(), 1.0);
        recipe.batch_yield = -3.0;
        assert_eq!(recipe.effective_yield(), 1.0);
        recipe.batch_yield = 12.0;
        assert_eq!(recipe.effective_yield(), 12.0);
    }

    #[test]
    fn test_older_ticket_without_movements_loads() {
        let json = r#"{"id":"t","client":"Ana","timestamp":"2024-01-05 10:00:00",
            "items":[{"product_id":"p","name":"Bread","quantity":1,"unit_price":2.5,"line_total":2.5}],
            "total":2.5}"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert!(ticket.stock_movements.is_empty());
        assert!(!ticket.forced);
        assert_eq!(ticket.total.cents(), 250);
    }

    #[test]
    fn test_purchase_movements_skip_untracked_lines() {
        let purchase = Purchase {
            id: new_id(),
            supplier_id: "s".to_string(),
            supplier_name: "S".to_string(),
            timestamp: "2024-01-02 08:00:00".to_string(),
            items: vec![
                PurchaseLineItem {
                    raw_material_id: Some("mp-1".to_string()),
                    name: "Flour".to_string(),
                    quantity: 2.0,
                    unit_cost: 4.0,
                    line_total: Money::from_cents(800),
                    note: None,
                },
                PurchaseLineItem {
                    raw_material_id: None,
                    name: "Bleach".to_string(),
                    quantity: 1.0,
                    unit_cost: 3.0,
                    line_total: Money::from_cents(300),
                    note: None,
                },
            ],
            total: Money::from_cents(1100),
        };
        let movements = purchase.stock_movements();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].quantity, 2.0);
    }

    #[test]
    fn test_entity_validation() {
        let mut material = RawMaterial {
            id: new_id(),
            name: "Milk".to_string(),
            unit: "l".to_string(),
            unit_cost: 1.2,
            stock: 0.0,
            min_stock: 0.0,
        };
        assert!(material.validate().is_ok());
        material.unit_cost = -1.0;
        assert!(material.validate().is_err());

        let mut ticket = sample_ticket();
        assert!(ticket.validate().is_ok());
        ticket.client = "  ".to_string();
        assert!(ticket.validate().is_err());
    }

    #[test]
    fn test_below_minimum() {
        let material = RawMaterial {
            id: new_id(),
            name: "Sugar".to_string(),
            unit: "kg".to_string(),
            unit_cost: 1.0,
            stock: 1.0,
            min_stock: 5.0,
        };
        assert!(material.is_below_minimum());
        assert_eq!(material.stock_value(), 1.0);
    }
}
