//! # Entity Inputs
//!
//! `New*` structs carry what a form submits to create an entity; `*Patch`
//! structs carry optional field edits. Both validate before producing the
//! entity, so a stored entity is never built from unchecked input.
//!
//! ```text
//!   NewProduct ──into_entity()──► Product (id generated)
//!   ProductPatch ──apply(&current)──► Product (copy, re-validated)
//! ```
//!
//! Cross-collection rules (the product of a recipe exists, a material is not
//! in use) are checked by the catalog, which can see the other collections.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::timestamp::{format_timestamp, parse_timestamp};
use crate::types::{
    new_id, AdditionalExpense, Entity, Ingredient, Product, RawMaterial, Recipe, SalesPlan,
    SalesPlanEntry, Supplier,
};
use crate::validation::{
    clean_name, clean_optional, validate_finite_non_negative, ValidationResult,
};
use crate::ValidationError;

fn default_true() -> bool {
    true
}

fn default_yield() -> f64 {
    1.0
}

/// Resolves an optional caller-supplied timestamp, normalizing it to the
/// storage format. `None` means "now".
pub fn resolve_timestamp(text: Option<&str>, now: NaiveDateTime) -> ValidationResult<String> {
    match text {
        None => Ok(format_timestamp(now)),
        Some(raw) => parse_timestamp(raw)
            .map(format_timestamp)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "timestamp".to_string(),
                reason: format!("'{}' is not a date (expected YYYY-MM-DD HH:MM:SS)", raw),
            }),
    }
}

// =============================================================================
// Raw Material
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewRawMaterial {
    pub name: String,
    pub unit: String,
    pub unit_cost: f64,
    /// Opening stock.
    #[serde(default)]
    pub stock: f64,
    #[serde(default)]
    pub min_stock: f64,
}

impl NewRawMaterial {
    pub fn into_entity(self) -> ValidationResult<RawMaterial> {
        validate_finite_non_negative("stock", self.stock)?;
        let material = RawMaterial {
            id: new_id(),
            name: clean_name("name", &self.name)?,
            unit: clean_name("unit", &self.unit)?,
            unit_cost: self.unit_cost,
            stock: self.stock,
            min_stock: self.min_stock,
        };
        material.validate()?;
        Ok(material)
    }
}

/// Editable raw-material fields. Stock is absent on purpose: stock changes
/// go through the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RawMaterialPatch {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub unit_cost: Option<f64>,
    pub min_stock: Option<f64>,
}

impl RawMaterialPatch {
    pub fn apply(self, current: &RawMaterial) -> ValidationResult<RawMaterial> {
        let mut next = current.clone();
        if let Some(name) = self.name {
            next.name = clean_name("name", &name)?;
        }
        if let Some(unit) = self.unit {
            next.unit = clean_name("unit", &unit)?;
        }
        if let Some(unit_cost) = self.unit_cost {
            next.unit_cost = unit_cost;
        }
        if let Some(min_stock) = self.min_stock {
            next.min_stock = min_stock;
        }
        next.validate()?;
        Ok(next)
    }
}

// =============================================================================
// Product
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    #[ts(type = "number")]
    pub price: Money,
    #[serde(default = "default_true")]
    pub available: bool,
}

impl NewProduct {
    pub fn into_entity(self) -> ValidationResult<Product> {
        let product = Product {
            id: new_id(),
            name: clean_name("name", &self.name)?,
            price: self.price,
            available: self.available,
        };
        product.validate()?;
        Ok(product)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    pub name: Option<String>,
    #[ts(type = "number | null")]
    pub price: Option<Money>,
    pub available: Option<bool>,
}

impl ProductPatch {
    pub fn apply(self, current: &Product) -> ValidationResult<Product> {
        let mut next = current.clone();
        if let Some(name) = self.name {
            next.name = clean_name("name", &name)?;
        }
        if let Some(price) = self.price {
            next.price = price;
        }
        if let Some(available) = self.available {
            next.available = available;
        }
        next.validate()?;
        Ok(next)
    }
}

// =============================================================================
// Recipe
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewRecipe {
    pub product_id: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(rename = "yield", default = "default_yield")]
    pub batch_yield: f64,
    #[serde(default)]
    pub procedure: Option<String>,
}

impl NewRecipe {
    pub fn into_entity(self) -> ValidationResult<Recipe> {
        let recipe = Recipe {
            id: new_id(),
            product_id: self.product_id.trim().to_string(),
            ingredients: self.ingredients,
            batch_yield: self.batch_yield,
            procedure: clean_optional(self.procedure),
        };
        recipe.validate()?;
        Ok(recipe)
    }
}

/// Recipe edits. The product a recipe belongs to cannot change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecipePatch {
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(rename = "yield")]
    pub batch_yield: Option<f64>,
    pub procedure: Option<String>,
}

impl RecipePatch {
    pub fn apply(self, current: &Recipe) -> ValidationResult<Recipe> {
        let mut next = current.clone();
        if let Some(ingredients) = self.ingredients {
            next.ingredients = ingredients;
        }
        if let Some(batch_yield) = self.batch_yield {
            next.batch_yield = batch_yield;
        }
        if self.procedure.is_some() {
            next.procedure = clean_optional(self.procedure);
        }
        next.validate()?;
        Ok(next)
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
}

impl NewSupplier {
    pub fn into_entity(self) -> ValidationResult<Supplier> {
        let supplier = Supplier {
            id: new_id(),
            name: clean_name("name", &self.name)?,
            contact: clean_optional(self.contact),
        };
        supplier.validate()?;
        Ok(supplier)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact: Option<String>,
}

impl SupplierPatch {
    pub fn apply(self, current: &Supplier) -> ValidationResult<Supplier> {
        let mut next = current.clone();
        if let Some(name) = self.name {
            next.name = clean_name("name", &name)?;
        }
        if self.contact.is_some() {
            next.contact = clean_optional(self.contact);
        }
        next.validate()?;
        Ok(next)
    }
}

// =============================================================================
// Additional Expense
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub name: String,
    #[ts(type = "number")]
    pub amount: Money,
    /// Defaults to the time of recording.
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewExpense {
    pub fn into_entity(self, now: NaiveDateTime) -> ValidationResult<AdditionalExpense> {
        let expense = AdditionalExpense {
            id: new_id(),
            name: clean_name("name", &self.name)?,
            amount: self.amount,
            timestamp: resolve_timestamp(self.timestamp.as_deref(), now)?,
            description: clean_optional(self.description),
        };
        expense.validate()?;
        Ok(expense)
    }
}

// =============================================================================
// Sales Plan
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSalesPlan {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<SalesPlanEntry>,
}

impl NewSalesPlan {
    pub fn into_entity(self, now: NaiveDateTime) -> ValidationResult<SalesPlan> {
        let plan = SalesPlan {
            id: new_id(),
            name: clean_name("name", &self.name)?,
            entries: self.entries,
            updated_at: format_timestamp(now),
        };
        plan.validate()?;
        Ok(plan)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesPlanPatch {
    pub name: Option<String>,
    pub entries: Option<Vec<SalesPlanEntry>>,
}

impl SalesPlanPatch {
    /// Applies the edits and stamps `updated_at` with `now`.
    pub fn apply(self, current: &SalesPlan, now: NaiveDateTime) -> ValidationResult<SalesPlan> {
        let mut next = current.clone();
        if let Some(name) = self.name {
            next.name = clean_name("name", &name)?;
        }
        if let Some(entries) = self.entries {
            next.entries = entries;
        }
        next.updated_at = format_timestamp(now);
        next.validate()?;
        Ok(next)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
