//! # Recipe Costing
//!
//! Pure cost and pricing math. The store resolves recipes and raw materials
//! and hands them in; nothing here reads a file.
//!
//! ## Cost Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Recipe: Bread, yield 1                                                 │
//! │    Flour 2kg × 4.00/kg ─┐                                               │
//! │                         ├──► batch cost 8.00 ──► ÷ yield ──► unit 8.00  │
//! │    (missing material) ──┘    (skipped, listed in `missing`)             │
//! │                                                                         │
//! │  Product price 10.00 ──► profit 2.00, margin 20%                        │
//! │                                                                         │
//! │  Pricing: (variable + fixed/units) × (1 + margin) × (1 + VAT)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::round2;
use crate::types::{Product, RawMaterial, Recipe};
use crate::validation::{validate_finite_non_negative, validate_positive, ValidationResult};

// =============================================================================
// Material Lookup
// =============================================================================

/// Resolves raw materials by id for costing and consumption planning.
pub trait MaterialLookup {
    fn raw_material(&self, id: &str) -> Option<&RawMaterial>;
}

impl MaterialLookup for [RawMaterial] {
    fn raw_material(&self, id: &str) -> Option<&RawMaterial> {
        self.iter().find(|m| m.id == id)
    }
}

impl MaterialLookup for Vec<RawMaterial> {
    fn raw_material(&self, id: &str) -> Option<&RawMaterial> {
        self.as_slice().raw_material(id)
    }
}

impl MaterialLookup for HashMap<String, RawMaterial> {
    fn raw_material(&self, id: &str) -> Option<&RawMaterial> {
        self.get(id)
    }
}

// =============================================================================
// Recipe Cost
// =============================================================================

/// Unit cost from a batch cost and its yield. A yield of zero or less
/// counts as one unit.
///
/// ## Example
/// ```rust
/// use comanda_core::costing::unit_cost_from_batch;
///
/// assert_eq!(unit_cost_from_batch(12.0, 4.0), 3.0);
/// assert_eq!(unit_cost_from_batch(12.0, 0.0), 12.0);
/// ```
pub fn unit_cost_from_batch(batch_cost: f64, yield_units: f64) -> f64 {
    if yield_units > 0.0 {
        batch_cost / yield_units
    } else {
        batch_cost
    }
}

/// Cost of one ingredient in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostLine {
    pub raw_material_id: String,
    pub name: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub cost: f64,
}

/// Itemized cost of one recipe batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostBreakdown {
    pub lines: Vec<CostLine>,
    pub batch_cost: f64,
    pub batch_yield: f64,
    pub unit_cost: f64,
    /// Raw material ids referenced by the recipe that no longer exist.
    /// Their cost is left out, so the unit cost undercounts.
    pub missing: Vec<String>,
}

/// Costs a recipe against current raw-material unit costs.
pub fn recipe_cost<L>(recipe: &Recipe, materials: &L) -> CostBreakdown
where
    L: MaterialLookup + ?Sized,
{
    let mut lines = Vec::with_capacity(recipe.ingredients.len());
    let mut missing = Vec::new();

    for ingredient in &recipe.ingredients {
        match materials.raw_material(&ingredient.raw_material_id) {
            Some(material) => lines.push(CostLine {
                raw_material_id: material.id.clone(),
                name: material.name.clone(),
                unit: material.unit.clone(),
                quantity: ingredient.quantity,
                unit_cost: material.unit_cost,
                cost: ingredient.quantity * material.unit_cost,
            }),
            None => missing.push(ingredient.raw_material_id.clone()),
        }
    }

    let batch_cost: f64 = lines.iter().map(|line| line.cost).sum();

    CostBreakdown {
        lines,
        batch_cost,
        batch_yield: recipe.batch_yield,
        unit_cost: unit_cost_from_batch(batch_cost, recipe.batch_yield),
        missing,
    }
}

// =============================================================================
// Profitability
// =============================================================================

/// Per-unit economics of a product at its current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Profitability {
    pub product_id: String,
    pub product_name: String,
    /// Sale price per unit.
    pub revenue: f64,
    /// Production cost per unit.
    pub cost: f64,
    pub profit: f64,
    /// Profit as a percentage of price; 0 when the price is 0.
    pub margin_pct: f64,
}

impl Profitability {
    /// ## Example
    /// ```rust
    /// use comanda_core::costing::Profitability;
    /// use comanda_core::{Money, Product};
    ///
    /// let bread = Product {
    ///     id: "p-1".into(),
    ///     name: "Bread".into(),
    ///     price: Money::from_cents(1000),
    ///     available: true,
    /// };
    /// let p = Profitability::compute(&bread, 8.0);
    /// assert_eq!(p.profit, 2.0);
    /// assert_eq!(p.margin_pct, 20.0);
    /// ```
    pub fn compute(product: &Product, unit_cost: f64) -> Self {
        let revenue = product.price.to_decimal();
        let profit = revenue - unit_cost;
        let margin_pct = if revenue > 0.0 {
            profit / revenue * 100.0
        } else {
            0.0
        };

        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            revenue,
            cost: unit_cost,
            profit,
            margin_pct,
        }
    }
}

/// Sorts by margin, best first.
pub fn sort_by_margin(rows: &mut [Profitability]) {
    rows.sort_by(|a, b| b.margin_pct.total_cmp(&a.margin_pct));
}

// =============================================================================
// Pricing
// =============================================================================

/// Spreads a period's fixed costs over the units planned for that period.
///
/// ## Example
/// ```rust
/// use comanda_core::costing::unit_fixed_cost;
///
/// assert_eq!(unit_fixed_cost(1000.0, 500.0).unwrap(), 2.0);
/// assert!(unit_fixed_cost(1000.0, 0.0).is_err());
/// ```
pub fn unit_fixed_cost(fixed_costs_period: f64, planned_units: f64) -> ValidationResult<f64> {
    validate_finite_non_negative("fixed_costs", fixed_costs_period)?;
    validate_positive("planned_units", planned_units)?;
    Ok(fixed_costs_period / planned_units)
}

/// Price that covers variable and fixed unit cost, adds the margin, then VAT.
///
/// `margin` and `vat` are fractions (`0.3` for 30%).
///
/// ## Example
/// ```rust
/// use comanda_core::costing::suggested_price;
///
/// let price = suggested_price(3.0, 1.0, 0.5, 0.21).unwrap();
/// assert!((price - 7.26).abs() < 1e-9);
/// ```
pub fn suggested_price(
    variable_cost: f64,
    fixed_cost: f64,
    margin: f64,
    vat: f64,
) -> ValidationResult<f64> {
    validate_finite_non_negative("variable_cost", variable_cost)?;
    validate_finite_non_negative("fixed_cost", fixed_cost)?;
    validate_finite_non_negative("margin", margin)?;
    validate_finite_non_negative("vat", vat)?;
    Ok((variable_cost + fixed_cost) * (1.0 + margin) * (1.0 + vat))
}

/// Units to sell so contribution covers fixed costs.
///
/// `None` when each unit contributes nothing (price at or below variable
/// cost), since no volume breaks even.
pub fn break_even_units(fixed_costs: f64, unit_price: f64, unit_variable_cost: f64) -> Option<f64> {
    let contribution = unit_price - unit_variable_cost;
    if contribution <= 0.0 || !contribution.is_finite() {
        return None;
    }
    Some(fixed_costs.max(0.0) / contribution)
}

/// Pricing worksheet for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceQuote {
    pub product_id: String,
    pub product_name: String,
    pub current_price: f64,
    pub variable_cost: f64,
    pub fixed_cost: f64,
    pub margin: f64,
    pub vat: f64,
    pub suggested_price: f64,
    /// Units per period needed at the current price.
    pub break_even_units: Option<f64>,
}

/// Builds the pricing worksheet for a product whose unit variable cost is
/// already known.
pub fn price_quote(
    product: &Product,
    variable_cost: f64,
    fixed_costs_period: f64,
    planned_units: f64,
    margin: f64,
    vat: f64,
) -> ValidationResult<PriceQuote> {
    let fixed_cost = unit_fixed_cost(fixed_costs_period, planned_units)?;
    let suggested = suggested_price(variable_cost, fixed_cost, margin, vat)?;
    let current_price = product.price.to_decimal();

    Ok(PriceQuote {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        current_price,
        variable_cost: round2(variable_cost),
        fixed_cost: round2(fixed_cost),
        margin,
        vat,
        suggested_price: round2(suggested),
        break_even_units: break_even_units(fixed_costs_period, current_price, variable_cost),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
