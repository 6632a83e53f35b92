//! # Stock Arithmetic
//!
//! Pure consumption planning: turns sale lines into aggregated raw-material
//! movements, compares them with stock, and applies them to an in-memory
//! copy of the raw-material collection. The ledger in `comanda-store`
//! decides whether to persist.
//!
//! ## Batch Consumption
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Ticket: 3 × Bread, 2 × Focaccia                                        │
//! │                                                                         │
//! │  Bread    (yield 1): flour 2kg ──► 2 × 3 / 1 = 6kg flour                │
//! │  Focaccia (yield 4): flour 1kg ──► 1 × 2 / 4 = 0.5kg flour              │
//! │                      oil 0.2l  ──► 0.2 × 2 / 4 = 0.1l oil               │
//! │                                                                         │
//! │  Aggregated: flour 6.5kg, oil 0.1l   ◄── compared with stock ONCE       │
//! │                                                                         │
//! │  Any shortfall + no force ──► nothing changes                           │
//! │  Any shortfall + force    ──► all applied, stock may go negative        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::costing::MaterialLookup;
use crate::error::Shortfall;
use crate::types::{RawMaterial, Recipe, StockMovement};
use crate::STOCK_EPSILON;

/// Whether a movement adds to or removes from stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    /// Purchase receipt, restoring a deleted ticket.
    Increase,
    /// Sale, removing a deleted purchase.
    Decrease,
}

/// Quantity of one ingredient needed for `units` of the product.
///
/// ## Example
/// ```rust
/// use comanda_core::stock::required_quantity;
///
/// assert_eq!(required_quantity(2.0, 3.0, 1.0), 6.0);
/// assert_eq!(required_quantity(1.0, 2.0, 4.0), 0.5);
/// assert_eq!(required_quantity(1.0, 2.0, 0.0), 2.0);
/// ```
pub fn required_quantity(ingredient_quantity: f64, units: f64, batch_yield: f64) -> f64 {
    if batch_yield > 0.0 {
        ingredient_quantity * units / batch_yield
    } else {
        ingredient_quantity * units
    }
}

/// New stock level after a signed delta, or `None` if it would drop below
/// zero. Floating-point dust below [`STOCK_EPSILON`] reads as zero.
pub fn checked_stock(current: f64, delta: f64) -> Option<f64> {
    let next = current + delta;
    if next < -STOCK_EPSILON {
        None
    } else if next < 0.0 {
        Some(0.0)
    } else {
        Some(next)
    }
}

/// Merges movements of the same raw material, keeping first-seen order.
pub fn aggregate(movements: impl IntoIterator<Item = StockMovement>) -> Vec<StockMovement> {
    let mut merged: Vec<StockMovement> = Vec::new();
    for movement in movements {
        match merged
            .iter_mut()
            .find(|m| m.raw_material_id == movement.raw_material_id)
        {
            Some(existing) => existing.quantity += movement.quantity,
            None => merged.push(movement),
        }
    }
    merged
}

// =============================================================================
// Consumption Planning
// =============================================================================

/// What a set of sale lines would take from stock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionPlan {
    /// Aggregated deductions per raw material, all positive quantities.
    pub movements: Vec<StockMovement>,
    /// Materials that cannot cover their deduction.
    pub shortfalls: Vec<Shortfall>,
    /// Raw material ids referenced by a recipe that no longer exist.
    pub missing: Vec<String>,
}

impl ConsumptionPlan {
    pub fn is_covered(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

/// Plans the consumption of `lines` (product id, units).
///
/// Products without a recipe contribute nothing. Ingredients whose raw
/// material is gone are listed in `missing` and otherwise ignored.
pub fn plan_consumption<L>(lines: &[(&str, i64)], recipes: &[Recipe], materials: &L) -> ConsumptionPlan
where
    L: MaterialLookup + ?Sized,
{
    let mut raw = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    for (product_id, units) in lines {
        let Some(recipe) = recipes.iter().find(|r| r.product_id == *product_id) else {
            continue;
        };
        for ingredient in &recipe.ingredients {
            if materials.raw_material(&ingredient.raw_material_id).is_none() {
                if !missing.contains(&ingredient.raw_material_id) {
                    missing.push(ingredient.raw_material_id.clone());
                }
                continue;
            }
            raw.push(StockMovement {
                raw_material_id: ingredient.raw_material_id.clone(),
                quantity: required_quantity(ingredient.quantity, *units as f64, recipe.batch_yield),
            });
        }
    }

    let movements = aggregate(raw);
    let shortfalls = shortfalls(&movements, materials);

    ConsumptionPlan {
        movements,
        shortfalls,
        missing,
    }
}

/// Materials that cannot cover a deduction of the given movements.
/// Movements for unknown materials are ignored.
pub fn shortfalls<L>(movements: &[StockMovement], materials: &L) -> Vec<Shortfall>
where
    L: MaterialLookup + ?Sized,
{
    movements
        .iter()
        .filter_map(|movement| {
            let material = materials.raw_material(&movement.raw_material_id)?;
            if movement.quantity > material.stock + STOCK_EPSILON {
                Some(Shortfall {
                    raw_material_id: material.id.clone(),
                    name: material.name.clone(),
                    required: movement.quantity,
                    available: material.stock,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Applies movements to an in-memory collection without any check.
///
/// Returns the ids of movements whose raw material is not in the
/// collection. A decrease that lands within [`STOCK_EPSILON`] below zero
/// is stored as zero.
pub fn apply_movements(
    materials: &mut [RawMaterial],
    movements: &[StockMovement],
    direction: StockDirection,
) -> Vec<String> {
    let mut skipped = Vec::new();

    for movement in movements {
        let Some(material) = materials
            .iter_mut()
            .find(|m| m.id == movement.raw_material_id)
        else {
            skipped.push(movement.raw_material_id.clone());
            continue;
        };

        material.stock = match direction {
            StockDirection::Increase => material.stock + movement.quantity,
            StockDirection::Decrease => {
                let next = material.stock - movement.quantity;
                if next < 0.0 && next >= -STOCK_EPSILON {
                    0.0
                } else {
                    next
                }
            }
        };
    }

    skipped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Ingredient;

    fn material(id: &str, stock: f64) -> RawMaterial {
        RawMaterial {
            id: id.to_string(),
            name: id.to_uppercase(),
            unit: "kg".to_string(),
            unit_cost: 1.0,
            stock,
            min_stock: 0.0,
        }
    }

    fn recipe(product_id: &str, ingredients: &[(&str, f64)], batch_yield: f64) -> Recipe {
        Recipe {
            id: format!("r-{}", product_id),
            product_id: product_id.to_string(),
            ingredients: ingredients
                .iter()
                .map(|(id, quantity)| Ingredient {
                    raw_material_id: id.to_string(),
                    quantity: *quantity,
                })
                .collect(),
            batch_yield,
            procedure: None,
        }
    }

    #[test]
    fn test_checked_stock() {
        assert_eq!(checked_stock(10.0, -6.0), Some(4.0));
        assert_eq!(checked_stock(4.0, -6.0), None);
        assert_eq!(checked_stock(0.3, -0.1 - 0.2), Some(0.0));
        assert_eq!(checked_stock(0.0, 2.5), Some(2.5));
    }

    #[test]
    fn test_aggregate_merges_in_order() {
        let merged = aggregate(vec![
            StockMovement { raw_material_id: "b".into(), quantity: 1.0 },
            StockMovement { raw_material_id: "a".into(), quantity: 2.0 },
            StockMovement { raw_material_id: "b".into(), quantity: 0.5 },
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].raw_material_id, "b");
        assert_eq!(merged[0].quantity, 1.5);
    }

    #[test]
    fn test_plan_aggregates_across_lines() {
        let materials = vec![material("flour", 6.0), material("oil", 1.0)];
        let recipes = vec![
            recipe("bread", &[("flour", 2.0)], 1.0),
            recipe("focaccia", &[("flour", 1.0), ("oil", 0.2)], 4.0),
        ];

        let plan = plan_consumption(&[("bread", 3), ("focaccia", 2)], &recipes, &materials);

        assert_eq!(plan.movements.len(), 2);
        assert_eq!(plan.movements[0].quantity, 6.5);
        assert!((plan.movements[1].quantity - 0.1).abs() < 1e-12);
        assert_eq!(plan.shortfalls.len(), 1);
        assert_eq!(plan.shortfalls[0].name, "FLOUR");
        assert_eq!(plan.shortfalls[0].required, 6.5);
        assert_eq!(plan.shortfalls[0].available, 6.0);
    }

    #[test]
    fn test_each_line_alone_fits_but_together_they_do_not() {
        let materials = vec![material("flour", 5.0)];
        let recipes = vec![recipe("bread", &[("flour", 2.0)], 1.0)];

        assert!(plan_consumption(&[("bread", 2)], &recipes, &materials).is_covered());
        assert!(!plan_consumption(&[("bread", 2), ("bread", 1)], &recipes, &materials).is_covered());
    }

    #[test]
    fn test_products_without_recipe_and_missing_materials() {
        let materials = vec![material("flour", 10.0)];
        let recipes = vec![recipe("bread", &[("flour", 2.0), ("gone", 1.0)], 1.0)];

        let plan = plan_consumption(&[("water", 5), ("bread", 1)], &recipes, &materials);
        assert_eq!(plan.movements.len(), 1);
        assert_eq!(plan.missing, vec!["gone".to_string()]);
        assert!(plan.is_covered());
    }

    #[test]
    fn test_exact_stock_is_enough() {
        let materials = vec![material("milk", 0.3)];
        let recipes = vec![recipe("latte", &[("milk", 0.1)], 1.0)];
        let plan = plan_consumption(&[("latte", 3)], &recipes, &materials);
        assert!(plan.is_covered());
    }

    #[test]
    fn test_apply_movements() {
        let mut materials = vec![material("flour", 10.0), material("milk", 0.3)];
        let skipped = apply_movements(
            &mut materials,
            &[
                StockMovement { raw_material_id: "flour".into(), quantity: 12.0 },
                StockMovement { raw_material_id: "milk".into(), quantity: 0.1 + 0.2 },
                StockMovement { raw_material_id: "gone".into(), quantity: 1.0 },
            ],
            StockDirection::Decrease,
        );
        assert_eq!(materials[0].stock, -2.0);
        assert_eq!(materials[1].stock, 0.0);
        assert_eq!(skipped, vec!["gone".to_string()]);

        apply_movements(
            &mut materials,
            &[StockMovement { raw_material_id: "flour".into(), quantity: 2.0 }],
            StockDirection::Increase,
        );
        assert_eq!(materials[0].stock, 0.0);
    }
}
