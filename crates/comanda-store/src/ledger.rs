//! # Stock Ledger
//!
//! The only component that changes raw-material stock.
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  adjust(flour, -6)                                                      │
//! │       │                                                                 │
//! │       ├── load materias_primas                                          │
//! │       ├── 4 + (-6) < 0 ?  ──► InsufficientStock, nothing written        │
//! │       └── write once                                                    │
//! │                                                                         │
//! │  consume([3 × Bread, 2 × Focaccia], force)                              │
//! │       │                                                                 │
//! │       ├── plan: aggregate per material across every line                │
//! │       ├── shortfall && !force ──► InsufficientStock, nothing written    │
//! │       ├── shortfall && force  ──► warn per material, apply all          │
//! │       └── ONE write of the whole collection                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};

use comanda_core::line_item::SaleLineInput;
use comanda_core::stock::{self, checked_stock, ConsumptionPlan, StockDirection};
use comanda_core::validation::validate_finite_non_negative;
use comanda_core::{CoreError, RawMaterial, Shortfall, StockMovement, ValidationError};

use crate::catalog::Catalog;
use crate::error::{StoreError, StoreResult};

/// Stock operations over the raw-material collection.
#[derive(Debug, Clone)]
pub struct StockLedger {
    catalog: Catalog,
}

impl StockLedger {
    pub fn new(catalog: Catalog) -> Self {
        StockLedger { catalog }
    }

    /// Applies a signed delta to one raw material.
    ///
    /// ## Returns
    /// * `Ok(RawMaterial)` - Updated material
    /// * `Err(NotFound)` - No such raw material
    /// * `Err(InsufficientStock)` - Stock would go below zero (unchanged)
    pub fn adjust(&self, raw_material_id: &str, delta: f64) -> StoreResult<RawMaterial> {
        if !delta.is_finite() {
            return Err(ValidationError::InvalidFormat {
                field: "delta".to_string(),
                reason: "must be a finite number".to_string(),
            }
            .into());
        }

        let mut materials = self.catalog.raw_materials().list();
        let material = materials
            .iter_mut()
            .find(|m| m.id == raw_material_id)
            .ok_or_else(|| StoreError::not_found("RawMaterial", raw_material_id))?;

        let next = checked_stock(material.stock, delta).ok_or_else(|| {
            // A top-up that leaves a forced deficit still negative reports
            // the deficit left to cover.
            let (required, available) = if delta < 0.0 {
                (-delta, material.stock)
            } else {
                (-(material.stock + delta), 0.0)
            };
            CoreError::insufficient(Shortfall {
                raw_material_id: material.id.clone(),
                name: material.name.clone(),
                required,
                available,
            })
        })?;

        debug!(id = %material.id, from = material.stock, to = next, "Adjusting stock");
        material.stock = next;
        let updated = material.clone();

        self.catalog.raw_materials().save_all(&materials)?;
        info!(id = %updated.id, name = %updated.name, stock = updated.stock, "Stock adjusted");
        Ok(updated)
    }

    /// Sets stock to an absolute level, as an adjustment by
    /// `target - current`.
    ///
    /// Fractional targets are fine (2.5 kg).
    pub fn set_absolute(&self, raw_material_id: &str, target: f64) -> StoreResult<RawMaterial> {
        validate_finite_non_negative("stock", target)?;

        let current = self.catalog.raw_materials().require(raw_material_id)?;
        let mut updated = self.adjust(raw_material_id, target - current.stock)?;

        // Land exactly on the requested figure, not on current + (target - current)
        if updated.stock != target {
            updated.stock = target;
            self.catalog.raw_materials().replace(updated.clone())?;
        }
        Ok(updated)
    }

    /// Computes what the lines would take from stock, without writing.
    ///
    /// Lets the caller show shortfalls and ask whether to force.
    pub fn check_consumption(&self, lines: &[SaleLineInput]) -> ConsumptionPlan {
        let quantities: Vec<(&str, i64)> = lines
            .iter()
            .map(|line| (line.product_id.as_str(), line.quantity))
            .collect();

        let recipes = self.catalog.recipes().list();
        let materials = self.catalog.raw_materials().list();
        let plan = stock::plan_consumption(&quantities, &recipes, &materials);

        for id in &plan.missing {
            warn!(raw_material_id = %id, "Recipe ingredient no longer exists, skipped");
        }
        plan
    }

    /// Deducts the raw materials consumed by the lines.
    ///
    /// ## Returns
    /// * `Ok(plan)` - Deductions written; `plan.shortfalls` is non-empty only
    ///   when forced
    /// * `Err(InsufficientStock)` - Unforced shortfall, nothing written
    pub fn consume(&self, lines: &[SaleLineInput], force: bool) -> StoreResult<ConsumptionPlan> {
        let plan = self.check_consumption(lines);

        if !plan.is_covered() {
            if !force {
                return Err(CoreError::InsufficientStock {
                    shortfalls: plan.shortfalls,
                }
                .into());
            }
            for shortfall in &plan.shortfalls {
                warn!(
                    raw_material_id = %shortfall.raw_material_id,
                    name = %shortfall.name,
                    required = shortfall.required,
                    available = shortfall.available,
                    "Forced deduction drives stock negative"
                );
            }
        }

        if !plan.movements.is_empty() {
            let mut materials = self.catalog.raw_materials().list();
            stock::apply_movements(&mut materials, &plan.movements, StockDirection::Decrease);
            self.catalog.raw_materials().save_all(&materials)?;
            debug!(materials = plan.movements.len(), "Consumption written");
        }

        Ok(plan)
    }

    /// Applies recorded movements in one write.
    ///
    /// Decreases are checked against stock unless forced. Movements whose
    /// raw material no longer exists are skipped and returned.
    pub fn apply_movements(
        &self,
        movements: &[StockMovement],
        direction: StockDirection,
        force: bool,
    ) -> StoreResult<Vec<String>> {
        if movements.is_empty() {
            return Ok(Vec::new());
        }

        let movements = stock::aggregate(movements.iter().cloned());
        let mut materials = self.catalog.raw_materials().list();

        if direction == StockDirection::Decrease {
            let shortfalls = stock::shortfalls(&movements, &materials);
            if !shortfalls.is_empty() {
                if !force {
                    return Err(CoreError::InsufficientStock { shortfalls }.into());
                }
                for shortfall in &shortfalls {
                    warn!(name = %shortfall.name, missing = shortfall.missing(), "Forced removal drives stock negative");
                }
            }
        }

        let skipped = stock::apply_movements(&mut materials, &movements, direction);
        for id in &skipped {
            warn!(raw_material_id = %id, "Raw material no longer exists, movement skipped");
        }

        self.catalog.raw_materials().save_all(&materials)?;
        Ok(skipped)
    }

    /// Current raw-material collection, for restoring after a failed write.
    pub(crate) fn snapshot(&self) -> Vec<RawMaterial> {
        self.catalog.raw_materials().list()
    }

    /// Rewrites the raw-material collection from a snapshot. Logs and
    /// swallows failure: the caller is already reporting an error.
    pub(crate) fn restore(&self, snapshot: &[RawMaterial]) {
        match self.catalog.raw_materials().save_all(snapshot) {
            Ok(()) => warn!("Stock restored after failed document write"),
            Err(e) => warn!(error = %e, "Could not restore stock after failed document write"),
        }
    }
}
