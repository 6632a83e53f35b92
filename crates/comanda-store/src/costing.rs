//! # Costing Engine
//!
//! Resolves recipes and raw materials from the store and runs the cost and
//! pricing math of `comanda_core::costing` over them.
//!
//! Costs are always computed from current raw-material unit costs, so a
//! price change on flour shows up in every product that uses it.

use std::collections::HashMap;

use tracing::warn;

use comanda_core::costing::{
    self, recipe_cost, sort_by_margin, CostBreakdown, PriceQuote, Profitability,
};
use comanda_core::{Product, RawMaterial, Recipe};

use crate::catalog::Catalog;
use crate::error::StoreResult;

/// Unit production costs of all products, loaded once.
///
/// Reports that cost many tickets use a sheet instead of re-reading the
/// recipe and raw-material files per line.
#[derive(Debug, Clone, Default)]
pub struct CostSheet {
    costs: HashMap<String, f64>,
}

impl CostSheet {
    /// Unit cost of a product, 0 when it has no recipe.
    pub fn unit_cost(&self, product_id: &str) -> f64 {
        self.costs.get(product_id).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

/// Cost and pricing queries.
#[derive(Debug, Clone)]
pub struct CostingEngine {
    catalog: Catalog,
}

impl CostingEngine {
    pub fn new(catalog: Catalog) -> Self {
        CostingEngine { catalog }
    }

    fn breakdown_of(recipe: &Recipe, materials: &[RawMaterial]) -> CostBreakdown {
        let breakdown = recipe_cost(recipe, materials);
        for id in &breakdown.missing {
            warn!(
                recipe_id = %recipe.id,
                raw_material_id = %id,
                "Ingredient no longer exists, left out of the cost"
            );
        }
        breakdown
    }

    /// Itemized batch cost of a product's recipe, `None` without a recipe.
    pub fn cost_breakdown(&self, product_id: &str) -> Option<CostBreakdown> {
        let recipe = self.catalog.recipe_for_product(product_id)?;
        Some(Self::breakdown_of(&recipe, &self.catalog.raw_materials().list()))
    }

    /// Current production cost of one unit; 0 for products without a recipe.
    pub fn unit_production_cost(&self, product_id: &str) -> f64 {
        self.cost_breakdown(product_id)
            .map(|breakdown| breakdown.unit_cost)
            .unwrap_or(0.0)
    }

    /// Unit costs of every product with a recipe.
    pub fn cost_sheet(&self) -> CostSheet {
        let materials = self.catalog.raw_materials().list();
        let mut costs = HashMap::new();
        // First recipe per product wins, as in `Catalog::recipe_for_product`
        for recipe in self.catalog.recipes().list() {
            costs
                .entry(recipe.product_id.clone())
                .or_insert_with(|| Self::breakdown_of(&recipe, &materials).unit_cost);
        }
        CostSheet { costs }
    }

    pub fn profitability(&self, product_id: &str) -> StoreResult<Profitability> {
        let product = self.catalog.get_product(product_id)?;
        Ok(Profitability::compute(
            &product,
            self.unit_production_cost(product_id),
        ))
    }

    /// Profitability of every product, best margin first.
    pub fn profitability_report(&self) -> Vec<Profitability> {
        let sheet = self.cost_sheet();
        let mut rows: Vec<Profitability> = self
            .catalog
            .products()
            .list()
            .iter()
            .map(|product: &Product| Profitability::compute(product, sheet.unit_cost(&product.id)))
            .collect();
        sort_by_margin(&mut rows);
        rows
    }

    pub fn unit_fixed_cost(&self, fixed_costs_period: f64, planned_units: f64) -> StoreResult<f64> {
        Ok(costing::unit_fixed_cost(fixed_costs_period, planned_units)?)
    }

    pub fn suggested_price(
        &self,
        variable_cost: f64,
        fixed_cost: f64,
        margin: f64,
        vat: f64,
    ) -> StoreResult<f64> {
        Ok(costing::suggested_price(variable_cost, fixed_cost, margin, vat)?)
    }

    /// Units of a product to sell in a period to cover `fixed_costs`, at
    /// its current price and cost.
    pub fn break_even_units(&self, product_id: &str, fixed_costs: f64) -> StoreResult<Option<f64>> {
        let product = self.catalog.get_product(product_id)?;
        Ok(costing::break_even_units(
            fixed_costs,
            product.price.to_decimal(),
            self.unit_production_cost(product_id),
        ))
    }

    /// Pricing worksheet for one product, using its recipe as the variable
    /// cost.
    pub fn price_quote(
        &self,
        product_id: &str,
        fixed_costs_period: f64,
        planned_units: f64,
        margin: f64,
        vat: f64,
    ) -> StoreResult<PriceQuote> {
        let product = self.catalog.get_product(product_id)?;
        let quote = costing::price_quote(
            &product,
            self.unit_production_cost(product_id),
            fixed_costs_period,
            planned_units,
            margin,
            vat,
        )?;
        Ok(quote)
    }
}
