//! # Report Math
//!
//! Monthly dashboard, sales-plan projection and inventory summaries,
//! computed from already-loaded collections. Unit production costs come in
//! through a closure so callers can reuse one cost sheet across reports.
//!
//! ## Monthly Dashboard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  month "2024-01" ──► window 2024-01-01 ..= 2024-01-31                   │
//! │                                                                         │
//! │  tickets in window ──► sales, units per product, operating days         │
//! │  units × unit cost ──► production cost                                  │
//! │  expenses in window ──► additional expenses                             │
//! │                                                                         │
//! │  net        = sales − production cost − expenses                        │
//! │  break-even = production cost + expenses                                │
//! │  ranking    = revenue − cost per product, top 3 / bottom 3              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{round2, Money};
use crate::types::{AdditionalExpense, Purchase, RawMaterial, SalesPlan, Ticket};
use crate::ValidationError;

/// Products shown at each end of the dashboard ranking.
pub const RANKING_SIZE: usize = 3;

// =============================================================================
// Month Window
// =============================================================================

/// The first-to-last-day range of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl MonthWindow {
    /// Parses `YYYY-MM`.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::report::MonthWindow;
    ///
    /// let feb = MonthWindow::parse("2024-02").unwrap();
    /// assert_eq!(feb.last.to_string(), "2024-02-29");
    /// assert!(MonthWindow::parse("2024-13").is_err());
    /// ```
    pub fn parse(month: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: format!("'{}' is not a month (expected YYYY-MM)", month),
        };

        let first = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
            .map_err(|_| invalid())?;
        let next_month = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        }
        .ok_or_else(invalid)?;
        let last = next_month.pred_opt().ok_or_else(invalid)?;

        Ok(Self { first, last })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }

    /// `YYYY-MM` label.
    pub fn label(&self) -> String {
        self.first.format("%Y-%m").to_string()
    }
}

// =============================================================================
// Monthly Dashboard
// =============================================================================

/// Sales and margin of one product over the dashboard window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductContribution {
    pub product_id: String,
    pub name: String,
    pub units: i64,
    pub revenue: f64,
    pub cost: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyDashboard {
    pub month: String,
    pub total_sales: f64,
    pub production_cost: f64,
    pub additional_expenses: f64,
    pub total_purchases: f64,
    pub net_result: f64,
    /// Sales needed to cover production cost and expenses.
    pub break_even_point: f64,
    pub ticket_count: usize,
    pub average_ticket: f64,
    /// Distinct days with at least one sale.
    pub operating_days: usize,
    pub average_daily_sales: f64,
    /// Highest contribution first.
    pub top_products: Vec<ProductContribution>,
    /// Lowest contribution first.
    pub bottom_products: Vec<ProductContribution>,
    /// Records left out because their timestamp could not be read.
    pub skipped_records: usize,
}

/// Computes the monthly dashboard.
///
/// `unit_cost_of` returns the current unit production cost of a product
/// (0 for products without a recipe).
pub fn monthly_dashboard<C>(
    window: &MonthWindow,
    tickets: &[Ticket],
    expenses: &[AdditionalExpense],
    purchases: &[Purchase],
    unit_cost_of: C,
) -> MonthlyDashboard
where
    C: Fn(&str) -> f64,
{
    let mut skipped = 0;
    let mut in_window = |at: Option<NaiveDate>| match at {
        Some(date) => window.contains(date),
        None => {
            skipped += 1;
            false
        }
    };

    let mut sales = Money::zero();
    let mut ticket_count = 0;
    let mut days = BTreeSet::new();
    let mut per_product: HashMap<String, (String, i64, Money)> = HashMap::new();

    for ticket in tickets {
        let date = ticket.recorded_at().map(|at| at.date());
        if !in_window(date) {
            continue;
        }
        ticket_count += 1;
        sales += ticket.total;
        if let Some(date) = date {
            days.insert(date);
        }
        for item in &ticket.items {
            let entry = per_product
                .entry(item.product_id.clone())
                .or_insert_with(|| (item.name.clone(), 0, Money::zero()));
            entry.1 += item.quantity;
            entry.2 += item.line_total;
        }
    }

    let expenses_total: Money = expenses
        .iter()
        .filter(|e| in_window(e.recorded_at().map(|at| at.date())))
        .map(|e| e.amount)
        .sum();

    let purchases_total: Money = purchases
        .iter()
        .filter(|p| in_window(p.recorded_at().map(|at| at.date())))
        .map(|p| p.total)
        .sum();

    let mut ranking: Vec<ProductContribution> = per_product
        .into_iter()
        .map(|(product_id, (name, units, revenue))| {
            let cost = units as f64 * unit_cost_of(&product_id);
            let revenue = revenue.to_decimal();
            ProductContribution {
                product_id,
                name,
                units,
                revenue,
                cost: round2(cost),
                contribution: round2(revenue - cost),
            }
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.contribution
            .total_cmp(&a.contribution)
            .then_with(|| a.name.cmp(&b.name))
    });

    let production_cost: f64 = ranking.iter().map(|p| p.cost).sum();
    let total_sales = sales.to_decimal();
    let additional_expenses = expenses_total.to_decimal();
    let operating_days = days.len();

    let top_products = ranking.iter().take(RANKING_SIZE).cloned().collect();
    let bottom_products = ranking.iter().rev().take(RANKING_SIZE).cloned().collect();

    MonthlyDashboard {
        month: window.label(),
        total_sales,
        production_cost: round2(production_cost),
        additional_expenses,
        total_purchases: purchases_total.to_decimal(),
        net_result: round2(total_sales - production_cost - additional_expenses),
        break_even_point: round2(production_cost + additional_expenses),
        ticket_count,
        average_ticket: if ticket_count > 0 {
            round2(total_sales / ticket_count as f64)
        } else {
            0.0
        },
        operating_days,
        average_daily_sales: if operating_days > 0 {
            round2(total_sales / operating_days as f64)
        } else {
            0.0
        },
        top_products,
        bottom_products,
        skipped_records: skipped,
    }
}

// =============================================================================
// Sales Plan Projection
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlanProjectionLine {
    pub product_id: String,
    /// `None` when the product has been deleted since the plan was saved.
    pub product_name: Option<String>,
    pub units: i64,
    pub revenue: f64,
    pub cost: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlanProjection {
    pub plan_id: String,
    pub plan_name: String,
    pub lines: Vec<PlanProjectionLine>,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_contribution: f64,
}

/// Projects revenue and production cost of a sales plan at current costs.
pub fn plan_projection<N, C>(plan: &SalesPlan, name_of: N, unit_cost_of: C) -> PlanProjection
where
    N: Fn(&str) -> Option<String>,
    C: Fn(&str) -> f64,
{
    let lines: Vec<PlanProjectionLine> = plan
        .entries
        .iter()
        .map(|entry| {
            let revenue = entry.base_price.multiply_quantity(entry.units).to_decimal();
            let cost = round2(entry.units as f64 * unit_cost_of(&entry.product_id));
            PlanProjectionLine {
                product_id: entry.product_id.clone(),
                product_name: name_of(&entry.product_id),
                units: entry.units,
                revenue,
                cost,
                contribution: round2(revenue - cost),
            }
        })
        .collect();

    let total_revenue = round2(lines.iter().map(|l| l.revenue).sum());
    let total_cost = round2(lines.iter().map(|l| l.cost).sum());

    PlanProjection {
        plan_id: plan.id.clone(),
        plan_name: plan.name.clone(),
        lines,
        total_revenue,
        total_cost,
        total_contribution: round2(total_revenue - total_cost),
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LowStockAlert {
    pub raw_material_id: String,
    pub name: String,
    pub unit: String,
    pub stock: f64,
    pub min_stock: f64,
    /// Quantity needed to get back to the minimum.
    pub deficit: f64,
}

/// Raw materials below their minimum, most depleted first.
pub fn low_stock(materials: &[RawMaterial]) -> Vec<LowStockAlert> {
    let fill_ratio = |m: &RawMaterial| {
        if m.min_stock > 0.0 {
            m.stock / m.min_stock
        } else {
            f64::NEG_INFINITY
        }
    };

    let mut below: Vec<&RawMaterial> = materials.iter().filter(|m| m.is_below_minimum()).collect();
    below.sort_by(|a, b| fill_ratio(a).total_cmp(&fill_ratio(b)));

    below
        .into_iter()
        .map(|m| LowStockAlert {
            raw_material_id: m.id.clone(),
            name: m.name.clone(),
            unit: m.unit.clone(),
            stock: m.stock,
            min_stock: m.min_stock,
            deficit: m.min_stock - m.stock,
        })
        .collect()
}

/// Value of positive stock at current unit costs.
pub fn inventory_value(materials: &[RawMaterial]) -> f64 {
    round2(materials.iter().map(RawMaterial::stock_value).sum())
}

// =============================================================================
// Unit Tests
// =============================================================================
