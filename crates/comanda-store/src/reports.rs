//! # Reports
//!
//! Read-only aggregates over the stored documents.
//!
//! ## Available Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales_by_period(Monthly)       {"2024-01": 150.0, "2024-02": 30.0}     │
//! │  purchases_by_period(Weekly)    {"2024-W01": 80.0, ...}                 │
//! │  expenses_by_period(Daily)      {"2024-01-05": 12.5, ...}               │
//! │  monthly_dashboard("2024-01")   sales, costs, net, ranking, ...         │
//! │  low_stock()                    materials under their minimum           │
//! │  inventory_value()              Σ stock × unit cost                     │
//! │  plan_projection(plan_id)       revenue and cost of a sales plan        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::warn;

use comanda_core::period::{group_by_period, Period, PeriodTotals};
use comanda_core::report::{self, LowStockAlert, MonthWindow, MonthlyDashboard, PlanProjection};
use comanda_core::timestamp::parse_date;

use crate::catalog::Catalog;
use crate::error::StoreResult;

/// Report queries.
#[derive(Debug, Clone)]
pub struct Reporter {
    catalog: Catalog,
}

fn log_skipped(report: &str, totals: &PeriodTotals) {
    if totals.skipped > 0 {
        warn!(report, skipped = totals.skipped, "Records with unreadable dates left out");
    }
}

impl Reporter {
    pub fn new(catalog: Catalog) -> Self {
        Reporter { catalog }
    }

    /// Ticket totals per period.
    pub fn sales_by_period(&self, period: Period) -> PeriodTotals {
        let totals = group_by_period(
            &self.catalog.tickets().list(),
            period,
            |t| parse_date(&t.timestamp),
            |t| t.total.to_decimal(),
        );
        log_skipped("sales", &totals);
        totals
    }

    /// Purchase totals per period.
    pub fn purchases_by_period(&self, period: Period) -> PeriodTotals {
        let totals = group_by_period(
            &self.catalog.purchases().list(),
            period,
            |p| parse_date(&p.timestamp),
            |p| p.total.to_decimal(),
        );
        log_skipped("purchases", &totals);
        totals
    }

    /// Additional expense totals per period.
    pub fn expenses_by_period(&self, period: Period) -> PeriodTotals {
        let totals = group_by_period(
            &self.catalog.expenses().list(),
            period,
            |e| parse_date(&e.timestamp),
            |e| e.amount.to_decimal(),
        );
        log_skipped("expenses", &totals);
        totals
    }

    /// Dashboard of one calendar month (`"YYYY-MM"`).
    ///
    /// Production cost uses today's unit costs, not the costs at the time of
    /// each sale.
    pub fn monthly_dashboard(&self, month: &str) -> StoreResult<MonthlyDashboard> {
        let window = MonthWindow::parse(month)?;
        let sheet = self.catalog.costing().cost_sheet();

        let dashboard = report::monthly_dashboard(
            &window,
            &self.catalog.tickets().list(),
            &self.catalog.expenses().list(),
            &self.catalog.purchases().list(),
            |product_id| sheet.unit_cost(product_id),
        );

        if dashboard.skipped_records > 0 {
            warn!(
                month = %dashboard.month,
                skipped = dashboard.skipped_records,
                "Records with unreadable dates left out of the dashboard"
            );
        }
        Ok(dashboard)
    }

    pub fn low_stock(&self) -> Vec<LowStockAlert> {
        report::low_stock(&self.catalog.raw_materials().list())
    }

    pub fn inventory_value(&self) -> f64 {
        report::inventory_value(&self.catalog.raw_materials().list())
    }

    /// Revenue, cost and contribution of a sales plan at current costs.
    pub fn plan_projection(&self, plan_id: &str) -> StoreResult<PlanProjection> {
        let plan = self.catalog.get_sales_plan(plan_id)?;
        let products = self.catalog.products().list();
        let sheet = self.catalog.costing().cost_sheet();

        Ok(report::plan_projection(
            &plan,
            |id| products.iter().find(|p| p.id == id).map(|p| p.name.clone()),
            |id| sheet.unit_cost(id),
        ))
    }
}
