//! # comanda-core: Pure Business Logic for Comanda
//!
//! This crate is the **heart** of Comanda, the café back-office. It holds the
//! domain types and every rule that ties purchases, recipes and sales
//! together, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Comanda Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Desktop GUI / CLI (outside this workspace)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            comanda-store (catalog, ledger, recorder)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ comanda-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │ costing  │ │  stock   │ │ period / report  │  │   │
//! │  │   │ Recipe   │ │ unit cost│ │ shortfall│ │ dashboards       │  │   │
//! │  │   │ Ticket   │ │ pricing  │ │ planning │ │ grouping         │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO LOGGING • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (RawMaterial, Product, Recipe, Ticket, ...)
//! - [`input`] - Validated constructors and patches for entities
//! - [`money`] - Money type with integer cents
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//! - [`line_item`] - Normalization of loosely-keyed purchase lines
//! - [`timestamp`] - Stored timestamp format and lenient parsing
//! - [`costing`] - Recipe costing and pricing math
//! - [`stock`] - Stock arithmetic and batch consumption planning
//! - [`period`] - Daily / weekly / monthly grouping
//! - [`report`] - Monthly dashboard and sales plan projection
//!
//! ## Example Usage
//!
//! ```rust
//! use comanda_core::costing::unit_cost_from_batch;
//! use comanda_core::money::Money;
//!
//! // 2kg of flour at 4.00/kg, one loaf per batch
//! assert_eq!(unit_cost_from_batch(8.0, 1.0), 8.0);
//!
//! // Amounts on documents are whole cents
//! let line = Money::from_decimal(2.5).multiply_quantity(3);
//! assert_eq!(line.cents(), 750);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costing;
pub mod error;
pub mod input;
pub mod line_item;
pub mod money;
pub mod period;
pub mod report;
pub mod stock;
pub mod timestamp;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, Shortfall, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed on a single ticket or purchase.
pub const MAX_LINE_ITEMS: usize = 100;

/// Maximum units of one product on a single sale line.
///
/// Catches typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest amount accepted on a price, expense or document line, in cents
/// (100 000 000.00).
///
/// Keeps 100 lines of 999 units far below `i64::MAX` cents.
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000;

/// Tolerance for floating-point stock comparisons.
///
/// `10.0 - 6.0 - 4.0` must read as zero stock, not as a shortfall.
pub const STOCK_EPSILON: f64 = 1e-9;
