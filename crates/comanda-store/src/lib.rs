//! # comanda-store: Storage and Services for Comanda
//!
//! This crate persists the café's catalog and documents as JSON collections
//! and runs the operations that change them: catalog CRUD, stock movements,
//! sales and purchases, and the reports read from them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Comanda Data Flow                                │
//! │                                                                         │
//! │  GUI / CLI  (register a sale)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   comanda-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Catalog     │    │   Services    │    │   Storage    │  │   │
//! │  │   │ (catalog.rs)  │    │               │    │              │  │   │
//! │  │   │               │    │ StockLedger   │    │ JsonFile     │  │   │
//! │  │   │ Repository<T> │───►│ Recorder      │───►│ Memory       │  │   │
//! │  │   │ CRUD + refs   │    │ CostingEngine │    │ backups/     │  │   │
//! │  │   │               │    │ Reporter      │    │ tickets.csv  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  data/  products.json  materias_primas.json  recetas.json       │   │
//! │  │         compras.json   tickets.json  gastos_adicionales.json    │   │
//! │  │         proveedores.json  planes_venta.json                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Data directory, backups and mirror settings
//! - [`storage`] - Storage backends (JSON files, memory) and backups
//! - [`repository`] - Generic repository over one collection
//! - [`catalog`] - Store handle and validated CRUD
//! - [`ledger`] - Stock changes
//! - [`draft`] - Sale and purchase drafts and their validation
//! - [`recorder`] - Committing and deleting sales and purchases
//! - [`costing`] - Production cost and pricing queries
//! - [`reports`] - Period totals, dashboard, inventory
//! - [`mirror`] - tickets.csv spreadsheet
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use comanda_core::line_item::SaleLineInput;
//! use comanda_store::{Catalog, StoreConfig};
//!
//! # fn main() -> Result<(), comanda_store::StoreError> {
//! let catalog = Catalog::open(StoreConfig::new("./data"))?;
//!
//! let bread = &catalog.list_products()[0];
//! let ticket = catalog
//!     .recorder()
//!     .register_sale("Walk-in", vec![SaleLineInput::new(&bread.id, 3)], false, None)?;
//!
//! let dashboard = catalog.reports().monthly_dashboard("2024-01")?;
//! println!("{} sold, net {}", ticket.total, dashboard.net_result);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod costing;
pub mod draft;
pub mod error;
pub mod ledger;
pub mod mirror;
pub mod recorder;
pub mod reports;
pub mod repository;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::Catalog;
pub use config::StoreConfig;
pub use costing::{CostSheet, CostingEngine};
pub use draft::{PurchaseDraft, SaleDraft, ValidatedPurchase, ValidatedSale};
pub use error::{ErrorKind, StoreError, StoreResult};
pub use ledger::StockLedger;
pub use mirror::TicketMirror;
pub use recorder::TransactionRecorder;
pub use reports::Reporter;
pub use repository::{Collection, Repository};
pub use storage::{BackupPolicy, JsonFileStorage, MemoryStorage, Storage};
