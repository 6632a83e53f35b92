//! # Transaction Recorder
//!
//! Commits sales (tickets) and purchases, keeping stock in step with the
//! documents.
//!
//! ## Commit Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register_sale(client, lines, force, timestamp)                         │
//! │       │                                                                 │
//! │       ├── 1. SaleDraft::validate(products)      nothing written on Err  │
//! │       ├── 2. snapshot materias_primas                                   │
//! │       ├── 3. ledger.consume(lines, force)       nothing written on Err  │
//! │       ├── 4. append ticket ──► Err: restore snapshot, return Err        │
//! │       └── 5. mirror tickets.csv                 warn on failure         │
//! │                                                                         │
//! │  register_purchase(supplier, lines, timestamp)                          │
//! │       │                                                                 │
//! │       ├── 1. PurchaseDraft::validate(suppliers, materials)              │
//! │       ├── 2. snapshot, apply increments in one write                    │
//! │       └── 3. append purchase ──► Err: restore snapshot                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Deletion
//! Deleting a document reverses its stock effect. A ticket gives back the
//! movements it recorded; a purchase takes its received quantities out
//! again and refuses (unless forced) when that would leave a material
//! negative.

use serde_json::Value;
use tracing::{info, warn};

use comanda_core::input::resolve_timestamp;
use comanda_core::line_item::{normalize_purchase_lines, PurchaseLineInput, SaleLineInput};
use comanda_core::stock::StockDirection;
use comanda_core::{new_id, Purchase, Ticket};

use crate::catalog::Catalog;
use crate::draft::{PurchaseDraft, SaleDraft, ValidatedPurchase, ValidatedSale};
use crate::error::StoreResult;

/// Records sales and purchases.
///
/// ## Usage
/// ```rust
/// use comanda_core::input::NewProduct;
/// use comanda_core::line_item::SaleLineInput;
/// use comanda_core::Money;
/// use comanda_store::Catalog;
///
/// let catalog = Catalog::in_memory();
/// let coffee = catalog
///     .add_product(NewProduct {
///         name: "Coffee".into(),
///         price: Money::from_cents(180),
///         available: true,
///     })
///     .unwrap();
///
/// let ticket = catalog
///     .recorder()
///     .register_sale("Ana", vec![SaleLineInput::new(&coffee.id, 2)], false, None)
///     .unwrap();
/// assert_eq!(ticket.total, Money::from_cents(360));
/// ```
#[derive(Debug, Clone)]
pub struct TransactionRecorder {
    catalog: Catalog,
}

impl TransactionRecorder {
    pub fn new(catalog: Catalog) -> Self {
        TransactionRecorder { catalog }
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Validates and commits a sale.
    ///
    /// ## Arguments
    /// * `force` - Commit even when stock can't cover the recipes (stock
    ///   goes negative)
    /// * `timestamp` - Sale time, `None` for now
    ///
    /// ## Returns
    /// * `Ok(Ticket)` - The stored ticket
    /// * `Err(InsufficientStock)` - Unforced shortfall; no ticket, no stock change
    pub fn register_sale(
        &self,
        client: &str,
        lines: Vec<SaleLineInput>,
        force: bool,
        timestamp: Option<&str>,
    ) -> StoreResult<Ticket> {
        let draft = SaleDraft {
            client: client.to_string(),
            lines,
        };
        let validated = draft.validate(&self.catalog.products().list())?;
        self.commit_sale(validated, force, timestamp)
    }

    /// Commits an already validated sale.
    pub fn commit_sale(
        &self,
        sale: ValidatedSale,
        force: bool,
        timestamp: Option<&str>,
    ) -> StoreResult<Ticket> {
        let timestamp = resolve_timestamp(timestamp, self.catalog.now())?;

        let ledger = self.catalog.ledger();
        let snapshot = ledger.snapshot();
        let plan = ledger.consume(sale.lines(), force)?;
        let forced = !plan.is_covered();

        let (client, items, total) = sale.into_parts();
        let ticket = Ticket {
            id: new_id(),
            client,
            timestamp,
            items,
            total,
            stock_movements: plan.movements,
            forced,
        };

        if let Err(e) = self.catalog.tickets().insert(ticket.clone()) {
            ledger.restore(&snapshot);
            return Err(e);
        }

        info!(
            id = %ticket.id,
            client = %ticket.client,
            total = %ticket.total,
            lines = ticket.items.len(),
            forced,
            "Sale recorded"
        );

        self.refresh_mirror();
        Ok(ticket)
    }

    /// Deletes a ticket and gives back the stock it consumed.
    pub fn delete_ticket(&self, id: &str) -> StoreResult<Ticket> {
        let ticket = self.catalog.tickets().require(id)?;

        if ticket.stock_movements.is_empty() && !ticket.items.is_empty() {
            warn!(id = %ticket.id, "Ticket has no recorded stock movements, stock left as is");
        }

        let ledger = self.catalog.ledger();
        let snapshot = ledger.snapshot();
        ledger.apply_movements(&ticket.stock_movements, StockDirection::Increase, false)?;

        if let Err(e) = self.catalog.tickets().delete(id) {
            ledger.restore(&snapshot);
            return Err(e);
        }

        info!(id = %ticket.id, total = %ticket.total, "Ticket deleted, stock restored");
        self.refresh_mirror();
        Ok(ticket)
    }

    pub fn get_ticket(&self, id: &str) -> StoreResult<Ticket> {
        self.catalog.tickets().require(id)
    }

    pub fn list_tickets(&self) -> Vec<Ticket> {
        self.catalog.tickets().list()
    }

    fn refresh_mirror(&self) {
        if let Some(mirror) = self.catalog.mirror() {
            if let Err(e) = mirror.write(&self.catalog.tickets().list()) {
                warn!(file = %mirror.path().display(), error = %e, "Ticket spreadsheet not updated");
            }
        }
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Validates and commits a purchase, adding the received quantities to
    /// stock.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - Supplier or a raw material doesn't exist; nothing written
    pub fn register_purchase(
        &self,
        supplier_id: &str,
        lines: Vec<PurchaseLineInput>,
        timestamp: Option<&str>,
    ) -> StoreResult<Purchase> {
        let draft = PurchaseDraft {
            supplier_id: supplier_id.to_string(),
            lines,
        };
        let validated = draft.validate(
            &self.catalog.suppliers().list(),
            &self.catalog.raw_materials().list(),
        )?;
        self.commit_purchase(validated, timestamp)
    }

    /// Registers a purchase from loosely keyed line objects, such as the
    /// output of a receipt reader.
    pub fn register_purchase_lines(
        &self,
        supplier_id: &str,
        raw_items: &[Value],
        timestamp: Option<&str>,
    ) -> StoreResult<Purchase> {
        let lines = normalize_purchase_lines(raw_items)?;
        self.register_purchase(supplier_id, lines, timestamp)
    }

    /// Commits an already validated purchase.
    pub fn commit_purchase(
        &self,
        purchase: ValidatedPurchase,
        timestamp: Option<&str>,
    ) -> StoreResult<Purchase> {
        let timestamp = resolve_timestamp(timestamp, self.catalog.now())?;

        let (supplier_id, supplier_name, items, total) = purchase.into_parts();
        let purchase = Purchase {
            id: new_id(),
            supplier_id,
            supplier_name,
            timestamp,
            items,
            total,
        };

        let ledger = self.catalog.ledger();
        let snapshot = ledger.snapshot();
        ledger.apply_movements(&purchase.stock_movements(), StockDirection::Increase, false)?;

        if let Err(e) = self.catalog.purchases().insert(purchase.clone()) {
            ledger.restore(&snapshot);
            return Err(e);
        }

        info!(
            id = %purchase.id,
            supplier = %purchase.supplier_name,
            total = %purchase.total,
            lines = purchase.items.len(),
            "Purchase recorded"
        );
        Ok(purchase)
    }

    /// Deletes a purchase and takes its quantities back out of stock.
    ///
    /// ## Returns
    /// * `Err(InsufficientStock)` - Stock was already used; nothing deleted
    ///   unless `force`
    pub fn delete_purchase(&self, id: &str, force: bool) -> StoreResult<Purchase> {
        let purchase = self.catalog.purchases().require(id)?;

        let ledger = self.catalog.ledger();
        let snapshot = ledger.snapshot();
        ledger.apply_movements(&purchase.stock_movements(), StockDirection::Decrease, force)?;

        if let Err(e) = self.catalog.purchases().delete(id) {
            ledger.restore(&snapshot);
            return Err(e);
        }

        info!(id = %purchase.id, total = %purchase.total, "Purchase deleted, stock reduced");
        Ok(purchase)
    }

    pub fn get_purchase(&self, id: &str) -> StoreResult<Purchase> {
        self.catalog.purchases().require(id)
    }

    pub fn list_purchases(&self) -> Vec<Purchase> {
        self.catalog.purchases().list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use comanda_core::input::{NewProduct, NewRawMaterial, NewRecipe, NewSupplier};
    use comanda_core::{Ingredient, Money};
    use serde_json::json;

    struct Cafe {
        catalog: Catalog,
        flour: String,
        bread: String,
        supplier: String,
    }

    fn cafe() -> Cafe {
        let catalog = Catalog::in_memory();
        let flour = catalog
            .add_raw_material(NewRawMaterial {
                name: "Flour".to_string(),
                unit: "kg".to_string(),
                unit_cost: 4.0,
                stock: 10.0,
                min_stock: 0.0,
            })
            .unwrap()
            .id;
        let bread = catalog
            .add_product(NewProduct {
                name: "Bread".to_string(),
                price: Money::from_cents(1000),
                available: true,
            })
            .unwrap()
            .id;
        catalog
            .add_recipe(NewRecipe {
                product_id: bread.clone(),
                ingredients: vec![Ingredient {
                    raw_material_id: flour.clone(),
                    quantity: 2.0,
                }],
                batch_yield: 1.0,
                procedure: None,
            })
            .unwrap();
        let supplier = catalog
            .add_supplier(NewSupplier {
                name: "Mill & Co".to_string(),
                contact: None,
            })
            .unwrap()
            .id;
        Cafe {
            catalog,
            flour,
            bread,
            supplier,
        }
    }

    fn stock(cafe: &Cafe) -> f64 {
        cafe.catalog.get_raw_material(&cafe.flour).unwrap().stock
    }

    #[test]
    fn test_sale_deducts_and_records_movements() {
        let cafe = cafe();
        let ticket = cafe
            .catalog
            .recorder()
            .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 3)], false, Some("2024-01-05"))
            .unwrap();

        assert_eq!(ticket.total, Money::from_cents(3000));
        assert_eq!(ticket.timestamp, "2024-01-05 00:00:00");
        assert_eq!(ticket.stock_movements[0].quantity, 6.0);
        assert!(!ticket.forced);
        assert_eq!(stock(&cafe), 4.0);
    }

    #[test]
    fn test_failed_sale_writes_nothing() {
        let cafe = cafe();
        let recorder = cafe.catalog.recorder();

        let err = recorder
            .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 6)], false, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Core(_)));
        assert_eq!(stock(&cafe), 10.0);
        assert!(recorder.list_tickets().is_empty());
    }

    #[test]
    fn test_delete_ticket_restores_stock() {
        let cafe = cafe();
        let recorder = cafe.catalog.recorder();
        let ticket = recorder
            .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 6)], true, None)
            .unwrap();
        assert!(ticket.forced);
        assert_eq!(stock(&cafe), -2.0);

        recorder.delete_ticket(&ticket.id).unwrap();
        assert_eq!(stock(&cafe), 10.0);
        assert!(recorder.get_ticket(&ticket.id).is_err());
    }

    #[test]
    fn test_purchase_and_compensating_delete() {
        let cafe = cafe();
        let recorder = cafe.catalog.recorder();

        let purchase = recorder
            .register_purchase(
                &cafe.supplier,
                vec![PurchaseLineInput::for_material(&cafe.flour, 2.0, 4.0)],
                None,
            )
            .unwrap();
        assert_eq!(purchase.total, Money::from_cents(800));
        assert_eq!(stock(&cafe), 12.0);

        recorder
            .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 6)], false, None)
            .unwrap();
        assert_eq!(stock(&cafe), 0.0);

        assert!(recorder.delete_purchase(&purchase.id, false).is_err());
        assert_eq!(recorder.list_purchases().len(), 1);

        recorder.delete_purchase(&purchase.id, true).unwrap();
        assert_eq!(stock(&cafe), -2.0);
        assert!(recorder.list_purchases().is_empty());
    }

    #[test]
    fn test_purchase_with_missing_material_writes_nothing() {
        let cafe = cafe();
        let recorder = cafe.catalog.recorder();

        let result = recorder.register_purchase(
            &cafe.supplier,
            vec![
                PurchaseLineInput::for_material(&cafe.flour, 2.0, 4.0),
                PurchaseLineInput::for_material("gone", 1.0, 1.0),
            ],
            None,
        );
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(stock(&cafe), 10.0);
        assert!(recorder.list_purchases().is_empty());
    }

    #[test]
    fn test_purchase_from_loose_lines() {
        let cafe = cafe();
        let purchase = cafe
            .catalog
            .recorder()
            .register_purchase_lines(
                &cafe.supplier,
                &[
                    json!({"materia_prima_id": cafe.flour, "cantidad": "2,5", "precio_unitario": 4}),
                    json!({"descripcion": "Napkins", "qty": 1, "price": "3.20"}),
                ],
                None,
            )
            .unwrap();

        assert_eq!(purchase.items[0].name, "Flour");
        assert_eq!(purchase.items[1].raw_material_id, None);
        assert_eq!(purchase.total, Money::from_cents(1320));
        assert_eq!(stock(&cafe), 12.5);
    }
}
