//! # Document Drafts
//!
//! Sales and purchases are built in memory, validated, then committed.
//!
//! ## Document Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Document Lifecycle                                │
//! │                                                                         │
//! │  1. DRAFT                                                              │
//! │     └── SaleDraft::new("Ana").add_line(...).add_line(...)              │
//! │                                                                         │
//! │  2. VALIDATED                                                          │
//! │     └── draft.validate(&products) → ValidatedSale                      │
//! │         (names frozen, prices resolved, totals in cents)               │
//! │                                                                         │
//! │  3. COMMITTED                                                          │
//! │     └── recorder.commit_sale(validated, force, timestamp) → Ticket     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Validated*` value can only come out of `validate()`, so nothing
//! unchecked reaches the recorder.

use comanda_core::line_item::{PurchaseLineInput, SaleLineInput};
use comanda_core::validation::{
    clean_name, validate_amount_bound, validate_line_count, validate_non_negative_money,
    validate_quantity,
};
use comanda_core::{
    Money, Product, PurchaseLineItem, RawMaterial, SaleLineItem, Supplier, ValidationError,
};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Sale
// =============================================================================

/// A sale being put together.
#[derive(Debug, Clone, Default)]
pub struct SaleDraft {
    pub client: String,
    pub lines: Vec<SaleLineInput>,
}

impl SaleDraft {
    pub fn new(client: impl Into<String>) -> Self {
        SaleDraft {
            client: client.into(),
            lines: Vec::new(),
        }
    }

    pub fn add_line(mut self, line: SaleLineInput) -> Self {
        self.lines.push(line);
        self
    }

    /// Checks the draft against the current products.
    ///
    /// ## Returns
    /// * `Err(Validation)` - Bad client, line count, quantity, price, or an
    ///   unavailable product
    /// * `Err(NotFound)` - A line names a product that doesn't exist
    pub fn validate(self, products: &[Product]) -> StoreResult<ValidatedSale> {
        let client = clean_name("client", &self.client)?;
        validate_line_count(self.lines.len())?;

        let mut items = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            validate_quantity(line.quantity)?;

            let product = products
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| StoreError::not_found("Product", &line.product_id))?;

            if !product.available {
                return Err(ValidationError::Unavailable {
                    name: product.name.clone(),
                }
                .into());
            }

            let unit_price = line.unit_price.unwrap_or(product.price);
            validate_non_negative_money("unit_price", unit_price)?;

            let line_total = unit_price
                .checked_multiply_quantity(line.quantity)
                .ok_or_else(|| amount_overflow("line_total"))?;

            items.push(SaleLineItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity: line.quantity,
                unit_price,
                line_total,
            });
        }

        let total = checked_total(items.iter().map(|item| item.line_total))?;

        Ok(ValidatedSale {
            client,
            lines: self.lines,
            items,
            total,
        })
    }
}

/// A sale that passed validation, ready to commit.
#[derive(Debug, Clone)]
pub struct ValidatedSale {
    client: String,
    lines: Vec<SaleLineInput>,
    items: Vec<SaleLineItem>,
    total: Money,
}

impl ValidatedSale {
    pub fn client(&self) -> &str {
        &self.client
    }

    /// Line items with product names and prices frozen.
    pub fn items(&self) -> &[SaleLineItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub(crate) fn lines(&self) -> &[SaleLineInput] {
        &self.lines
    }

    pub(crate) fn into_parts(self) -> (String, Vec<SaleLineItem>, Money) {
        (self.client, self.items, self.total)
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A purchase being put together.
#[derive(Debug, Clone, Default)]
pub struct PurchaseDraft {
    pub supplier_id: String,
    pub lines: Vec<PurchaseLineInput>,
}

impl PurchaseDraft {
    pub fn new(supplier_id: impl Into<String>) -> Self {
        PurchaseDraft {
            supplier_id: supplier_id.into(),
            lines: Vec::new(),
        }
    }

    pub fn add_line(mut self, line: PurchaseLineInput) -> Self {
        self.lines.push(line);
        self
    }

    /// Checks the draft and resolves every referenced raw material.
    ///
    /// Nothing is written here, so a missing supplier or material stops the
    /// purchase before stock is touched.
    pub fn validate(
        self,
        suppliers: &[Supplier],
        materials: &[RawMaterial],
    ) -> StoreResult<ValidatedPurchase> {
        let supplier = suppliers
            .iter()
            .find(|s| s.id == self.supplier_id)
            .ok_or_else(|| StoreError::not_found("Supplier", &self.supplier_id))?;

        validate_line_count(self.lines.len())?;

        let mut items = Vec::with_capacity(self.lines.len());
        for (index, line) in self.lines.into_iter().enumerate() {
            line.validate(index)?;

            let material = match &line.raw_material_id {
                Some(id) => Some(
                    materials
                        .iter()
                        .find(|m| &m.id == id)
                        .ok_or_else(|| StoreError::not_found("RawMaterial", id))?,
                ),
                None => None,
            };

            let name = line
                .name
                .or_else(|| material.map(|m| m.name.clone()))
                .ok_or_else(|| ValidationError::Required {
                    field: format!("items[{}].name", index),
                })?;

            let line_total = Money::line_total(line.quantity, line.unit_cost);
            validate_amount_bound(&format!("items[{}].line_total", index), line_total)?;

            items.push(PurchaseLineItem {
                raw_material_id: material.map(|m| m.id.clone()),
                name,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                line_total,
                note: line.note,
            });
        }

        let total = checked_total(items.iter().map(|item| item.line_total))?;

        Ok(ValidatedPurchase {
            supplier_id: supplier.id.clone(),
            supplier_name: supplier.name.clone(),
            items,
            total,
        })
    }
}

/// A purchase that passed validation, ready to commit.
#[derive(Debug, Clone)]
pub struct ValidatedPurchase {
    supplier_id: String,
    supplier_name: String,
    items: Vec<PurchaseLineItem>,
    total: Money,
}

impl ValidatedPurchase {
    pub fn supplier_id(&self) -> &str {
        &self.supplier_id
    }

    pub fn supplier_name(&self) -> &str {
        &self.supplier_name
    }

    pub fn items(&self) -> &[PurchaseLineItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub(crate) fn into_parts(self) -> (String, String, Vec<PurchaseLineItem>, Money) {
        (self.supplier_id, self.supplier_name, self.items, self.total)
    }
}

// =============================================================================
// Totals
// =============================================================================

fn amount_overflow(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: comanda_core::MAX_AMOUNT_CENTS / 100,
    }
}

/// Sums line totals, failing instead of overflowing.
fn checked_total(mut lines: impl Iterator<Item = Money>) -> Result<Money, ValidationError> {
    lines
        .try_fold(Money::zero(), |total, line| total.checked_add(line))
        .ok_or_else(|| amount_overflow("total"))
}
