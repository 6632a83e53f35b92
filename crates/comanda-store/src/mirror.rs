//! # Ticket Spreadsheet Mirror
//!
//! Rewrites `tickets.csv` after every ticket change, one row per sale line,
//! so the sales history can be opened in a spreadsheet. The JSON collection
//! stays the source of truth; a mirror failure never fails the sale.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use comanda_core::{Money, Ticket};

use crate::error::{StoreError, StoreResult};

/// One CSV row.
#[derive(Debug, Serialize)]
struct TicketRow<'a> {
    ticket_id: &'a str,
    timestamp: &'a str,
    client: &'a str,
    product_id: &'a str,
    product: &'a str,
    quantity: i64,
    unit_price: Money,
    line_total: Money,
    ticket_total: Money,
}

/// Writer of the tickets spreadsheet.
#[derive(Debug, Clone)]
pub struct TicketMirror {
    path: PathBuf,
}

impl TicketMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TicketMirror { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrites the whole spreadsheet from `tickets`.
    pub fn write(&self, tickets: &[Ticket]) -> StoreResult<()> {
        let mut wtr = csv::Writer::from_writer(vec![]);

        for ticket in tickets {
            for item in &ticket.items {
                wtr.serialize(TicketRow {
                    ticket_id: &ticket.id,
                    timestamp: &ticket.timestamp,
                    client: &ticket.client,
                    product_id: &item.product_id,
                    product: &item.name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total: item.line_total,
                    ticket_total: ticket.total,
                })
                .map_err(|e| StoreError::Mirror(format!("CSV serialization error: {}", e)))?;
            }
        }

        let data = wtr
            .into_inner()
            .map_err(|e| StoreError::Mirror(format!("CSV writer error: {}", e)))?;

        fs::write(&self.path, data).map_err(|e| StoreError::io(&self.path, e))?;
        debug!(file = %self.path.display(), tickets = tickets.len(), "Ticket spreadsheet written");
        Ok(())
    }
}
