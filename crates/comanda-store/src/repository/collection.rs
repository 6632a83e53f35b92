//! Collection names of each persisted entity.
//!
//! The names are the file stems of the existing data files, kept as-is so
//! a data directory written by earlier tools still loads.

use comanda_core::{
    AdditionalExpense, Entity, Product, Purchase, RawMaterial, Recipe, SalesPlan, Supplier, Ticket,
};

/// An entity stored as a named JSON array.
pub trait Collection: Entity {
    /// Collection name, also the file stem (`products` → `products.json`).
    const NAME: &'static str;
}

impl Collection for Product {
    const NAME: &'static str = "products";
}

impl Collection for RawMaterial {
    const NAME: &'static str = "materias_primas";
}

impl Collection for Recipe {
    const NAME: &'static str = "recetas";
}

impl Collection for Purchase {
    const NAME: &'static str = "compras";
}

impl Collection for Ticket {
    const NAME: &'static str = "tickets";
}

impl Collection for AdditionalExpense {
    const NAME: &'static str = "gastos_adicionales";
}

impl Collection for Supplier {
    const NAME: &'static str = "proveedores";
}

impl Collection for SalesPlan {
    const NAME: &'static str = "planes_venta";
}
