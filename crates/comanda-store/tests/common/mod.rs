//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use comanda_core::input::{NewProduct, NewRawMaterial, NewRecipe, NewSupplier};
use comanda_core::{Ingredient, Money};
use comanda_store::{Catalog, StoreConfig};

/// A throwaway data directory, removed when dropped.
pub struct TestDir {
    dir: tempfile::TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("comanda-test-")
            .tempdir()
            .expect("tempdir");
        TestDir { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> StoreConfig {
        StoreConfig::new(self.dir.path())
    }

    pub fn read(&self, file: &str) -> String {
        fs::read_to_string(self.dir.path().join(file)).unwrap()
    }
}

/// Flour (kg, 4.00/kg) and Bread (10.00, 2 kg flour per unit).
pub struct Bakery {
    pub catalog: Catalog,
    pub flour: String,
    pub bread: String,
    pub supplier: String,
}

impl Bakery {
    pub fn stock(&self) -> f64 {
        self.catalog.get_raw_material(&self.flour).unwrap().stock
    }
}

pub fn bakery(catalog: Catalog, flour_stock: f64) -> Bakery {
    let flour = catalog
        .add_raw_material(NewRawMaterial {
            name: "Flour".to_string(),
            unit: "kg".to_string(),
            unit_cost: 4.0,
            stock: flour_stock,
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

    Bakery {
        catalog,
        flour,
        bread,
        supplier,
    }
}
