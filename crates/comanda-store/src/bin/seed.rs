//! # Seed Data Generator
//!
//! Populates a data directory with a small sample café for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./data (default)
//! cargo run -p comanda-store --bin seed
//!
//! # Seed another directory
//! cargo run -p comanda-store --bin seed -- --data /tmp/cafe
//!
//! # More logging
//! RUST_LOG=debug cargo run -p comanda-store --bin seed
//! ```
//!
//! ## Generated Data
//! - Raw materials (coffee beans, milk, flour, butter, sugar)
//! - Products with recipes (espresso, latte, croissant, bread)
//! - A supplier and one purchase restocking flour and milk
//! - A few days of sales in the current month, one expense
//!
//! Then prints the month's dashboard.

use std::env;

use comanda_core::input::{NewExpense, NewProduct, NewRawMaterial, NewRecipe, NewSupplier};
use comanda_core::line_item::{PurchaseLineInput, SaleLineInput};
use comanda_core::{Ingredient, Money};
use comanda_store::{Catalog, StoreConfig};
use tracing_subscriber::EnvFilter;

/// (name, unit, unit cost, stock, minimum)
const RAW_MATERIALS: &[(&str, &str, f64, f64, f64)] = &[
    ("Coffee beans", "kg", 18.0, 5.0, 2.0),
    ("Milk", "l", 1.1, 20.0, 10.0),
    ("Flour", "kg", 0.9, 25.0, 5.0),
    ("Butter", "kg", 9.5, 4.0, 1.0),
    ("Sugar", "kg", 1.2, 1.0, 3.0),
];

/// (name, price in cents, yield, ingredients as (material index, quantity))
const PRODUCTS: &[(&str, i64, f64, &[(usize, f64)])] = &[
    ("Espresso", 180, 1.0, &[(0, 0.018)]),
    ("Latte", 320, 1.0, &[(0, 0.018), (1, 0.25)]),
    ("Croissant", 250, 12.0, &[(2, 1.0), (3, 0.5), (4, 0.1)]),
    ("Bread", 400, 2.0, &[(2, 1.0)]),
];

/// Sales per day as (day of month, product index, quantity).
const SALES: &[(u32, usize, i64)] = &[
    (1, 0, 12),
    (1, 2, 6),
    (2, 1, 9),
    (2, 3, 2),
    (3, 0, 15),
    (3, 1, 7),
    (3, 2, 10),
];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,comanda=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut data_dir = String::from("./data");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data" | "-d" => {
                if i + 1 < args.len() {
                    data_dir = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Comanda Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --data <DIR>   Data directory (default: ./data)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    init_tracing();

    println!("🌱 Comanda Seed Data Generator");
    println!("==============================");
    println!("Data directory: {}", data_dir);
    println!();

    let catalog = Catalog::open(StoreConfig::new(&data_dir))?;
    println!("✓ Store opened");

    let existing = catalog.products().count();
    if existing > 0 {
        println!("⚠ Data directory already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the data directory to regenerate.");
        return Ok(());
    }

    // Raw materials
    let mut material_ids = Vec::with_capacity(RAW_MATERIALS.len());
    for (name, unit, unit_cost, stock, min_stock) in RAW_MATERIALS {
        let material = catalog.add_raw_material(NewRawMaterial {
            name: name.to_string(),
            unit: unit.to_string(),
            unit_cost: *unit_cost,
            stock: *stock,
            min_stock: *min_stock,
        })?;
        material_ids.push(material.id);
    }
    println!("✓ {} raw materials", material_ids.len());

    // Products and recipes
    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for (name, cents, batch_yield, ingredients) in PRODUCTS {
        let product = catalog.add_product(NewProduct {
            name: name.to_string(),
            price: Money::from_cents(*cents),
            available: true,
        })?;
        catalog.add_recipe(NewRecipe {
            product_id: product.id.clone(),
            ingredients: ingredients
                .iter()
                .map(|(index, quantity)| Ingredient {
                    raw_material_id: material_ids[*index].clone(),
                    quantity: *quantity,
                })
                .collect(),
            batch_yield: *batch_yield,
            procedure: None,
        })?;
        product_ids.push(product.id);
    }
    println!("✓ {} products with recipes", product_ids.len());

    // Purchase
    let supplier = catalog.add_supplier(NewSupplier {
        name: "Molino del Sur".to_string(),
        contact: Some("pedidos@molinodelsur.example".to_string()),
    })?;
    let month = chrono::Local::now().format("%Y-%m").to_string();
    let purchase = catalog.recorder().register_purchase(
        &supplier.id,
        vec![
            PurchaseLineInput::for_material(&material_ids[2], 25.0, 0.85),
            PurchaseLineInput::for_material(&material_ids[1], 12.0, 1.05),
        ],
        Some(&format!("{}-01 07:30:00", month)),
    )?;
    println!("✓ Purchase from {} for {}", purchase.supplier_name, purchase.total);

    // Sales
    let recorder = catalog.recorder();
    for (day, product, quantity) in SALES {
        let at = format!("{}-{:02} 10:00:00", month, day);
        match recorder.register_sale(
            "Walk-in",
            vec![SaleLineInput::new(&product_ids[*product], *quantity)],
            false,
            Some(&at),
        ) {
            Ok(ticket) => println!("  Ticket {} for {}", &ticket.id[..8], ticket.total),
            Err(e) => eprintln!("  Sale skipped: {}", e),
        }
    }

    catalog.add_expense(NewExpense {
        name: "Electricity".to_string(),
        amount: Money::from_cents(8500),
        timestamp: Some(format!("{}-02", month)),
        description: None,
    })?;
    println!("✓ Sales and expenses recorded");

    // Dashboard
    let dashboard = catalog.reports().monthly_dashboard(&month)?;
    println!();
    println!("Dashboard {}", dashboard.month);
    println!("  Sales:            {:>10.2}", dashboard.total_sales);
    println!("  Production cost:  {:>10.2}", dashboard.production_cost);
    println!("  Expenses:         {:>10.2}", dashboard.additional_expenses);
    println!("  Purchases:        {:>10.2}", dashboard.total_purchases);
    println!("  Net result:       {:>10.2}", dashboard.net_result);
    println!("  Tickets:          {:>10}", dashboard.ticket_count);
    println!("  Average ticket:   {:>10.2}", dashboard.average_ticket);
    for product in &dashboard.top_products {
        println!("  ▲ {} ({:.2})", product.name, product.contribution);
    }

    let low = catalog.reports().low_stock();
    if !low.is_empty() {
        println!();
        println!("Low stock:");
        for alert in low {
            println!("  {} {:.2}/{:.2} {}", alert.name, alert.stock, alert.min_stock, alert.unit);
        }
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
