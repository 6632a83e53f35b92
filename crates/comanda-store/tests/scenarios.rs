//! End-to-end scenarios against a file-backed store.

mod common;

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use comanda_core::input::{NewExpense, NewProduct, NewRawMaterial, NewRecipe};
use comanda_core::line_item::{PurchaseLineInput, SaleLineInput};
use comanda_core::period::Period;
use comanda_core::{Ingredient, Money};
use comanda_store::{Catalog, ErrorKind, MemoryStorage, Storage, StoreError, StoreResult};

use common::{bakery, TestDir};

// =============================================================================
// Costing and Stock
// =============================================================================

#[test]
fn test_bread_costs_eight() {
    let dir = TestDir::new();
    let cafe = bakery(Catalog::open(dir.config()).unwrap(), 10.0);

    let costing = cafe.catalog.costing();
    assert_eq!(costing.unit_production_cost(&cafe.bread), 8.0);

    let profit = costing.profitability(&cafe.bread).unwrap();
    assert_eq!(profit.profit, 2.0);
    assert_eq!(profit.margin_pct, 20.0);
}

#[test]
fn test_sell_until_stock_runs_out() {
    let dir = TestDir::new();
    let cafe = bakery(Catalog::open(dir.config()).unwrap(), 10.0);
    let recorder = cafe.catalog.recorder();

    recorder
        .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 3)], false, None)
        .unwrap();
    assert_eq!(cafe.stock(), 4.0);

    let err = recorder
        .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 3)], false, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    let shortfall = &err.shortfalls().unwrap()[0];
    assert_eq!(shortfall.name, "Flour");
    assert_eq!(shortfall.required, 6.0);
    assert_eq!(shortfall.available, 4.0);

    assert_eq!(cafe.stock(), 4.0);
    assert_eq!(recorder.list_tickets().len(), 1);

    // Reopening reads the same state from disk
    let reopened = Catalog::open(dir.config()).unwrap();
    assert_eq!(reopened.get_raw_material(&cafe.flour).unwrap().stock, 4.0);
}

#[test]
fn test_forced_sale_goes_negative_and_records_movements() {
    let cafe = bakery(Catalog::in_memory(), 4.0);

    let ticket = cafe
        .catalog
        .recorder()
        .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 3)], true, None)
        .unwrap();

    assert!(ticket.forced);
    assert_eq!(ticket.stock_movements.len(), 1);
    assert_eq!(ticket.stock_movements[0].quantity, 6.0);
    assert_eq!(cafe.stock(), -2.0);
}

#[test]
fn test_requirements_aggregate_across_lines() {
    let cafe = bakery(Catalog::in_memory(), 10.0);
    let focaccia = cafe
        .catalog
        .add_product(NewProduct {
            name: "Focaccia".to_string(),
            price: Money::from_cents(600),
            available: true,
        })
        .unwrap()
        .id;
    cafe.catalog
        .add_recipe(NewRecipe {
            product_id: focaccia.clone(),
            ingredients: vec![Ingredient {
                raw_material_id: cafe.flour.clone(),
                quantity: 3.0,
            }],
            batch_yield: 2.0,
            procedure: None,
        })
        .unwrap();

    // 3 bread need 6 kg and 4 focaccia need 6 kg: each line fits, together they don't
    let lines = vec![
        SaleLineInput::new(&cafe.bread, 3),
        SaleLineInput::new(&focaccia, 4),
    ];
    let plan = cafe.catalog.ledger().check_consumption(&lines);
    assert_eq!(plan.movements.len(), 1);
    assert_eq!(plan.movements[0].quantity, 12.0);
    assert_eq!(plan.shortfalls[0].available, 10.0);

    let result = cafe.catalog.recorder().register_sale("Ana", lines, false, None);
    assert!(result.is_err());
    assert_eq!(cafe.stock(), 10.0);
}

#[test]
fn test_products_without_recipe_touch_no_stock() {
    let cafe = bakery(Catalog::in_memory(), 1.0);
    let water = cafe
        .catalog
        .add_product(NewProduct {
            name: "Water".to_string(),
            price: Money::from_cents(150),
            available: true,
        })
        .unwrap()
        .id;

    let ticket = cafe
        .catalog
        .recorder()
        .register_sale("Ana", vec![SaleLineInput::new(&water, 50)], false, None)
        .unwrap();

    assert!(ticket.stock_movements.is_empty());
    assert_eq!(ticket.total, Money::from_cents(7500));
    assert_eq!(cafe.stock(), 1.0);
}

#[test]
fn test_deleted_material_is_skipped_in_consumption() {
    let cafe = bakery(Catalog::in_memory(), 10.0);

    // Remove the material behind the catalog's back
    let materials: Vec<_> = cafe
        .catalog
        .list_raw_materials()
        .into_iter()
        .filter(|m| m.id != cafe.flour)
        .collect();
    cafe.catalog.raw_materials().save_all(&materials).unwrap();

    let ticket = cafe
        .catalog
        .recorder()
        .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 2)], false, None)
        .unwrap();
    assert!(ticket.stock_movements.is_empty());
    assert_eq!(cafe.catalog.costing().unit_production_cost(&cafe.bread), 0.0);
}

// =============================================================================
// Purchases and Deletion
// =============================================================================

#[test]
fn test_purchase_adds_stock() {
    let dir = TestDir::new();
    let cafe = bakery(Catalog::open(dir.config()).unwrap(), 4.0);

    let purchase = cafe
        .catalog
        .recorder()
        .register_purchase(
            &cafe.supplier,
            vec![PurchaseLineInput::for_material(&cafe.flour, 2.0, 4.0)],
            Some("2024-01-10 08:00:00"),
        )
        .unwrap();

    assert_eq!(cafe.stock(), 6.0);
    assert_eq!(purchase.total, Money::from_cents(800));
    assert_eq!(purchase.supplier_name, "Mill & Co");
    assert_eq!(cafe.catalog.recorder().get_purchase(&purchase.id).unwrap(), purchase);
}

#[test]
fn test_deletions_compensate_stock() {
    let cafe = bakery(Catalog::in_memory(), 10.0);
    let recorder = cafe.catalog.recorder();

    let purchase = recorder
        .register_purchase(
            &cafe.supplier,
            vec![PurchaseLineInput::for_material(&cafe.flour, 5.0, 4.0)],
            None,
        )
        .unwrap();
    let ticket = recorder
        .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 4)], false, None)
        .unwrap();
    assert_eq!(cafe.stock(), 7.0);

    recorder.delete_ticket(&ticket.id).unwrap();
    assert_eq!(cafe.stock(), 15.0);

    recorder.delete_purchase(&purchase.id, false).unwrap();
    assert_eq!(cafe.stock(), 10.0);

    assert!(matches!(
        recorder.delete_ticket(&ticket.id),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn test_purchase_delete_refused_when_stock_was_used() {
    let cafe = bakery(Catalog::in_memory(), 0.0);
    let recorder = cafe.catalog.recorder();

    let purchase = recorder
        .register_purchase(
            &cafe.supplier,
            vec![PurchaseLineInput::for_material(&cafe.flour, 4.0, 4.0)],
            None,
        )
        .unwrap();
    recorder
        .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 1)], false, None)
        .unwrap();

    let err = recorder.delete_purchase(&purchase.id, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(cafe.stock(), 2.0);
    assert_eq!(recorder.list_purchases().len(), 1);
}

// =============================================================================
// Catalog Rules
// =============================================================================

#[test]
fn test_recipe_references() {
    let cafe = bakery(Catalog::in_memory(), 10.0);

    let second = cafe.catalog.add_recipe(NewRecipe {
        product_id: cafe.bread.clone(),
        ingredients: vec![],
        batch_yield: 1.0,
        procedure: None,
    });
    assert_eq!(second.unwrap_err().kind(), ErrorKind::Validation);

    let err = cafe.catalog.delete_raw_material(&cafe.flour).unwrap_err();
    assert!(err.to_string().contains("the recipe for Bread"));

    cafe.catalog.delete_product(&cafe.bread).unwrap();
    assert!(cafe.catalog.recipe_for_product(&cafe.bread).is_none());
    cafe.catalog.delete_raw_material(&cafe.flour).unwrap();
}

#[test]
fn test_unavailable_product_cannot_be_sold() {
    let catalog = Catalog::in_memory();
    let cake = catalog
        .add_product(NewProduct {
            name: "Cake".to_string(),
            price: Money::from_cents(2500),
            available: false,
        })
        .unwrap();

    let err = catalog
        .recorder()
        .register_sale("Ana", vec![SaleLineInput::new(&cake.id, 1)], false, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(catalog.recorder().list_tickets().is_empty());
}

#[test]
fn test_amounts_beyond_limit_are_rejected() {
    let cafe = bakery(Catalog::in_memory(), 10.0);

    let err = cafe
        .catalog
        .add_product(NewProduct {
            name: "Gold leaf cake".to_string(),
            price: Money::from_decimal(1e17),
            available: true,
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // A price stored before the limit existed fails the sale cleanly
    let mut products = cafe.catalog.list_products();
    products[0].price = Money::from_cents(i64::MAX);
    cafe.catalog.products().save_all(&products).unwrap();

    let err = cafe
        .catalog
        .recorder()
        .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 2)], false, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(cafe.catalog.recorder().list_tickets().is_empty());
    assert_eq!(cafe.stock(), 10.0);
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn test_adjusted_stock_survives_reload() {
    let dir = TestDir::new();
    let catalog = Catalog::open(dir.config()).unwrap();
    let milk = catalog
        .add_raw_material(NewRawMaterial {
            name: "Milk".to_string(),
            unit: "l".to_string(),
            unit_cost: 1.1,
            stock: 720.25,
            min_stock: 0.0,
        })
        .unwrap();

    let updated = catalog.ledger().adjust(&milk.id, 275.16).unwrap();
    assert_eq!(updated.stock, 720.25 + 275.16);

    let reopened = Catalog::open(dir.config()).unwrap();
    assert_eq!(reopened.get_raw_material(&milk.id).unwrap().stock, updated.stock);
}

#[test]
fn test_malformed_collection_reads_empty() {
    let dir = TestDir::new();
    fs::write(dir.path().join("products.json"), "{ definitely not json").unwrap();
    fs::write(dir.path().join("tickets.json"), "").unwrap();

    let catalog = Catalog::open(dir.config()).unwrap();
    assert!(catalog.list_products().is_empty());
    assert!(catalog.recorder().list_tickets().is_empty());

    // The next write replaces the broken file
    catalog
        .add_product(NewProduct {
            name: "Tea".to_string(),
            price: Money::from_cents(200),
            available: true,
        })
        .unwrap();
    assert_eq!(catalog.list_products().len(), 1);
}

#[test]
fn test_existing_data_files_load() {
    let dir = TestDir::new();
    fs::write(
        dir.path().join("materias_primas.json"),
        r#"[{"id":"m1","name":"Flour","unit":"kg","unit_cost":4,"stock":10}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("recetas.json"),
        r#"[{"id":"r1","product_id":"p1","ingredients":[{"raw_material_id":"m1","quantity":2}],"yield":1}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("products.json"),
        r#"[{"id":"p1","name":"Bread","price":10.0}]"#,
    )
    .unwrap();

    let catalog = Catalog::open(dir.config()).unwrap();
    assert_eq!(catalog.costing().unit_production_cost("p1"), 8.0);
    assert!(catalog.get_product("p1").unwrap().available);
}

#[test]
fn test_backups_created_and_pruned() {
    let dir = TestDir::new();
    let catalog = Catalog::open(dir.config().max_backups(3)).unwrap();

    for n in 0..6 {
        catalog
            .add_product(NewProduct {
                name: format!("Product {}", n),
                price: Money::from_cents(100),
                available: true,
            })
            .unwrap();
    }

    let backups: Vec<_> = fs::read_dir(dir.path().join("backups"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("products_"))
        .collect();
    assert_eq!(backups.len(), 3);

    // No temporary files left behind
    let leftovers = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_backups_disabled() {
    let dir = TestDir::new();
    let catalog = Catalog::open(dir.config().backups(false)).unwrap();
    for _ in 0..2 {
        catalog
            .add_product(NewProduct {
                name: "Tea".to_string(),
                price: Money::from_cents(200),
                available: true,
            })
            .unwrap();
    }
    assert!(!dir.path().join("backups").exists());
}

#[test]
fn test_ticket_mirror_written() {
    let dir = TestDir::new();
    let cafe = bakery(Catalog::open(dir.config()).unwrap(), 10.0);
    let recorder = cafe.catalog.recorder();

    let first = recorder
        .register_sale(
            "Ana",
            vec![SaleLineInput::new(&cafe.bread, 1)],
            false,
            Some("2024-01-05 09:00:00"),
        )
        .unwrap();
    recorder
        .register_sale(
            "Luis",
            vec![SaleLineInput::new(&cafe.bread, 2)],
            false,
            Some("2024-01-06 09:00:00"),
        )
        .unwrap();

    let csv = dir.read("tickets.csv");
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("Luis"));

    recorder.delete_ticket(&first.id).unwrap();
    let csv = dir.read("tickets.csv");
    assert_eq!(csv.lines().count(), 2);
    assert!(!csv.contains(&first.id));
}

#[test]
fn test_mirror_disabled() {
    let dir = TestDir::new();
    let cafe = bakery(
        Catalog::open(dir.config().spreadsheet_mirror(false)).unwrap(),
        10.0,
    );
    cafe.catalog
        .recorder()
        .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 1)], false, None)
        .unwrap();
    assert!(!dir.path().join("tickets.csv").exists());
}

/// Memory storage whose ticket writes fail on demand.
#[derive(Debug, Default)]
struct FailingTickets {
    inner: MemoryStorage,
    fail: AtomicBool,
}

impl Storage for FailingTickets {
    fn load(&self, collection: &str) -> StoreResult<Option<String>> {
        self.inner.load(collection)
    }

    fn store(&self, collection: &str, contents: &str) -> StoreResult<()> {
        if collection == "tickets" && self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::io(
                "tickets.json",
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ));
        }
        self.inner.store(collection, contents)
    }
}

#[test]
fn test_stock_restored_when_ticket_write_fails() {
    let storage = Arc::new(FailingTickets::default());
    let cafe = bakery(Catalog::with_storage(storage.clone()), 10.0);

    storage.fail.store(true, Ordering::SeqCst);
    let err = cafe
        .catalog
        .recorder()
        .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, 2)], false, None)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(cafe.stock(), 10.0);
}

// =============================================================================
// Reports
// =============================================================================

#[test]
fn test_monthly_sales_grouping() {
    let cafe = bakery(Catalog::in_memory(), 100.0);
    let recorder = cafe.catalog.recorder();

    for (quantity, at) in [(10, "2024-01-05 12:00:00"), (5, "2024-01-20 12:00:00"), (3, "2024-02-01 12:00:00")] {
        recorder
            .register_sale("Ana", vec![SaleLineInput::new(&cafe.bread, quantity)], false, Some(at))
            .unwrap();
    }

    let totals = cafe.catalog.reports().sales_by_period(Period::Monthly);
    let expected: Vec<(String, f64)> = vec![("2024-01".to_string(), 150.0), ("2024-02".to_string(), 30.0)];
    assert_eq!(totals.totals.into_iter().collect::<Vec<_>>(), expected);

    let weekly = cafe.catalog.reports().sales_by_period("week".parse().unwrap());
    assert_eq!(weekly.totals["2024-W01"], 100.0);
}

#[test]
fn test_monthly_dashboard() {
    let cafe = bakery(Catalog::in_memory(), 100.0);
    let coffee = cafe
        .catalog
        .add_product(NewProduct {
            name: "Coffee".to_string(),
            price: Money::from_cents(200),
            available: true,
        })
        .unwrap()
        .id;
    let recorder = cafe.catalog.recorder();

    recorder
        .register_sale(
            "Ana",
            vec![
                SaleLineInput::new(&cafe.bread, 2),
                SaleLineInput::new(&coffee, 5),
            ],
            false,
            Some("2024-01-05 09:00:00"),
        )
        .unwrap();
    recorder
        .register_sale("Luis", vec![SaleLineInput::new(&cafe.bread, 1)], false, Some("2024-01-06 09:00:00"))
        .unwrap();
    recorder
        .register_sale("Eva", vec![SaleLineInput::new(&coffee, 1)], false, Some("2024-02-01 09:00:00"))
        .unwrap();
    recorder
        .register_purchase(
            &cafe.supplier,
            vec![PurchaseLineInput::for_material(&cafe.flour, 10.0, 4.0)],
            Some("2024-01-02"),
        )
        .unwrap();
    cafe.catalog
        .add_expense(NewExpense {
            name: "Rent".to_string(),
            amount: Money::from_cents(500),
            timestamp: Some("2024-01-31 23:00:00".to_string()),
            description: None,
        })
        .unwrap();

    let dashboard = cafe.catalog.reports().monthly_dashboard("2024-01").unwrap();
    assert_eq!(dashboard.month, "2024-01");
    assert_eq!(dashboard.total_sales, 40.0);
    assert_eq!(dashboard.production_cost, 24.0);
    assert_eq!(dashboard.additional_expenses, 5.0);
    assert_eq!(dashboard.total_purchases, 40.0);
    assert_eq!(dashboard.net_result, 11.0);
    assert_eq!(dashboard.break_even_point, 29.0);
    assert_eq!(dashboard.ticket_count, 2);
    assert_eq!(dashboard.average_ticket, 20.0);
    assert_eq!(dashboard.operating_days, 2);
    assert_eq!(dashboard.average_daily_sales, 20.0);

    // Coffee contributes 10.00, bread 30.00 - 24.00 = 6.00
    assert_eq!(dashboard.top_products[0].name, "Coffee");
    assert_eq!(dashboard.top_products[0].contribution, 10.0);
    assert_eq!(dashboard.bottom_products[0].name, "Bread");
    assert_eq!(dashboard.bottom_products[0].contribution, 6.0);
}

#[test]
fn test_raw_material_validation() {
    let catalog = Catalog::in_memory();
    let err = catalog
        .add_raw_material(NewRawMaterial {
            name: "Milk".to_string(),
            unit: "l".to_string(),
            unit_cost: -1.0,
            stock: 0.0,
            min_stock: 0.0,
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(catalog.list_raw_materials().is_empty());
}
