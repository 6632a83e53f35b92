//! # Catalog
//!
//! The store handle. Owns the storage backend, hands out repositories and
//! services, and runs validated CRUD that checks references between
//! collections.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog::open(StoreConfig)  /  Catalog::in_memory()                    │
//! │       │                                                                 │
//! │       ├── products() / raw_materials() / recipes() / ...  Repository<T>│
//! │       │                                                                 │
//! │       ├── ledger()    StockLedger         stock deltas, consumption    │
//! │       ├── recorder()  TransactionRecorder sales, purchases             │
//! │       ├── costing()   CostingEngine       unit cost, pricing           │
//! │       └── reports()   Reporter            periods, dashboard           │
//! │                                                                         │
//! │  Cheap to clone: every clone shares the same Arc<dyn Storage>.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reference Rules
//! - A recipe needs an existing product and existing raw materials, and a
//!   product has at most one recipe.
//! - Deleting a product deletes its recipe.
//! - A raw material used by any recipe cannot be deleted.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::info;

use comanda_core::input::{
    NewExpense, NewProduct, NewRawMaterial, NewRecipe, NewSalesPlan, NewSupplier, ProductPatch,
    RawMaterialPatch, RecipePatch, SalesPlanPatch, SupplierPatch,
};
use comanda_core::{
    AdditionalExpense, Ingredient, Product, Purchase, RawMaterial, Recipe, SalesPlan,
    SalesPlanEntry, Supplier, Ticket, ValidationError,
};

use crate::config::StoreConfig;
use crate::costing::CostingEngine;
use crate::error::StoreResult;
use crate::ledger::StockLedger;
use crate::mirror::TicketMirror;
use crate::recorder::TransactionRecorder;
use crate::reports::Reporter;
use crate::repository::Repository;
use crate::storage::{JsonFileStorage, MemoryStorage, Storage};

/// Main store handle.
///
/// ## Usage
/// ```rust
/// use comanda_core::input::NewProduct;
/// use comanda_core::Money;
/// use comanda_store::Catalog;
///
/// let catalog = Catalog::in_memory();
/// let espresso = catalog
///     .add_product(NewProduct {
///         name: "Espresso".into(),
///         price: Money::from_cents(180),
///         available: true,
///     })
///     .unwrap();
///
/// assert_eq!(catalog.get_product(&espresso.id).unwrap().name, "Espresso");
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    storage: Arc<dyn Storage>,
    mirror: Option<TicketMirror>,
}

impl Catalog {
    /// Opens a file-backed store.
    ///
    /// ## What This Does
    /// 1. Creates the data directory if it doesn't exist
    /// 2. Configures backups from `config`
    /// 3. Enables the tickets.csv mirror if configured
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        info!(dir = %config.data_dir.display(), "Opening store");

        let storage = JsonFileStorage::open(&config)?;
        let mirror = config
            .spreadsheet_mirror
            .then(|| TicketMirror::new(config.mirror_path()));

        Ok(Catalog {
            storage: Arc::new(storage),
            mirror,
        })
    }

    /// Creates an isolated in-memory store (for tests and embedding).
    pub fn in_memory() -> Self {
        Catalog::with_storage(Arc::new(MemoryStorage::new()))
    }

    /// Creates a store over any backend, without a spreadsheet mirror.
    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Catalog {
            storage,
            mirror: None,
        }
    }

    /// Sets the spreadsheet mirror.
    pub fn with_mirror(mut self, mirror: TicketMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub(crate) fn mirror(&self) -> Option<&TicketMirror> {
        self.mirror.as_ref()
    }

    /// Local wall-clock time used to stamp new documents.
    pub(crate) fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    // =========================================================================
    // Repositories
    // =========================================================================

    pub fn products(&self) -> Repository<Product> {
        Repository::new(self.storage.clone())
    }

    pub fn raw_materials(&self) -> Repository<RawMaterial> {
        Repository::new(self.storage.clone())
    }

    pub fn recipes(&self) -> Repository<Recipe> {
        Repository::new(self.storage.clone())
    }

    pub fn suppliers(&self) -> Repository<Supplier> {
        Repository::new(self.storage.clone())
    }

    pub fn purchases(&self) -> Repository<Purchase> {
        Repository::new(self.storage.clone())
    }

    pub fn tickets(&self) -> Repository<Ticket> {
        Repository::new(self.storage.clone())
    }

    pub fn expenses(&self) -> Repository<AdditionalExpense> {
        Repository::new(self.storage.clone())
    }

    pub fn sales_plans(&self) -> Repository<SalesPlan> {
        Repository::new(self.storage.clone())
    }

    // =========================================================================
    // Services
    // =========================================================================

    pub fn ledger(&self) -> StockLedger {
        StockLedger::new(self.clone())
    }

    pub fn recorder(&self) -> TransactionRecorder {
        TransactionRecorder::new(self.clone())
    }

    pub fn costing(&self) -> CostingEngine {
        CostingEngine::new(self.clone())
    }

    pub fn reports(&self) -> Reporter {
        Reporter::new(self.clone())
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub fn add_product(&self, input: NewProduct) -> StoreResult<Product> {
        let product = self.products().insert(input.into_entity()?)?;
        info!(id = %product.id, name = %product.name, "Product added");
        Ok(product)
    }

    pub fn update_product(&self, id: &str, patch: ProductPatch) -> StoreResult<Product> {
        let current = self.products().require(id)?;
        self.products().replace(patch.apply(&current)?)
    }

    /// Deletes a product together with its recipe.
    pub fn delete_product(&self, id: &str) -> StoreResult<Product> {
        let removed = self.products().delete(id)?;

        let recipes = self.recipes().list();
        let kept: Vec<Recipe> = recipes
            .iter()
            .filter(|r| r.product_id != id)
            .cloned()
            .collect();
        if kept.len() != recipes.len() {
            self.recipes().save_all(&kept)?;
            info!(product_id = %id, "Recipe removed with its product");
        }

        info!(id = %removed.id, name = %removed.name, "Product deleted");
        Ok(removed)
    }

    pub fn get_product(&self, id: &str) -> StoreResult<Product> {
        self.products().require(id)
    }

    pub fn list_products(&self) -> Vec<Product> {
        self.products().list()
    }

    // =========================================================================
    // Raw Materials
    // =========================================================================

    pub fn add_raw_material(&self, input: NewRawMaterial) -> StoreResult<RawMaterial> {
        let material = self.raw_materials().insert(input.into_entity()?)?;
        info!(id = %material.id, name = %material.name, stock = material.stock, "Raw material added");
        Ok(material)
    }

    /// Edits name, unit, cost or minimum. Stock changes go through the
    /// ledger.
    pub fn update_raw_material(&self, id: &str, patch: RawMaterialPatch) -> StoreResult<RawMaterial> {
        let current = self.raw_materials().require(id)?;
        self.raw_materials().replace(patch.apply(&current)?)
    }

    /// Deletes a raw material no recipe uses.
    ///
    /// ## Returns
    /// * `Err(Validation(InUse))` - A recipe still lists it
    pub fn delete_raw_material(&self, id: &str) -> StoreResult<RawMaterial> {
        let material = self.raw_materials().require(id)?;

        if let Some(recipe) = self.recipes().list().into_iter().find(|r| r.uses_raw_material(id)) {
            let used_by = self
                .products()
                .get_by_id(&recipe.product_id)
                .map(|p| format!("the recipe for {}", p.name))
                .unwrap_or_else(|| format!("recipe {}", recipe.id));
            return Err(ValidationError::InUse {
                entity: "RawMaterial".to_string(),
                id: material.name,
                used_by,
            }
            .into());
        }

        let removed = self.raw_materials().delete(id)?;
        info!(id = %removed.id, name = %removed.name, "Raw material deleted");
        Ok(removed)
    }

    pub fn get_raw_material(&self, id: &str) -> StoreResult<RawMaterial> {
        self.raw_materials().require(id)
    }

    pub fn list_raw_materials(&self) -> Vec<RawMaterial> {
        self.raw_materials().list()
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    pub fn add_supplier(&self, input: NewSupplier) -> StoreResult<Supplier> {
        let supplier = self.suppliers().insert(input.into_entity()?)?;
        info!(id = %supplier.id, name = %supplier.name, "Supplier added");
        Ok(supplier)
    }

    pub fn update_supplier(&self, id: &str, patch: SupplierPatch) -> StoreResult<Supplier> {
        let current = self.suppliers().require(id)?;
        self.suppliers().replace(patch.apply(&current)?)
    }

    /// Deletes a supplier. Recorded purchases keep the supplier's name.
    pub fn delete_supplier(&self, id: &str) -> StoreResult<Supplier> {
        let removed = self.suppliers().delete(id)?;
        info!(id = %removed.id, name = %removed.name, "Supplier deleted");
        Ok(removed)
    }

    pub fn get_supplier(&self, id: &str) -> StoreResult<Supplier> {
        self.suppliers().require(id)
    }

    pub fn list_suppliers(&self) -> Vec<Supplier> {
        self.suppliers().list()
    }

    // =========================================================================
    // Recipes
    // =========================================================================

    fn check_ingredients(&self, ingredients: &[Ingredient]) -> StoreResult<()> {
        let materials = self.raw_materials().list();
        for ingredient in ingredients {
            if !materials.iter().any(|m| m.id == ingredient.raw_material_id) {
                return Err(ValidationError::UnknownReference {
                    entity: "RawMaterial".to_string(),
                    id: ingredient.raw_material_id.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Adds the recipe of a product.
    ///
    /// ## Returns
    /// * `Err(Validation(UnknownReference))` - Product or a raw material is missing
    /// * `Err(Validation(Duplicate))` - The product already has a recipe
    pub fn add_recipe(&self, input: NewRecipe) -> StoreResult<Recipe> {
        let recipe = input.into_entity()?;

        let product = self.products().get_by_id(&recipe.product_id).ok_or_else(|| {
            ValidationError::UnknownReference {
                entity: "Product".to_string(),
                id: recipe.product_id.clone(),
            }
        })?;

        if self.recipe_for_product(&product.id).is_some() {
            return Err(ValidationError::Duplicate {
                field: "recipe for product".to_string(),
                value: product.name,
            }
            .into());
        }

        self.check_ingredients(&recipe.ingredients)?;

        let recipe = self.recipes().insert(recipe)?;
        info!(
            id = %recipe.id,
            product = %product.name,
            ingredients = recipe.ingredients.len(),
            "Recipe added"
        );
        Ok(recipe)
    }

    pub fn update_recipe(&self, id: &str, patch: RecipePatch) -> StoreResult<Recipe> {
        let current = self.recipes().require(id)?;
        let next = patch.apply(&current)?;
        self.check_ingredients(&next.ingredients)?;
        self.recipes().replace(next)
    }

    pub fn delete_recipe(&self, id: &str) -> StoreResult<Recipe> {
        let removed = self.recipes().delete(id)?;
        info!(id = %removed.id, product_id = %removed.product_id, "Recipe deleted");
        Ok(removed)
    }

    pub fn get_recipe(&self, id: &str) -> StoreResult<Recipe> {
        self.recipes().require(id)
    }

    /// The recipe of a product, if it has one.
    pub fn recipe_for_product(&self, product_id: &str) -> Option<Recipe> {
        self.recipes()
            .list()
            .into_iter()
            .find(|r| r.product_id == product_id)
    }

    pub fn list_recipes(&self) -> Vec<Recipe> {
        self.recipes().list()
    }

    // =========================================================================
    // Additional Expenses
    // =========================================================================

    pub fn add_expense(&self, input: NewExpense) -> StoreResult<AdditionalExpense> {
        let expense = self.expenses().insert(input.into_entity(self.now())?)?;
        info!(id = %expense.id, name = %expense.name, amount = %expense.amount, "Expense added");
        Ok(expense)
    }

    pub fn delete_expense(&self, id: &str) -> StoreResult<AdditionalExpense> {
        let removed = self.expenses().delete(id)?;
        info!(id = %removed.id, "Expense deleted");
        Ok(removed)
    }

    pub fn list_expenses(&self) -> Vec<AdditionalExpense> {
        self.expenses().list()
    }

    // =========================================================================
    // Sales Plans
    // =========================================================================

    fn check_plan_products(&self, entries: &[SalesPlanEntry]) -> StoreResult<()> {
        let products = self.products().list();
        for entry in entries {
            if !products.iter().any(|p| p.id == entry.product_id) {
                return Err(ValidationError::UnknownReference {
                    entity: "Product".to_string(),
                    id: entry.product_id.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn add_sales_plan(&self, input: NewSalesPlan) -> StoreResult<SalesPlan> {
        let plan = input.into_entity(self.now())?;
        self.check_plan_products(&plan.entries)?;
        let plan = self.sales_plans().insert(plan)?;
        info!(id = %plan.id, name = %plan.name, "Sales plan added");
        Ok(plan)
    }

    /// Edits a plan and refreshes its `updated_at`.
    pub fn update_sales_plan(&self, id: &str, patch: SalesPlanPatch) -> StoreResult<SalesPlan> {
        let current = self.sales_plans().require(id)?;
        let next = patch.apply(&current, self.now())?;
        self.check_plan_products(&next.entries)?;
        self.sales_plans().replace(next)
    }

    pub fn delete_sales_plan(&self, id: &str) -> StoreResult<SalesPlan> {
        let removed = self.sales_plans().delete(id)?;
        info!(id = %removed.id, "Sales plan deleted");
        Ok(removed)
    }

    pub fn get_sales_plan(&self, id: &str) -> StoreResult<SalesPlan> {
        self.sales_plans().require(id)
    }

    pub fn list_sales_plans(&self) -> Vec<SalesPlan> {
        self.sales_plans().list()
    }
}
