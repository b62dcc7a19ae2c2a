//! Referential integrity integration tests
//!
//! Every check runs against each storage backend: the rules must hold the
//! same way whether records live in memory, in JSONL files, or in SQLite.

use inventory::domain::{Category, CategoryPatch, Entity, Product, ProductPatch};
use inventory::error::{InventoryError, Result};
use inventory::storage::{JsonlStorage, MemoryStorage, SqliteStorage, Storage};
use inventory::store::ProductsByCategoryLookup;
use inventory::Inventory;
use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::TempDir;

/// Run a check on a fresh inventory for each backend.
macro_rules! on_every_backend {
    ($check:ident) => {{
        $check(Inventory::new(MemoryStorage::new())?)?;

        let jsonl_dir = TempDir::new()?;
        $check(Inventory::new(JsonlStorage::new(jsonl_dir.path())?)?)?;

        let sqlite_dir = TempDir::new()?;
        $check(Inventory::new(SqliteStorage::open(sqlite_dir.path().join("inventory.db"))?)?)?;
    }};
}

fn price(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn category(id: &str) -> Category {
    Category::new(id, format!("Category {}", id), "")
}

fn product(id: &str, category_id: &str) -> Product {
    Product::new(id, format!("Product {}", id), "", price("1.50"), 10, category_id)
}

fn distinct_adds_are_all_listed<S: Storage + 'static>(inventory: Inventory<S>) -> Result<()> {
    for i in 0..5 {
        inventory.categories().add(&category(&format!("C{}", i)))?;
    }
    for i in 0..7 {
        inventory.products().add(&product(&format!("P{}", i), &format!("C{}", i % 5)))?;
    }

    assert_eq!(inventory.categories().list()?.len(), 5);
    assert_eq!(inventory.products().list()?.len(), 7);

    let ids: Vec<String> = inventory.products().list()?.into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["P0", "P1", "P2", "P3", "P4", "P5", "P6"]);
    Ok(())
}

fn duplicate_adds_leave_stores_unchanged<S: Storage + 'static>(inventory: Inventory<S>) -> Result<()> {
    inventory.categories().add(&category("C1"))?;
    inventory.products().add(&product("P1", "C1"))?;
    let categories_before = inventory.categories().list()?;
    let products_before = inventory.products().list()?;

    let err = inventory
        .categories()
        .add(&Category::new("C1", "Other", "x"))
        .unwrap_err();
    assert!(matches!(err, InventoryError::DuplicateKey { entity: Entity::Category, .. }));

    let err = inventory.products().add(&product("P1", "C1")).unwrap_err();
    assert!(matches!(err, InventoryError::DuplicateKey { entity: Entity::Product, .. }));

    assert_eq!(inventory.categories().list()?, categories_before);
    assert_eq!(inventory.products().list()?, products_before);
    Ok(())
}

fn dangling_category_is_rejected<S: Storage + 'static>(inventory: Inventory<S>) -> Result<()> {
    let p2 = Product::new("P2", "Saw", "", price("12.00"), 1, "C9");
    let err = inventory.products().add(&p2).unwrap_err();

    match err {
        InventoryError::NotFound { entity, id } => {
            assert_eq!(entity, Entity::Category);
            assert_eq!(id, "C9");
        }
        other => panic!("Expected category NotFound, got {:?}", other),
    }
    assert!(inventory.products().list()?.iter().all(|p| p.id != "P2"));
    Ok(())
}

fn delete_blocked_until_dependents_removed<S: Storage + 'static>(inventory: Inventory<S>) -> Result<()> {
    inventory.categories().add(&category("C1"))?;
    inventory.products().add(&product("P1", "C1"))?;
    inventory.products().add(&product("P2", "C1"))?;

    let err = inventory.categories().delete("C1").unwrap_err();
    assert!(matches!(err, InventoryError::HasDependents { count: 2, .. }));
    assert!(inventory.categories().get_by_id("C1")?.is_some());

    inventory.products().delete("P1")?;
    assert!(matches!(
        inventory.categories().delete("C1"),
        Err(InventoryError::HasDependents { count: 1, .. })
    ));

    inventory.products().delete("P2")?;
    inventory.categories().delete("C1")?;
    assert!(inventory.categories().list()?.is_empty());
    Ok(())
}

fn name_only_update_touches_only_name<S: Storage + 'static>(inventory: Inventory<S>) -> Result<()> {
    inventory.categories().add(&Category::new("C1", "Tools", "Hardware"))?;
    let hammer = Product::new("P1", "Hammer", "Claw", price("9.99"), 5, "C1");
    inventory.products().add(&hammer)?;

    inventory.categories().update("C1", &CategoryPatch::default().name("X"))?;
    inventory.products().update("P1", &ProductPatch::default().name("X"))?;

    assert_eq!(
        inventory.categories().get_by_id("C1")?,
        Some(Category::new("C1", "X", "Hardware"))
    );
    assert_eq!(
        inventory.products().get_by_id("P1")?,
        Some(Product {
            name: "X".to_string(),
            ..hammer
        })
    );
    Ok(())
}

fn moving_product_requires_existing_category<S: Storage + 'static>(inventory: Inventory<S>) -> Result<()> {
    inventory.categories().add(&category("C1"))?;
    inventory.categories().add(&category("C2"))?;
    inventory.products().add(&product("P1", "C1"))?;

    let err = inventory
        .products()
        .update("P1", &ProductPatch::default().category_id("C9").quantity(99))
        .unwrap_err();
    assert!(matches!(err, InventoryError::NotFound { entity: Entity::Category, .. }));
    assert_eq!(inventory.products().get_by_id("P1")?, Some(product("P1", "C1")));

    inventory
        .products()
        .update("P1", &ProductPatch::default().category_id("C2"))?;
    assert!(inventory.products().list_by_category("C1")?.is_empty());
    assert_eq!(inventory.products().list_by_category("C2")?.len(), 1);

    // C1 lost its only product, so it can go now
    inventory.categories().delete("C1")?;
    Ok(())
}

fn negative_stock_is_rejected<S: Storage + 'static>(inventory: Inventory<S>) -> Result<()> {
    inventory.categories().add(&category("C1"))?;
    inventory.products().add(&product("P1", "C1"))?;

    let err = inventory.products().update_stock("P1", -5).unwrap_err();
    assert!(matches!(err, InventoryError::InvalidQuantity { quantity: -5, .. }));
    assert_eq!(inventory.products().get_by_id("P1")?.map(|p| p.quantity), Some(10));

    inventory.products().update_stock("P1", 0)?;
    assert_eq!(inventory.products().get_by_id("P1")?.map(|p| p.quantity), Some(0));

    let err = inventory.products().update_stock("P404", 1).unwrap_err();
    assert!(matches!(err, InventoryError::NotFound { entity: Entity::Product, .. }));
    Ok(())
}

fn tools_and_hammer_scenario<S: Storage + 'static>(inventory: Inventory<S>) -> Result<()> {
    inventory
        .categories()
        .add(&Category::new("C1", "Tools", "Hardware"))?;
    inventory
        .products()
        .add(&Product::new("P1", "Hammer", "", price("9.99"), 5, "C1"))?;

    assert!(matches!(
        inventory.categories().delete("C1"),
        Err(InventoryError::HasDependents { .. })
    ));
    inventory.products().delete("P1")?;
    inventory.categories().delete("C1")?;

    assert!(inventory.categories().list()?.is_empty());
    assert!(inventory.products().list()?.is_empty());
    Ok(())
}

fn prices_read_back_exactly<S: Storage + 'static>(inventory: Inventory<S>) -> Result<()> {
    inventory.categories().add(&category("C1"))?;
    let prices = ["1234567890123456.78", "0.1234567890123456789", "99999999999999999.99"];
    for (i, digits) in prices.iter().enumerate() {
        let id = format!("P{}", i);
        inventory
            .products()
            .add(&Product::new(&id, "Gold", "", price(digits), 1, "C1"))?;
        let stored = inventory.products().get_by_id(&id)?.map(|p| p.price.to_string());
        assert_eq!(stored.as_deref(), Some(*digits));
    }

    inventory
        .products()
        .update("P0", &ProductPatch::default().price(price("0.000000000000000001")))?;
    let stored = inventory.products().get_by_id("P0")?.map(|p| p.price.to_string());
    assert_eq!(stored.as_deref(), Some("0.000000000000000001"));
    Ok(())
}

#[test]
fn test_distinct_adds_are_all_listed() -> Result<()> {
    on_every_backend!(distinct_adds_are_all_listed);
    Ok(())
}

#[test]
fn test_duplicate_adds_leave_stores_unchanged() -> Result<()> {
    on_every_backend!(duplicate_adds_leave_stores_unchanged);
    Ok(())
}

#[test]
fn test_dangling_category_is_rejected() -> Result<()> {
    on_every_backend!(dangling_category_is_rejected);
    Ok(())
}

#[test]
fn test_delete_blocked_until_dependents_removed() -> Result<()> {
    on_every_backend!(delete_blocked_until_dependents_removed);
    Ok(())
}

#[test]
fn test_name_only_update_touches_only_name() -> Result<()> {
    on_every_backend!(name_only_update_touches_only_name);
    Ok(())
}

#[test]
fn test_moving_product_requires_existing_category() -> Result<()> {
    on_every_backend!(moving_product_requires_existing_category);
    Ok(())
}

#[test]
fn test_negative_stock_is_rejected() -> Result<()> {
    on_every_backend!(negative_stock_is_rejected);
    Ok(())
}

#[test]
fn test_prices_read_back_exactly() -> Result<()> {
    on_every_backend!(prices_read_back_exactly);
    Ok(())
}

#[test]
fn test_tools_and_hammer_scenario() -> Result<()> {
    on_every_backend!(tools_and_hammer_scenario);
    Ok(())
}

/// Integration test: records written through one inventory are visible,
/// with their integrity rules, after reopening the same files.
#[test]
fn test_integrity_survives_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db = temp_dir.path().join("inventory.db");

    {
        let inventory = Inventory::new(SqliteStorage::open(&db)?)?;
        inventory.categories().add(&category("C1"))?;
        inventory.products().add(&product("P1", "C1"))?;
    }

    {
        let inventory = Inventory::new(SqliteStorage::open(&db)?)?;
        assert!(matches!(
            inventory.categories().delete("C1"),
            Err(InventoryError::HasDependents { .. })
        ));
        assert_eq!(inventory.products().get_by_id("P1")?.map(|p| p.price), Some(price("1.50")));
    }

    {
        let inventory = Inventory::new(JsonlStorage::new(temp_dir.path().join("jsonl"))?)?;
        inventory.categories().add(&category("C1"))?;
        inventory.products().add(&product("P1", "C1"))?;
    }

    {
        let inventory = Inventory::new(JsonlStorage::new(temp_dir.path().join("jsonl"))?)?;
        assert!(matches!(
            inventory.categories().delete("C1"),
            Err(InventoryError::HasDependents { .. })
        ));
    }

    Ok(())
}
