//! Inventory - categories and products with referential integrity
//!
//! Two collaborating stores keep the one-to-many relationship consistent: a
//! product may only reference an existing category, and a category cannot be
//! deleted while products still reference it. The stores run on any
//! [`storage::Storage`] backend (memory, JSONL files, or SQLite).
//!
//! ```
//! use inventory::domain::{Category, Product};
//! use inventory::storage::MemoryStorage;
//! use inventory::{Inventory, InventoryError};
//! use rust_decimal::Decimal;
//!
//! let inventory = Inventory::new(MemoryStorage::new())?;
//! inventory.categories().add(&Category::new("C1", "Tools", "Hardware"))?;
//! inventory
//!     .products()
//!     .add(&Product::new("P1", "Hammer", "", Decimal::new(999, 2), 5, "C1"))?;
//!
//! let err = inventory.categories().delete("C1").unwrap_err();
//! assert!(matches!(err, InventoryError::HasDependents { .. }));
//! # Ok::<(), InventoryError>(())
//! ```

pub mod domain;
pub mod error;
pub mod inventory;
pub mod storage;
pub mod store;

pub use error::{InventoryError, Result};
pub use inventory::Inventory;
