//! Domain types for the inventory
//!
//! - Category: a named grouping of products
//! - Product: a stocked item that belongs to exactly one category
//! - Patches: optional-field structures used for partial updates

pub mod category;
pub mod product;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use category::{Category, CategoryPatch};
pub use product::{Product, ProductPatch};

/// The kinds of record the inventory keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Category,
    Product,
}

impl Entity {
    /// Collection (table / file stem) name used by the storage backends
    pub fn collection(&self) -> &'static str {
        match self {
            Entity::Category => "category",
            Entity::Product => "product",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}
