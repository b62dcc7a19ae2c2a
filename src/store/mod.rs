//! Entity stores that keep the category/product relationship consistent.
//!
//! Each store owns its own collection and consults the other only through a
//! narrow trait:
//! - [`CategoryExistenceChecker`]: used by the product store before a product
//!   is added or moved to another category
//! - [`ProductsByCategoryLookup`]: used by the category store before a
//!   category is deleted
//!
//! Use [`crate::Inventory`] to get a wired pair.

mod category_store;
mod link;
mod product_store;

use crate::domain::Product;
use crate::error::Result;

pub use category_store::CategoryStore;
pub use link::Link;
pub use product_store::ProductStore;

/// Guard used before a product may reference a category.
pub trait CategoryExistenceChecker: Send + Sync {
    /// `NotFound` (entity = category) if no category has this id.
    fn validate_exists(&self, id: &str) -> Result<()>;
}

/// Query used before a category may be deleted.
pub trait ProductsByCategoryLookup: Send + Sync {
    /// All products whose category id equals `category_id`, in insertion order.
    fn list_by_category(&self, category_id: &str) -> Result<Vec<Product>>;
}
