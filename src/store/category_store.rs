//! Category store.

use std::sync::{Arc, Weak};

use super::{CategoryExistenceChecker, Link, ProductsByCategoryLookup};
use crate::domain::{Category, CategoryPatch, Entity};
use crate::error::{InventoryError, Result};
use crate::storage::Storage;

/// Owns the category collection.
pub struct CategoryStore<S> {
    storage: Arc<S>,
    products: Link<dyn ProductsByCategoryLookup>,
}

impl<S: Storage> CategoryStore<S> {
    /// Create an unlinked store. `delete` fails with `Unbound` until
    /// [`bind_products`](Self::bind_products) has been called.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            products: Link::new("products"),
        }
    }

    pub fn bind_products(&self, products: Weak<dyn ProductsByCategoryLookup>) -> Result<()> {
        self.products.bind(products)
    }

    pub fn add(&self, category: &Category) -> Result<()> {
        if self.storage.find_by_id::<Category>(&category.id)?.is_some() {
            log::warn!("Rejected duplicate category {}", category.id);
            return Err(InventoryError::duplicate(Entity::Category, &category.id));
        }
        self.storage.insert(category)?;
        log::debug!("Added category {}", category.id);
        Ok(())
    }

    /// Snapshot of every category in insertion order.
    pub fn list(&self) -> Result<Vec<Category>> {
        self.storage.find_all()
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Category>> {
        self.storage.find_by_id(id)
    }

    /// Apply the fields present in `patch`; absent fields keep their values.
    pub fn update(&self, id: &str, patch: &CategoryPatch) -> Result<()> {
        if patch.is_empty() {
            log::debug!("Empty patch for category {}", id);
            return self.validate_exists(id);
        }
        let fields = patch.fields()?;
        if !self.storage.update_fields::<Category>(id, &fields)? {
            return Err(InventoryError::not_found(Entity::Category, id));
        }
        log::debug!("Updated category {} ({} field(s))", id, fields.len());
        Ok(())
    }

    /// Remove a category that no product references.
    pub fn delete(&self, id: &str) -> Result<()> {
        let linked = self.products.get()?.list_by_category(id)?;
        if !linked.is_empty() {
            log::warn!("Refused to delete category {}: {} linked product(s)", id, linked.len());
            return Err(InventoryError::HasDependents {
                id: id.to_string(),
                count: linked.len(),
            });
        }

        if !self.storage.delete_by_id::<Category>(id)? {
            return Err(InventoryError::not_found(Entity::Category, id));
        }
        log::debug!("Deleted category {}", id);
        Ok(())
    }
}

impl<S: Storage> CategoryExistenceChecker for CategoryStore<S> {
    fn validate_exists(&self, id: &str) -> Result<()> {
        match self.storage.find_by_id::<Category>(id)? {
            Some(_) => Ok(()),
            None => Err(InventoryError::not_found(Entity::Category, id)),
        }
    }
}
