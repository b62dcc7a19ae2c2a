//! Product store.

use std::sync::{Arc, Weak};

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::{CategoryExistenceChecker, Link, ProductsByCategoryLookup};
use crate::domain::{Entity, Product, ProductPatch};
use crate::error::{InventoryError, Result};
use crate::storage::{Filter, Storage};

/// Owns the product collection.
pub struct ProductStore<S> {
    storage: Arc<S>,
    categories: Link<dyn CategoryExistenceChecker>,
}

impl<S: Storage> ProductStore<S> {
    /// Create an unlinked store. Operations that check a category fail with
    /// `Unbound` until [`bind_categories`](Self::bind_categories) has been called.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            categories: Link::new("categories"),
        }
    }

    pub fn bind_categories(&self, categories: Weak<dyn CategoryExistenceChecker>) -> Result<()> {
        self.categories.bind(categories)
    }

    pub fn add(&self, product: &Product) -> Result<()> {
        if self.storage.find_by_id::<Product>(&product.id)?.is_some() {
            log::warn!("Rejected duplicate product {}", product.id);
            return Err(InventoryError::duplicate(Entity::Product, &product.id));
        }
        check_price(&product.id, product.price)?;
        self.check_category(&product.category_id)?;

        self.storage.insert(product)?;
        log::debug!("Added product {} in category {}", product.id, product.category_id);
        Ok(())
    }

    /// Snapshot of every product in insertion order.
    pub fn list(&self) -> Result<Vec<Product>> {
        self.storage.find_all()
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Product>> {
        self.storage.find_by_id(id)
    }

    /// Apply the fields present in `patch`. A new category id is checked
    /// before anything is written.
    pub fn update(&self, id: &str, patch: &ProductPatch) -> Result<()> {
        if self.storage.find_by_id::<Product>(id)?.is_none() {
            return Err(InventoryError::not_found(Entity::Product, id));
        }
        if patch.is_empty() {
            log::debug!("Empty patch for product {}", id);
            return Ok(());
        }
        if let Some(price) = patch.price {
            check_price(id, price)?;
        }
        if let Some(category_id) = &patch.category_id {
            self.check_category(category_id)?;
        }

        let fields = patch.fields()?;
        if !self.storage.update_fields::<Product>(id, &fields)? {
            return Err(InventoryError::not_found(Entity::Product, id));
        }
        log::debug!("Updated product {} ({} field(s))", id, fields.len());
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.storage.delete_by_id::<Product>(id)? {
            return Err(InventoryError::not_found(Entity::Product, id));
        }
        log::debug!("Deleted product {}", id);
        Ok(())
    }

    /// Replace only the stock quantity.
    pub fn update_stock(&self, id: &str, quantity: i64) -> Result<()> {
        if self.storage.find_by_id::<Product>(id)?.is_none() {
            return Err(InventoryError::not_found(Entity::Product, id));
        }
        let quantity = u32::try_from(quantity).map_err(|_| InventoryError::InvalidQuantity {
            id: id.to_string(),
            quantity,
        })?;

        let mut fields = Map::new();
        fields.insert("quantity".to_string(), Value::from(quantity));
        if !self.storage.update_fields::<Product>(id, &fields)? {
            return Err(InventoryError::not_found(Entity::Product, id));
        }
        log::debug!("Set stock of product {} to {}", id, quantity);
        Ok(())
    }

    fn check_category(&self, category_id: &str) -> Result<()> {
        self.categories.get()?.validate_exists(category_id).inspect_err(|_| {
            log::warn!("Rejected reference to missing category {}", category_id);
        })
    }
}

fn check_price(id: &str, price: Decimal) -> Result<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(InventoryError::InvalidPrice {
            id: id.to_string(),
            price,
        });
    }
    Ok(())
}

impl<S: Storage> ProductsByCategoryLookup for ProductStore<S> {
    fn list_by_category(&self, category_id: &str) -> Result<Vec<Product>> {
        self.storage.find_where(&Filter::eq("categoryId", category_id))
    }
}
