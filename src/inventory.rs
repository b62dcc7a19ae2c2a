//! Application context that owns and wires the two entity stores.

use std::sync::{Arc, Weak};

use crate::error::Result;
use crate::storage::Storage;
use crate::store::{CategoryStore, ProductStore};

/// A category store and a product store sharing one storage backend, bound
/// to each other before any operation can run.
pub struct Inventory<S: Storage + 'static> {
    categories: Arc<CategoryStore<S>>,
    products: Arc<ProductStore<S>>,
}

impl<S: Storage + 'static> Inventory<S> {
    pub fn new(storage: S) -> Result<Self> {
        let storage = Arc::new(storage);
        let categories = Arc::new(CategoryStore::new(Arc::clone(&storage)));
        let products = Arc::new(ProductStore::new(storage));

        let products_weak: Weak<ProductStore<S>> = Arc::downgrade(&products);
        let categories_weak: Weak<CategoryStore<S>> = Arc::downgrade(&categories);
        categories.bind_products(products_weak)?;
        products.bind_categories(categories_weak)?;
        log::debug!("Inventory stores wired");

        Ok(Self { categories, products })
    }

    pub fn categories(&self) -> &CategoryStore<S> {
        &self.categories
    }

    pub fn products(&self) -> &ProductStore<S> {
        &self.products
    }
}
