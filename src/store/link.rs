//! Bind-once weak link from one store to its collaborator.
//!
//! The category and product stores each need to query the other. Both are
//! built unlinked, then each is bound to the other exactly once. The link
//! holds a `Weak` handle so the two stores never keep each other alive.

use std::sync::{Arc, OnceLock, Weak};

use crate::error::{InventoryError, Result};

pub struct Link<T: ?Sized> {
    name: &'static str,
    slot: OnceLock<Weak<T>>,
}

impl<T: ?Sized> Link<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: OnceLock::new(),
        }
    }

    /// Bind the collaborator. Fails with `AlreadyBound` on a second call.
    pub fn bind(&self, target: Weak<T>) -> Result<()> {
        self.slot
            .set(target)
            .map_err(|_| InventoryError::AlreadyBound(self.name))
    }

    pub fn is_bound(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Resolve the collaborator. Fails with `Unbound` if it was never bound
    /// or has since been dropped.
    pub fn get(&self) -> Result<Arc<T>> {
        self.slot
            .get()
            .and_then(Weak::upgrade)
            .ok_or(InventoryError::Unbound(self.name))
    }
}

impl<T: ?Sized> std::fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("name", &self.name)
            .field("bound", &self.is_bound())
            .finish()
    }
}
