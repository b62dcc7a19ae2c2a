//! Error types for the inventory stores
//!
//! Centralized error handling using thiserror. Every variant that concerns a
//! record carries the offending id so callers can present it however they like.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::Entity;

/// All error types that can occur in the inventory core
#[derive(Debug, Error)]
pub enum InventoryError {
    /// An add targeted an id that is already present
    #[error("{entity} already exists: {id}")]
    DuplicateKey { entity: Entity, id: String },

    /// An operation targeted an id that is absent
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    /// A category delete was attempted while products still reference it
    #[error("category {id} has {count} linked product(s)")]
    HasDependents { id: String, count: usize },

    /// A stock update was given a negative quantity
    #[error("invalid quantity for product {id}: {quantity}")]
    InvalidQuantity { id: String, quantity: i64 },

    /// A product was given a negative price
    #[error("invalid price for product {id}: {price}")]
    InvalidPrice { id: String, price: Decimal },

    /// A store was used before its collaborator was bound
    #[error("link not bound: {0}")]
    Unbound(&'static str),

    /// A store collaborator was bound more than once
    #[error("link already bound: {0}")]
    AlreadyBound(&'static str),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InventoryError {
    pub fn duplicate(entity: Entity, id: impl Into<String>) -> Self {
        Self::DuplicateKey { entity, id: id.into() }
    }

    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    /// The record id this error is about, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::DuplicateKey { id, .. }
            | Self::NotFound { id, .. }
            | Self::HasDependents { id, .. }
            | Self::InvalidQuantity { id, .. }
            | Self::InvalidPrice { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Result type alias for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
