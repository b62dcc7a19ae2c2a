//! Storage layer for the inventory.
//!
//! The entity stores are written against the [`Storage`] primitives, so the
//! integrity rules hold the same way on every backend:
//! - **MemoryStorage**: ordered in-memory collections, nothing persisted
//! - **JsonlStorage**: one JSONL file per collection with an in-memory cache
//! - **SqliteStorage**: one table per collection, foreign keys enforced

mod jsonl;
mod memory;
mod sqlite;
mod traits;

pub use jsonl::JsonlStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{Filter, Record, Storage};
