//! In-memory storage with ordered collections.
//!
//! Nothing is persisted; dropping the storage drops the data.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{Map, Value};

use super::traits::{Filter, Record, Storage, check_fields, merge_fields, record_id};
use crate::error::{InventoryError, Result};

/// In-memory storage keyed by collection name, records kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    collections: RwLock<HashMap<&'static str, Vec<Value>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T: Record, R>(&self, f: impl FnOnce(&[Value]) -> Result<R>) -> Result<R> {
        let collections = self
            .collections
            .read()
            .map_err(|e| InventoryError::Storage(e.to_string()))?;
        let records = collections.get(T::collection()).map(Vec::as_slice).unwrap_or(&[]);
        f(records)
    }

    fn write<T: Record, R>(&self, f: impl FnOnce(&mut Vec<Value>) -> Result<R>) -> Result<R> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| InventoryError::Storage(e.to_string()))?;
        f(collections.entry(T::collection()).or_default())
    }
}

/// Deserialize the records matching `keep`, preserving order.
pub(crate) fn collect<T: Record>(records: &[Value], keep: impl Fn(&Value) -> bool) -> Result<Vec<T>> {
    records
        .iter()
        .filter(|r| keep(*r))
        .map(|r| serde_json::from_value(r.clone()).map_err(InventoryError::from))
        .collect()
}

/// Append `record` unless its id is already present.
pub(crate) fn push_unique<T: Record>(records: &mut Vec<Value>, record: &T) -> Result<()> {
    if records.iter().any(|r| record_id(r) == Some(record.id())) {
        return Err(InventoryError::duplicate(T::ENTITY, record.id()));
    }
    records.push(serde_json::to_value(record)?);
    Ok(())
}

/// Merge `fields` into the record with `id`. Returns false if absent.
pub(crate) fn merge_into<T: Record>(records: &mut [Value], id: &str, fields: &Map<String, Value>) -> Result<bool> {
    check_fields::<T>(fields.keys().map(String::as_str))?;
    if fields.contains_key("id") {
        return Err(InventoryError::Storage(format!("{} id is immutable", T::ENTITY)));
    }
    match records.iter_mut().find(|r| record_id(r) == Some(id)) {
        Some(record) => {
            merge_fields(record, fields);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Remove the record with `id`. Returns false if absent.
pub(crate) fn remove(records: &mut Vec<Value>, id: &str) -> bool {
    let original_len = records.len();
    records.retain(|r| record_id(r) != Some(id));
    records.len() != original_len
}

impl Storage for MemoryStorage {
    fn find_by_id<T: Record>(&self, id: &str) -> Result<Option<T>> {
        self.read::<T, _>(|records| {
            records
                .iter()
                .find(|r| record_id(r) == Some(id))
                .map(|r| serde_json::from_value(r.clone()))
                .transpose()
                .map_err(InventoryError::from)
        })
    }

    fn find_all<T: Record>(&self) -> Result<Vec<T>> {
        self.read::<T, _>(|records| collect(records, |_| true))
    }

    fn find_where<T: Record>(&self, filter: &Filter) -> Result<Vec<T>> {
        filter.check::<T>()?;
        self.read::<T, _>(|records| collect(records, |r| filter.matches(r)))
    }

    fn insert<T: Record>(&self, record: &T) -> Result<()> {
        self.write::<T, _>(|records| push_unique(records, record))
    }

    fn update_fields<T: Record>(&self, id: &str, fields: &Map<String, Value>) -> Result<bool> {
        self.write::<T, _>(|records| merge_into::<T>(records, id, fields))
    }

    fn delete_by_id<T: Record>(&self, id: &str) -> Result<bool> {
        self.write::<T, _>(|records| Ok(remove(records, id)))
    }
}
