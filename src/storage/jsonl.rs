//! JSONL-based storage implementation with in-memory caching.
//!
//! One `<collection>.jsonl` file per collection. Inserts append a line;
//! updates and deletes rewrite the file from the cache.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::{Map, Value};

use super::memory::{collect, merge_into, remove};
use super::traits::{Filter, Record, Storage, record_id};
use crate::error::{InventoryError, Result};

/// JSONL-based storage with in-memory caching.
pub struct JsonlStorage {
    base_path: PathBuf,
    cache: RwLock<HashMap<&'static str, Vec<Value>>>,
}

impl JsonlStorage {
    /// Create a new JsonlStorage at the given path.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        log::debug!("JSONL storage at {}", base_path.display());
        Ok(Self {
            base_path,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Get the file path for a collection.
    fn collection_path(&self, collection: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", collection))
    }

    /// Load a collection into cache if not already loaded.
    fn ensure_loaded(&self, collection: &'static str) -> Result<()> {
        {
            let cache = self.cache.read().map_err(|e| InventoryError::Storage(e.to_string()))?;
            if cache.contains_key(collection) {
                return Ok(());
            }
        }

        let mut cache = self.cache.write().map_err(|e| InventoryError::Storage(e.to_string()))?;
        if cache.contains_key(collection) {
            return Ok(());
        }

        let path = self.collection_path(collection);
        let records = if path.exists() {
            let file = File::open(&path)?;
            let reader = BufReader::new(file);
            let mut records = Vec::new();
            for line in reader.lines() {
                let line = line?;
                if !line.trim().is_empty() {
                    let record: Value = serde_json::from_str(&line)?;
                    if record_id(&record).is_none() {
                        return Err(InventoryError::Storage(format!(
                            "record without id in {}",
                            path.display()
                        )));
                    }
                    records.push(record);
                }
            }
            records
        } else {
            Vec::new()
        };

        cache.insert(collection, records);
        Ok(())
    }

    /// Append a record to the JSONL file.
    fn append_to_file(&self, collection: &str, record: &Value) -> Result<()> {
        let path = self.collection_path(collection);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        Ok(())
    }

    /// Rewrite the entire collection file from the given records.
    fn rewrite_file(&self, collection: &str, records: &[Value]) -> Result<()> {
        let path = self.collection_path(collection);
        let tmp = path.with_extension("jsonl.tmp");
        {
            let mut file = File::create(&tmp)?;
            for record in records {
                writeln!(file, "{}", serde_json::to_string(record)?)?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn read<T: Record, R>(&self, f: impl FnOnce(&[Value]) -> Result<R>) -> Result<R> {
        self.ensure_loaded(T::collection())?;
        let cache = self.cache.read().map_err(|e| InventoryError::Storage(e.to_string()))?;
        let records = cache
            .get(T::collection())
            .ok_or_else(|| InventoryError::Storage(format!("Collection not loaded: {}", T::collection())))?;
        f(records)
    }

    /// Apply `f` to a copy of the collection, persist the copy, then swap it in.
    /// A failure at any step leaves both the cache and the file untouched.
    fn rewrite<T: Record, R>(&self, f: impl FnOnce(&mut Vec<Value>) -> Result<(R, bool)>) -> Result<R> {
        self.ensure_loaded(T::collection())?;
        let mut cache = self.cache.write().map_err(|e| InventoryError::Storage(e.to_string()))?;
        let records = cache
            .get_mut(T::collection())
            .ok_or_else(|| InventoryError::Storage(format!("Collection not loaded: {}", T::collection())))?;

        let mut next = records.clone();
        let (out, changed) = f(&mut next)?;
        if changed {
            self.rewrite_file(T::collection(), &next)?;
            *records = next;
        }
        Ok(out)
    }
}

impl Storage for JsonlStorage {
    fn find_by_id<T: Record>(&self, id: &str) -> Result<Option<T>> {
        self.read::<T, _>(|records| {
            Ok(collect::<T>(records, |r| record_id(r) == Some(id))?.into_iter().next())
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
        self.ensure_loaded(T::collection())?;
        let mut cache = self.cache.write().map_err(|e| InventoryError::Storage(e.to_string()))?;
        let records = cache
            .get_mut(T::collection())
            .ok_or_else(|| InventoryError::Storage(format!("Collection not loaded: {}", T::collection())))?;

        if records.iter().any(|r| record_id(r) == Some(record.id())) {
            return Err(InventoryError::duplicate(T::ENTITY, record.id()));
        }

        // Append to file first (source of truth), then update cache
        let value = serde_json::to_value(record)?;
        self.append_to_file(T::collection(), &value)?;
        records.push(value);
        Ok(())
    }

    fn update_fields<T: Record>(&self, id: &str, fields: &Map<String, Value>) -> Result<bool> {
        self.rewrite::<T, _>(|records| {
            let found = merge_into::<T>(records, id, fields)?;
            Ok((found, found))
        })
    }

    fn delete_by_id<T: Record>(&self, id: &str) -> Result<bool> {
        self.rewrite::<T, _>(|records| {
            let found = remove(records, id);
            Ok((found, found))
        })
    }
}
