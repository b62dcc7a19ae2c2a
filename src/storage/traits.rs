//! Storage trait definitions and filter types.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::domain::Entity;
use crate::error::{InventoryError, Result};

/// A record type that can be kept in a collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Which kind of record this is; also names the collection.
    const ENTITY: Entity;

    /// Serialized field names, in column order. The first is always `id`.
    const FIELDS: &'static [&'static str];

    /// Get the record's unique identifier.
    fn id(&self) -> &str;

    fn collection() -> &'static str {
        Self::ENTITY.collection()
    }
}

/// An equality filter for querying records.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name to filter on
    pub field: String,
    /// Value the field must equal
    pub value: Value,
}

impl Filter {
    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Serialize) -> Self {
        Self {
            field: field.into(),
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        }
    }

    /// Check if a record matches this filter.
    pub fn matches(&self, record: &Value) -> bool {
        match record.get(&self.field) {
            Some(v) => *v == self.value,
            None => self.value.is_null(),
        }
    }

    /// Reject filters on fields the record type does not have.
    pub fn check<T: Record>(&self) -> Result<()> {
        check_fields::<T>(std::iter::once(self.field.as_str()))
    }
}

/// Ensure every name is a known field of `T`.
pub(crate) fn check_fields<'a, T: Record>(names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for name in names {
        if !T::FIELDS.contains(&name) {
            return Err(InventoryError::Storage(format!(
                "unknown field '{}' for {}",
                name,
                T::ENTITY
            )));
        }
    }
    Ok(())
}

/// The id of a stored JSON record.
pub(crate) fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(|v| v.as_str())
}

/// Overwrite the given fields of a stored JSON record.
pub(crate) fn merge_fields(record: &mut Value, fields: &Map<String, Value>) {
    if let Value::Object(obj) = record {
        for (key, value) in fields {
            obj.insert(key.clone(), value.clone());
        }
    }
}

/// Backing storage primitives the entity stores are built on.
///
/// Every backend keeps insertion order for `find_all` and `find_where`, refuses
/// duplicate ids on `insert`, and reports whether `update_fields` and
/// `delete_by_id` touched a record.
pub trait Storage: Send + Sync {
    /// Get a record by ID.
    fn find_by_id<T: Record>(&self, id: &str) -> Result<Option<T>>;

    /// List all records in a collection.
    fn find_all<T: Record>(&self) -> Result<Vec<T>>;

    /// Query records matching a filter.
    fn find_where<T: Record>(&self, filter: &Filter) -> Result<Vec<T>>;

    /// Insert a new record; `DuplicateKey` if the id is taken.
    fn insert<T: Record>(&self, record: &T) -> Result<()>;

    /// Overwrite the given fields of a record. Returns false if no record has the id.
    fn update_fields<T: Record>(&self, id: &str, fields: &Map<String, Value>) -> Result<bool>;

    /// Delete a record by ID. Returns false if no record has the id.
    fn delete_by_id<T: Record>(&self, id: &str) -> Result<bool>;
}
