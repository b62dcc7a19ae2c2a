//! Category record and its partial-update patch

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Entity;
use crate::error::Result;
use crate::storage::Record;

/// A category groups products. Its id is supplied by the caller and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

impl Record for Category {
    const ENTITY: Entity = Entity::Category;
    const FIELDS: &'static [&'static str] = &["id", "name", "description"];

    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields to change on a category. `None` leaves the stored value untouched;
/// `Some("")` sets it to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CategoryPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    /// The present fields, keyed by their serialized names.
    pub fn fields(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}
