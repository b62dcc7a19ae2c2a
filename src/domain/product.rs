//! Product record and its partial-update patch

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Entity;
use crate::error::Result;
use crate::storage::Record;

/// A stocked item. `category_id` refers to a category by value; the product
/// holds no pointer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: u32,
    pub category_id: String,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        quantity: u32,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
            quantity,
            category_id: category_id.into(),
        }
    }
}

impl Record for Product {
    const ENTITY: Entity = Entity::Product;
    const FIELDS: &'static [&'static str] = &["id", "name", "description", "price", "quantity", "categoryId"];

    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields to change on a product. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl ProductPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.category_id.is_none()
    }

    /// The present fields, keyed by their serialized names.
    pub fn fields(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn hammer() -> Product {
        Product::new("P1", "Hammer", "Claw hammer", Decimal::from_str("9.99").unwrap(), 5, "C1")
    }

    #[test]
    fn test_product_uses_camel_case_category_id() {
        let json = serde_json::to_value(hammer()).unwrap();
        assert_eq!(json["categoryId"], "C1");
        assert!(json.get("category_id").is_none());
    }

    #[test]
    fn test_fields_list_matches_serialized_keys() {
        let json = serde_json::to_value(hammer()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), Product::FIELDS.len());
        assert!(Product::FIELDS.iter().all(|f| obj.contains_key(*f)));
    }

    #[test]
    fn test_price_survives_json_number() {
        let json = serde_json::json!({
            "id": "P1",
            "name": "Hammer",
            "description": "",
            "price": 9.99,
            "quantity": 5,
            "categoryId": "C1"
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.price, Decimal::from_str("9.99").unwrap());
    }

    #[test]
    fn test_patch_fields() {
        let patch = ProductPatch::default().quantity(3).category_id("C2");
        let fields = patch.fields().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["quantity"], 3);
        assert_eq!(fields["categoryId"], "C2");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProductPatch::default().is_empty());
        assert!(!ProductPatch::default().name("Mallet").is_empty());
    }
}
