//! Product domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored product document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub create_by: String,
    pub update_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; listed queries only see documents where this is
    /// unset.
    pub delete_date: Option<DateTime<Utc>>,
}

/// Validated payload for product creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Validated payload for product update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Listing filter derived from the validated query object. Query values
/// arrive as strings; `price` is parsed here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl ProductFilter {
    pub fn from_query(query: Option<&Value>) -> Self {
        let mut filter = Self::default();
        if let Some(Value::Object(map)) = query {
            filter.name = map
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string);
            filter.price = map
                .get("price")
                .and_then(Value::as_str)
                .and_then(|raw| raw.parse::<f64>().ok());
        }
        filter
    }

    pub fn matches(&self, product: &Product) -> bool {
        if product.delete_date.is_some() {
            return false;
        }
        if let Some(name) = &self.name {
            if &product.name != name {
                return false;
            }
        }
        if let Some(price) = self.price {
            if (product.price - price).abs() > f64::EPSILON {
                return false;
            }
        }
        true
    }
}

/// Listing limit from the validated query object, defaulting to 10.
pub fn limit_from_query(query: Option<&Value>) -> usize {
    query
        .and_then(|value| value.get("limit"))
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(10)
}
