//! JSON Schemas gating the product routes.

use std::sync::Arc;

use serde_json::json;

use service_core::{JsonSchema, Schema};

pub fn create_product_schema() -> Arc<dyn Schema> {
    Arc::new(JsonSchema::compile(
        "CreateProduct",
        &json!({
            "type": "object",
            "required": ["name", "price"],
            "properties": {
                "name": { "type": "string", "minLength": 1, "maxLength": 50 },
                "price": { "type": "number" },
                "description": { "type": "string", "maxLength": 255 },
                "image": { "type": "string" }
            },
            "additionalProperties": false
        }),
    ))
}

pub fn update_product_schema() -> Arc<dyn Schema> {
    Arc::new(JsonSchema::compile(
        "UpdateProduct",
        &json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "minLength": 1, "maxLength": 50 },
                "price": { "type": "number" },
                "description": { "type": "string", "maxLength": 255 },
                "image": { "type": "string" }
            },
            "additionalProperties": false
        }),
    ))
}

/// Query values arrive as strings; numeric ones are constrained by
/// pattern and parsed later.
pub fn list_products_query_schema() -> Arc<dyn Schema> {
    Arc::new(JsonSchema::compile(
        "ListProducts",
        &json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "maxLength": 50 },
                "price": { "type": "string", "pattern": "^[0-9]+(\\.[0-9]+)?$" },
                "limit": { "type": "string", "pattern": "^[0-9]+$" }
            },
            "additionalProperties": false
        }),
    ))
}
