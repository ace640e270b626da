//! Validation collaborator contract.
//!
//! The pipeline consumes validators through the narrow `Schema` trait
//! only; the concrete backend is a compiled JSON Schema. Validation
//! outcomes carry a message plus per-field details for the 400 body.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use thiserror::Error;

/// A failed query or body validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    /// One entry per violated constraint, prefixed with the instance path.
    pub details: Vec<String>,
}

impl ValidationError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details<S: Into<String>>(message: S, details: Vec<String>) -> Self {
        Self {
            message: message.into(),
            details,
        }
    }
}

/// Anything that can gate a raw payload before the handler sees it.
pub trait Schema: Send + Sync {
    /// Returns the validated payload, or the reasons it was rejected.
    fn parse(&self, raw: &Value) -> Result<Value, ValidationError>;
}

/// A named, pre-compiled JSON Schema (draft 7).
pub struct JsonSchema {
    name: String,
    compiled: JSONSchema,
}

impl JsonSchema {
    /// Compiles a schema literal. Schemas are process-startup constants,
    /// so a malformed literal is a programming error and panics here.
    pub fn compile(name: &str, schema: &Value) -> Self {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .expect("Invalid schema");
        Self {
            name: name.to_string(),
            compiled,
        }
    }
}

impl Schema for JsonSchema {
    fn parse(&self, raw: &Value) -> Result<Value, ValidationError> {
        if let Err(errors) = self.compiled.validate(raw) {
            let details: Vec<String> = errors
                .map(|err| {
                    let path = err.instance_path.to_string();
                    if path.is_empty() {
                        err.to_string()
                    } else {
                        format!("{}: {}", path, err)
                    }
                })
                .collect();
            return Err(ValidationError::with_details(
                format!("{} validation failed", self.name),
                details,
            ));
        }
        Ok(raw.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_schema() -> JsonSchema {
        JsonSchema::compile(
            "Person",
            &json!({
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string", "maxLength": 10 },
                    "age": { "type": "number" }
                },
                "additionalProperties": false
            }),
        )
    }

    #[test]
    fn test_valid_payload_is_returned_unchanged() {
        let schema = person_schema();
        let payload = json!({"name": "alice", "age": 30});
        assert_eq!(schema.parse(&payload).unwrap(), payload);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let schema = person_schema();
        let err = schema.parse(&json!({"age": 30})).unwrap_err();
        assert_eq!(err.message, "Person validation failed");
        assert!(!err.details.is_empty());
    }

    #[test]
    fn test_details_carry_the_instance_path() {
        let schema = person_schema();
        let err = schema
            .parse(&json!({"name": "a-name-that-is-far-too-long"}))
            .unwrap_err();
        assert!(err.details.iter().any(|d| d.contains("/name")));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let schema = person_schema();
        assert!(schema
            .parse(&json!({"name": "alice", "extra": true}))
            .is_err());
    }
}
