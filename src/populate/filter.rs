//! Strict filter
//!
//! Restricts an input object to the schema's declared fields. Unknown keys
//! are collected; whether they are an error is the caller's decision.

use serde_json::{Map, Value};

use crate::schema::SchemaType;

/// Result of filtering one object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filtered {
    /// Declared fields present in the input, in declaration order
    pub fields: Map<String, Value>,
    /// Keys present in the input but not declared, in input order
    pub unknown_keys: Vec<String>,
}

/// Splits `input` into declared fields and unknown keys.
pub fn filter(input: &Map<String, Value>, schema: &SchemaType) -> Filtered {
    let mut fields = Map::new();
    for field in schema.fields() {
        if let Some(value) = input.get(field.name()) {
            fields.insert(field.name().to_string(), value.clone());
        }
    }

    let unknown_keys = input
        .keys()
        .filter(|key| !schema.declares(key))
        .cloned()
        .collect();

    Filtered {
        fields,
        unknown_keys,
    }
}
