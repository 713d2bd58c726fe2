//! Path-keyed view of an error tree
//!
//! Each node carrying its own failures becomes one entry keyed by the
//! slash-joined path from the root, e.g. `/users/1/age/`. Entries keep the
//! tree's order.
//!
//! This is not a leaf-only view: a node with its own failures and failing
//! children yields an entry for itself as well as entries below it. Filter
//! on paths with no longer descendant to get one entry per leaf.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Map, Value};

use super::error::ValidationError;

/// One entry of the flattened view
#[derive(Debug, Clone, PartialEq)]
pub struct FlatError {
    pub path: String,
    pub value: Value,
    pub constraints: BTreeMap<String, String>,
}

impl fmt::Display for FlatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.constraints.values().map(String::as_str).collect();
        write!(f, "{} {}", self.path, messages.join("; "))
    }
}

/// Ordered flattened errors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatErrors {
    entries: Vec<FlatError>,
}

impl FlatErrors {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatError> {
        self.entries.iter()
    }

    /// Looks up an entry by its full path
    pub fn get(&self, path: &str) -> Option<&FlatError> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Paths in tree order
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }

    /// JSON object `{path: {value, constraints}}`
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for entry in &self.entries {
            map.insert(
                entry.path.clone(),
                json!({ "value": entry.value, "constraints": entry.constraints }),
            );
        }
        Value::Object(map)
    }
}

impl IntoIterator for FlatErrors {
    type Item = FlatError;
    type IntoIter = std::vec::IntoIter<FlatError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Flattens an error tree into path-keyed entries.
pub fn flatten(errors: &[ValidationError]) -> FlatErrors {
    let mut entries = Vec::new();
    walk(errors, "/", &mut entries);
    FlatErrors { entries }
}

fn walk(errors: &[ValidationError], prefix: &str, out: &mut Vec<FlatError>) {
    for error in errors {
        let path = format!("{}{}/", prefix, error.property);
        if !error.constraints.is_empty() {
            out.push(FlatError {
                path: path.clone(),
                value: error.value.clone(),
                constraints: error.constraints.clone(),
            });
        }
        walk(&error.children, &path, out);
    }
}
