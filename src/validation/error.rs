//! Validation error tree
//!
//! One [`ValidationError`] per failing field, nested the way the input is
//! nested. Array elements are identified by [`PathSegment::Index`], never by
//! a formatted string, so field names containing separators stay
//! unambiguous.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Constraint identifier used for nested shape violations
pub const NESTED: &str = "nested";

/// Constraint identifier used for rejected unknown keys
pub const STRICT: &str = "strict";

/// Identifies one node of the error tree relative to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A declared field
    Field(String),
    /// An element of a nested array
    Index(usize),
    /// The keys a strict schema rejected
    UnknownKeys,
}

impl PathSegment {
    /// Returns the field name for `Field` segments
    pub fn as_field(&self) -> Option<&str> {
        match self {
            PathSegment::Field(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the position for `Index` segments
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::UnknownKeys => write!(f, "$unknown"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PathSegment::Field(name) => serializer.serialize_str(name),
            PathSegment::Index(i) => serializer.serialize_u64(*i as u64),
            PathSegment::UnknownKeys => serializer.serialize_str("$unknown"),
        }
    }
}

/// One failed constraint on a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Constraint identifier
    pub constraint: String,
    /// Rendered message
    pub message: String,
}

impl Violation {
    pub fn new(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            message: message.into(),
        }
    }
}

/// One node of the error tree.
///
/// Invariant: `constraints` or `children` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Which field or element failed
    pub property: PathSegment,
    /// The rejected value, after its transform
    pub value: Value,
    /// Constraint identifier to message, for failures on this node itself
    pub constraints: BTreeMap<String, String>,
    /// Failures inside this node's value
    pub children: Vec<ValidationError>,
}

impl ValidationError {
    /// Merges own failures and child sub-trees into a node.
    ///
    /// Returns `None` when there is nothing to report.
    pub fn build(
        property: impl Into<PathSegment>,
        value: Value,
        violations: Vec<Violation>,
        children: Vec<ValidationError>,
    ) -> Option<Self> {
        if violations.is_empty() && children.is_empty() {
            return None;
        }

        let constraints = violations
            .into_iter()
            .map(|v| (v.constraint, v.message))
            .collect();

        Some(Self {
            property: property.into(),
            value,
            constraints,
            children,
        })
    }

    /// The synthetic node for keys a strict schema does not declare.
    pub fn unknown_keys(schema: &str, keys: Vec<String>) -> Self {
        let message = if keys.len() == 1 {
            format!("property {} should not exist in {}", keys[0], schema)
        } else {
            format!("properties {} should not exist in {}", keys.join(", "), schema)
        };

        Self {
            property: PathSegment::UnknownKeys,
            value: Value::Array(keys.into_iter().map(Value::String).collect()),
            constraints: BTreeMap::from([(STRICT.to_string(), message)]),
            children: Vec::new(),
        }
    }

    /// The rejected keys, when this is an unknown-keys node
    pub fn offending_keys(&self) -> Option<Vec<&str>> {
        if self.property != PathSegment::UnknownKeys {
            return None;
        }
        self.value
            .as_array()
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
    }

    /// Returns whether the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns whether `constraint` failed directly on this node
    pub fn has_constraint(&self, constraint: &str) -> bool {
        self.constraints.contains_key(constraint)
    }

    /// Finds a direct child by segment
    pub fn child(&self, segment: impl Into<PathSegment>) -> Option<&ValidationError> {
        let segment = segment.into();
        self.children.iter().find(|c| c.property == segment)
    }

    /// Number of nodes carrying their own failures in this subtree
    pub fn violation_count(&self) -> usize {
        let own = usize::from(!self.constraints.is_empty());
        own + self.children.iter().map(ValidationError::violation_count).sum::<usize>()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.property)?;
        if !self.constraints.is_empty() {
            let messages: Vec<&str> = self.constraints.values().map(String::as_str).collect();
            write!(f, ": {}", messages.join("; "))?;
        }
        if !self.children.is_empty() {
            write!(f, " ({} nested)", self.children.len())?;
        }
        Ok(())
    }
}
