//! Aggregate validation failure

use std::fmt;

use serde::Serialize;

use super::error::ValidationError;
use super::flatten::{flatten, FlatErrors};

/// Every violation found by one population call.
///
/// Ordered: the unknown-keys entry (if any) first, then failing fields in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    schema: String,
    errors: Vec<ValidationError>,
}

impl ValidationFailure {
    pub fn new(schema: impl Into<String>, errors: Vec<ValidationError>) -> Self {
        Self {
            schema: schema.into(),
            errors,
        }
    }

    /// Name of the top-level schema
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Top-level error nodes
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consumes self and returns the error nodes
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Path-keyed view of the tree
    pub fn flatten(&self) -> FlatErrors {
        flatten(&self.errors)
    }

    /// Finds a top-level node by field name
    pub fn field(&self, name: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.property.as_field() == Some(name))
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flat = self.flatten();
        write!(
            f,
            "validation failed for '{}' ({} violation(s))",
            self.schema,
            flat.len()
        )?;
        for entry in flat.iter() {
            write!(f, "\n  {}", entry)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}
