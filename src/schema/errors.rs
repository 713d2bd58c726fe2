//! Schema declaration errors
//!
//! These are raised while a schema is being declared, never while data is
//! being populated. Population failures live in [`crate::populate`].

use thiserror::Error;

/// Result type for schema declaration
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema declaration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Field '{field}' declared twice in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    #[error("Empty field name in schema '{0}'")]
    EmptyFieldName(String),
}

impl SchemaError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::DuplicateField { .. } => "SCHEMA_DUPLICATE_FIELD",
            SchemaError::EmptyFieldName(_) => "SCHEMA_EMPTY_FIELD_NAME",
        }
    }
}
