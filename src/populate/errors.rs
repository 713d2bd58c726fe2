//! # Population Errors

use thiserror::Error;

use crate::validation::{ValidationError, ValidationFailure};

/// Result type for population
pub type PopulateResult<T> = Result<T, PopulateError>;

/// Population errors
///
/// Constraint violations are collected into [`ValidationFailure`]; every
/// other variant means population could not run to completion.
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("Constraint '{id}' used by schema '{schema}' is not registered")]
    UnregisteredConstraint { schema: String, id: String },

    #[error("Input for schema '{schema}' must be an object, got {found}")]
    NotAnObject { schema: String, found: &'static str },

    #[error("Populated '{schema}' could not be deserialized: {source}")]
    Deserialize {
        schema: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl PopulateError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PopulateError::Validation(_) => "POPULATE_VALIDATION_FAILED",
            PopulateError::UnregisteredConstraint { .. } => "POPULATE_UNREGISTERED_CONSTRAINT",
            PopulateError::NotAnObject { .. } => "POPULATE_NOT_AN_OBJECT",
            PopulateError::Deserialize { .. } => "POPULATE_DESERIALIZE_FAILED",
            PopulateError::Runtime(_) => "POPULATE_RUNTIME",
        }
    }

    /// The error tree, when population failed validation
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            PopulateError::Validation(failure) => Some(failure.errors()),
            _ => None,
        }
    }

    /// Returns whether the input itself was rejected, as opposed to a
    /// schema or environment problem
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PopulateError::Validation(_) | PopulateError::NotAnObject { .. }
        )
    }
}
