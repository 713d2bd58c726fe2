//! # Constraint Registry Errors

use thiserror::Error;

/// Result type for registry operations
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Constraint registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("Constraint already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Constraint identifier must not be empty")]
    EmptyId,
}

impl ConstraintError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConstraintError::AlreadyRegistered(_) => "CONSTRAINT_ALREADY_REGISTERED",
            ConstraintError::EmptyId => "CONSTRAINT_EMPTY_ID",
        }
    }
}
