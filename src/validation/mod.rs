//! Validation results
//!
//! - [`ValidationError`]: one node of the error tree
//! - [`ValidationFailure`]: the aggregate returned by a failed population
//! - [`flatten`]: path-keyed view for display

mod error;
mod failure;
mod flatten;

pub use error::{PathSegment, ValidationError, Violation, NESTED, STRICT};
pub use failure::ValidationFailure;
pub use flatten::{flatten, FlatError, FlatErrors};
