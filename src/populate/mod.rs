//! Population engine
//!
//! Turns an untyped input object into a strictly-shaped instance of a
//! schema, or into a [`ValidationFailure`](crate::validation::ValidationFailure)
//! carrying every violation found.
//!
//! # Design Principles
//!
//! - Every violation is collected; nothing short-circuits
//! - Only a shape mismatch stops recursion into a subtree
//! - Errors are ordered by declaration, never by completion
//! - No state is shared between calls

mod config;
mod engine;
mod errors;
mod evaluator;
mod filter;
mod nested;

pub use config::{FieldConcurrency, PopulatorConfig};
pub use engine::{FromSchema, Populator};
pub use errors::{PopulateError, PopulateResult};
pub use evaluator::evaluate;
pub use filter::{filter, Filtered};
