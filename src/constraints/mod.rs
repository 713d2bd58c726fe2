//! Constraint library
//!
//! The population engine never defines predicates itself: it looks each
//! constraint identifier up in a [`ConstraintRegistry`] and renders the
//! registered message template when the predicate fails.
//!
//! [`ConstraintRegistry::with_builtins`] provides the standard library
//! listed in [`builtins`].

pub mod builtins;
mod errors;
pub mod message;
mod registry;

pub use errors::{ConstraintError, ConstraintResult};
pub use registry::{AsyncConstraint, Constraint, ConstraintRegistry, RegisteredConstraint};
