//! Schema declarations
//!
//! A schema lists the fields an input object may carry and, per field, the
//! constraints it must satisfy, how it nests, and how its raw value is
//! transformed before validation.
//!
//! # Design Principles
//!
//! - Schemas are explicit values, never per-type global state
//! - Declared once, immutable afterwards
//! - Field order is declaration order and drives error ordering
//! - Nested schemas are shared through `Arc`

mod errors;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use types::{
    Activation, ConstraintSpec, FieldBuilder, FieldKind, FieldSpec, SchemaBuilder, SchemaType,
};
