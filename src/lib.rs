//! schemafill - declarative object population and validation
//!
//! Given an untyped JSON object and a [`SchemaType`], produce either a
//! strictly-shaped instance or a tree of every violation found.
//!
//! ```ignore
//! use schemafill::{Populator, SchemaType};
//! use serde_json::json;
//!
//! let user = SchemaType::builder("User")
//!     .field("age", |f| f.constraint("min", json!([12])))
//!     .build()?;
//!
//! let instance = Populator::default().populate(&json!({"age": 12}), &user).await?;
//! ```

pub mod constraints;
pub mod populate;
pub mod schema;
pub mod transform;
pub mod validation;

pub use constraints::{Constraint, ConstraintRegistry};
pub use populate::{FromSchema, PopulateError, PopulateResult, Populator, PopulatorConfig};
pub use schema::{FieldKind, SchemaType};
pub use transform::{to_date, TransformSpec};
pub use validation::{flatten, PathSegment, ValidationError, ValidationFailure};
