//! Nested traversal
//!
//! Runs the whole pipeline again for nested and nested-array fields. A value
//! of the wrong shape stops recursion for that subtree and is reported as a
//! `nested` violation; nothing else can meaningfully run against it.
//! A validated nested field holding null or nothing is the same violation,
//! unless its own `is_defined` already reported the absence.

use serde_json::Value;

use super::engine::Populator;
use crate::schema::{FieldKind, FieldSpec, SchemaType};
use crate::validation::{PathSegment, ValidationError, Violation, NESTED};

/// Outcome of traversing one nested field
#[derive(Debug, Default)]
pub(crate) struct Traversal {
    /// Populated value, or the raw value on shape mismatch
    pub value: Value,
    /// Shape violations on the field itself
    pub violations: Vec<Violation>,
    /// Failures inside the value, in field or element order
    pub children: Vec<ValidationError>,
}

impl Traversal {
    fn passthrough(raw: &Value) -> Self {
        Self {
            value: raw.clone(),
            ..Self::default()
        }
    }

    fn shape_mismatch(raw: &Value, message: Option<String>) -> Self {
        Self {
            value: raw.clone(),
            violations: message.map(|m| Violation::new(NESTED, m)).into_iter().collect(),
            children: Vec::new(),
        }
    }
}

/// The shape violation for a nested field holding no value at all.
///
/// Returns `None` for scalar fields.
pub(crate) fn missing_value(field: &FieldSpec) -> Option<Violation> {
    shape_message(field).map(|message| Violation::new(NESTED, message))
}

fn shape_message(field: &FieldSpec) -> Option<String> {
    match field.kind() {
        FieldKind::Scalar => None,
        FieldKind::Nested(_) => Some(format!("nested property {} must be an object", field.name())),
        FieldKind::NestedArray(_) => Some(format!("nested property {} must be an array", field.name())),
    }
}

/// Populates a present, non-null nested value.
pub(crate) async fn traverse(populator: &Populator, field: &FieldSpec, raw: &Value) -> Traversal {
    match field.kind() {
        FieldKind::Scalar => Traversal::passthrough(raw),
        FieldKind::Nested(schema) => match raw.as_object() {
            Some(input) => {
                let (instance, children) = populator.populate_object(schema, input).await;
                Traversal {
                    value: Value::Object(instance),
                    violations: Vec::new(),
                    children,
                }
            }
            None => Traversal::shape_mismatch(raw, shape_message(field)),
        },
        FieldKind::NestedArray(schema) => match raw.as_array() {
            Some(elements) => {
                let outcomes = populator
                    .run_all(
                        elements
                            .iter()
                            .enumerate()
                            .map(|(index, element)| populate_element(populator, field, schema, index, element))
                            .collect(),
                    )
                    .await;

                let mut values = Vec::with_capacity(outcomes.len());
                let mut children = Vec::new();
                for (value, node) in outcomes {
                    values.push(value);
                    children.extend(node);
                }

                Traversal {
                    value: Value::Array(values),
                    violations: Vec::new(),
                    children,
                }
            }
            None => Traversal::shape_mismatch(raw, shape_message(field)),
        },
    }
}

async fn populate_element(
    populator: &Populator,
    field: &FieldSpec,
    schema: &SchemaType,
    index: usize,
    element: &Value,
) -> (Value, Option<ValidationError>) {
    match element.as_object() {
        Some(input) => {
            let (instance, errors) = populator.populate_object(schema, input).await;
            let node = ValidationError::build(PathSegment::Index(index), element.clone(), Vec::new(), errors);
            (Value::Object(instance), node)
        }
        None => {
            let violation = Violation::new(
                NESTED,
                format!("each value in nested property {} must be an object", field.name()),
            );
            let node = ValidationError::build(
                PathSegment::Index(index),
                element.clone(),
                vec![violation],
                Vec::new(),
            );
            (element.clone(), node)
        }
    }
}
