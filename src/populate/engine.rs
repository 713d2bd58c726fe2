//! Population engine
//!
//! Per call, for every object level:
//! 1. Strict filter: keep declared keys, report unknown ones in strict mode
//! 2. Transform each present field once
//! 3. Per field: nested traversal and constraint evaluation
//! 4. Build the error tree bottom-up
//!
//! Population and validation run together. The instance is only returned
//! when no error node was produced.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, join_all, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::Instrument;

use super::config::{FieldConcurrency, PopulatorConfig};
use super::errors::{PopulateError, PopulateResult};
use super::evaluator::evaluate;
use super::filter::{filter, Filtered};
use super::nested;
use crate::constraints::builtins::IS_DEFINED;
use crate::constraints::ConstraintRegistry;
use crate::schema::{FieldKind, FieldSpec, SchemaType};
use crate::validation::{PathSegment, ValidationError, ValidationFailure, Violation};

/// A type whose instances are populated from a schema.
pub trait FromSchema: DeserializeOwned {
    /// The schema describing `Self`
    fn schema() -> Arc<SchemaType>;
}

/// Populates and validates input objects against schemas.
///
/// Holds no per-call state: one populator can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Populator {
    registry: Arc<ConstraintRegistry>,
    config: PopulatorConfig,
}

impl Default for Populator {
    fn default() -> Self {
        Self::new(Arc::new(ConstraintRegistry::with_builtins()))
    }
}

impl Populator {
    /// Creates a populator with the default configuration.
    pub fn new(registry: Arc<ConstraintRegistry>) -> Self {
        Self::with_config(registry, PopulatorConfig::default())
    }

    /// Creates a populator with an explicit configuration.
    pub fn with_config(registry: Arc<ConstraintRegistry>, config: PopulatorConfig) -> Self {
        Self { registry, config }
    }

    /// The constraint registry in use
    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    /// The configuration in use
    pub fn config(&self) -> &PopulatorConfig {
        &self.config
    }

    /// Verifies every constraint used by `schema` (nested schemas included)
    /// is registered.
    ///
    /// # Errors
    ///
    /// Returns `PopulateError::UnregisteredConstraint` for the first unknown
    /// identifier.
    pub fn check_schema(&self, schema: &SchemaType) -> PopulateResult<()> {
        match schema
            .constraint_ids()
            .into_iter()
            .find(|id| !self.registry.contains(id))
        {
            Some(id) => {
                tracing::warn!(schema = schema.name(), constraint = id, "unregistered constraint");
                Err(PopulateError::UnregisteredConstraint {
                    schema: schema.name().to_string(),
                    id: id.to_string(),
                })
            }
            None => Ok(()),
        }
    }

    /// Populates `input` with `schema`.
    ///
    /// # Errors
    ///
    /// - `Validation` with the full error tree if any violation was found
    /// - `NotAnObject` if `input` is not a JSON object
    /// - `UnregisteredConstraint` if the schema uses an unknown constraint
    pub async fn populate(&self, input: &Value, schema: &SchemaType) -> PopulateResult<Map<String, Value>> {
        self.check_schema(schema)?;

        let object = input.as_object().ok_or_else(|| PopulateError::NotAnObject {
            schema: schema.name().to_string(),
            found: json_type_name(input),
        })?;

        let span = tracing::debug_span!("populate", schema = schema.name());
        let (instance, errors) = self.populate_object(schema, object).instrument(span).await;

        if errors.is_empty() {
            Ok(instance)
        } else {
            tracing::debug!(schema = schema.name(), errors = errors.len(), "population failed");
            Err(ValidationFailure::new(schema.name(), errors).into())
        }
    }

    /// Populates `input` with `schema` and deserializes the instance.
    pub async fn populate_into<T>(&self, input: &Value, schema: &SchemaType) -> PopulateResult<T>
    where
        T: DeserializeOwned,
    {
        let instance = self.populate(input, schema).await?;
        serde_json::from_value(Value::Object(instance)).map_err(|source| PopulateError::Deserialize {
            schema: schema.name().to_string(),
            source,
        })
    }

    /// Populates a [`FromSchema`] type.
    pub async fn populate_as<T: FromSchema>(&self, input: &Value) -> PopulateResult<T> {
        let schema = T::schema();
        self.populate_into(input, &schema).await
    }

    /// Runs [`populate`](Self::populate) to completion on a current-thread
    /// runtime.
    ///
    /// Must not be called from inside an async runtime.
    pub fn populate_blocking(&self, input: &Value, schema: &SchemaType) -> PopulateResult<Map<String, Value>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| PopulateError::Runtime(e.to_string()))?;
        runtime.block_on(self.populate(input, schema))
    }

    /// Populates one object level, returning the instance and the error
    /// nodes for that level.
    pub(crate) fn populate_object<'a>(
        &'a self,
        schema: &'a SchemaType,
        input: &'a Map<String, Value>,
    ) -> BoxFuture<'a, (Map<String, Value>, Vec<ValidationError>)> {
        async move {
            let Filtered { fields, unknown_keys } = filter(input, schema);

            let mut errors = Vec::new();
            if !unknown_keys.is_empty() {
                if self.config.is_strict(schema) {
                    tracing::debug!(schema = schema.name(), keys = ?unknown_keys, "rejecting unknown keys");
                    errors.push(ValidationError::unknown_keys(schema.name(), unknown_keys));
                } else {
                    tracing::trace!(schema = schema.name(), dropped = unknown_keys.len(), "dropping unknown keys");
                }
            }

            let staged = self
                .run_all(
                    schema
                        .fields()
                        .iter()
                        .map(|field| transform_field(field, fields.get(field.name()).cloned()))
                        .collect(),
                )
                .await;

            let mut object = Map::new();
            let mut transform_failures = Vec::with_capacity(staged.len());
            for (field, (value, failure)) in schema.fields().iter().zip(staged) {
                if let Some(value) = value {
                    object.insert(field.name().to_string(), value);
                }
                transform_failures.push(failure);
            }

            let outcomes = self
                .run_all(
                    schema
                        .fields()
                        .iter()
                        .zip(transform_failures)
                        .map(|(field, failure)| self.populate_field(field, &object, failure))
                        .collect(),
                )
                .await;

            let mut instance = Map::new();
            for (field, (value, node)) in schema.fields().iter().zip(outcomes) {
                if let Some(value) = value {
                    instance.insert(field.name().to_string(), value);
                }
                errors.extend(node);
            }

            (instance, errors)
        }
        .boxed()
    }

    async fn populate_field(
        &self,
        field: &FieldSpec,
        object: &Map<String, Value>,
        transform_failure: Option<Violation>,
    ) -> (Option<Value>, Option<ValidationError>) {
        let value = object.get(field.name());
        let validate = field.applies_to(object);
        let reported = value.cloned().unwrap_or(Value::Null);

        let traversal = async {
            match (field.kind(), value) {
                (FieldKind::Scalar, _) | (_, None) | (_, Some(Value::Null)) => None,
                (_, Some(raw)) => Some(nested::traverse(self, field, raw).await),
            }
        };
        let constraints = async {
            if validate {
                evaluate(&self.registry, field, &reported, object).await
            } else {
                Vec::new()
            }
        };
        let (traversal, constraint_failures) = future::join(traversal, constraints).await;

        let (populated, mut shape_failures, children) = match traversal {
            Some(t) => (Some(t.value), t.violations, t.children),
            None => (value.cloned(), Vec::new(), Vec::new()),
        };

        if !validate {
            return (populated, None);
        }

        if reported.is_null() && !constraint_failures.iter().any(|v| v.constraint == IS_DEFINED) {
            shape_failures.extend(nested::missing_value(field));
        }

        let mut violations: Vec<Violation> = transform_failure.into_iter().collect();
        violations.extend(constraint_failures);
        violations.extend(shape_failures);

        let node = ValidationError::build(
            PathSegment::Field(field.name().to_string()),
            reported,
            violations,
            children,
        );
        if let Some(node) = &node {
            tracing::debug!(
                field = field.name(),
                failures = node.constraints.len(),
                nested = node.children.len(),
                "field failed validation"
            );
        }

        (populated, node)
    }

    /// Awaits sibling futures according to the configured concurrency,
    /// keeping their order.
    pub(crate) async fn run_all<F>(&self, futures: Vec<F>) -> Vec<F::Output>
    where
        F: Future,
    {
        match self.config.concurrency {
            FieldConcurrency::Concurrent => join_all(futures).await,
            FieldConcurrency::Sequential => {
                let mut outputs = Vec::with_capacity(futures.len());
                for fut in futures {
                    outputs.push(fut.await);
                }
                outputs
            }
        }
    }
}

/// Applies a field's transform to its present, non-null value.
///
/// On failure the raw value is kept and the failure is returned as a
/// violation keyed by the transform's name.
async fn transform_field(field: &FieldSpec, raw: Option<Value>) -> (Option<Value>, Option<Violation>) {
    let (Some(transform), Some(value)) = (field.transform(), raw.as_ref()) else {
        return (raw, None);
    };
    if value.is_null() {
        return (raw, None);
    }

    match transform.apply(value.clone()).await {
        Ok(transformed) => (Some(transformed), None),
        Err(e) => {
            tracing::debug!(field = field.name(), transform = transform.name(), reason = e.reason(), "transform failed");
            let violation = Violation::new(transform.name(), format!("{} {}", field.name(), e));
            (raw, Some(violation))
        }
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
