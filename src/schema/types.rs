//! Schema type definitions
//!
//! A schema is plain data: an ordered list of declared fields, each with its
//! kind, constraints and optional transform. Schemas are built once through
//! [`SchemaType::builder`] and never mutated afterwards.
//!
//! Field kinds:
//! - scalar: value is stored as-is after its transform
//! - nested: value is populated with another schema
//! - nested array: every element is populated with another schema

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};
use crate::transform::TransformSpec;

/// Predicate evaluated against the object containing a field.
pub type Activation = Arc<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>;

/// How a field's value is populated.
#[derive(Clone)]
pub enum FieldKind {
    /// Stored as-is
    Scalar,
    /// A single object populated with the referenced schema
    Nested(Arc<SchemaType>),
    /// An array whose elements are populated with the referenced schema
    NestedArray(Arc<SchemaType>),
}

impl FieldKind {
    /// Returns the kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Nested(_) => "nested",
            FieldKind::NestedArray(_) => "nested_array",
        }
    }

    /// Returns the referenced schema for nested kinds
    pub fn nested_schema(&self) -> Option<&Arc<SchemaType>> {
        match self {
            FieldKind::Scalar => None,
            FieldKind::Nested(schema) | FieldKind::NestedArray(schema) => Some(schema),
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.nested_schema() {
            Some(schema) => write!(f, "{}({})", self.kind_name(), schema.name()),
            None => write!(f, "{}", self.kind_name()),
        }
    }
}

/// One constraint attached to a field.
#[derive(Clone)]
pub struct ConstraintSpec {
    /// Identifier in the constraint registry
    pub id: String,
    /// Positional parameters, conventionally a JSON array
    pub params: Value,
    /// When present and false, the constraint is skipped entirely
    pub activation: Option<Activation>,
}

impl ConstraintSpec {
    /// Create an unconditional constraint
    pub fn new(id: impl Into<String>, params: Value) -> Self {
        Self {
            id: id.into(),
            params,
            activation: None,
        }
    }

    /// Attach an activation predicate
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        self.activation = Some(Arc::new(predicate));
        self
    }

    /// Returns whether this constraint applies to the given object.
    pub fn is_active(&self, object: &Map<String, Value>) -> bool {
        self.activation.as_ref().map_or(true, |active| active(object))
    }

    /// Returns the parameter at `index` when params is an array.
    pub fn param(&self, index: usize) -> Option<&Value> {
        self.params.as_array().and_then(|args| args.get(index))
    }
}

impl fmt::Debug for ConstraintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSpec")
            .field("id", &self.id)
            .field("params", &self.params)
            .field("conditional", &self.activation.is_some())
            .finish()
    }
}

/// One declared field.
#[derive(Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) constraints: Vec<ConstraintSpec>,
    pub(crate) transform: Option<TransformSpec>,
    pub(crate) guards: Vec<Activation>,
}

impl FieldSpec {
    /// Field name, unique within its schema
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field kind
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Constraints in declaration order
    pub fn constraints(&self) -> &[ConstraintSpec] {
        &self.constraints
    }

    /// Optional value transform
    pub fn transform(&self) -> Option<&TransformSpec> {
        self.transform.as_ref()
    }

    /// Returns whether validation applies to this field for the given object.
    ///
    /// A field without guards is always validated.
    pub fn applies_to(&self, object: &Map<String, Value>) -> bool {
        self.guards.iter().all(|guard| guard(object))
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("constraints", &self.constraints)
            .field("transform", &self.transform.as_ref().map(|t| t.name()))
            .field("guards", &self.guards.len())
            .finish()
    }
}

/// A declared shape.
#[derive(Debug, Clone)]
pub struct SchemaType {
    name: String,
    fields: Vec<FieldSpec>,
    strict: bool,
}

impl SchemaType {
    /// Start declaring a schema
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            strict: false,
        }
    }

    /// Schema name, used in diagnostics only
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Whether unknown keys are rejected
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Looks up a declared field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns whether `key` is a declared field name
    pub fn declares(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Returns every constraint identifier used by this schema and the
    /// schemas it nests, without duplicates, in first-use order.
    pub fn constraint_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        self.collect_constraint_ids(&mut seen, &mut ids);
        ids
    }

    fn collect_constraint_ids<'a>(&'a self, seen: &mut HashSet<&'a str>, ids: &mut Vec<&'a str>) {
        for field in &self.fields {
            for constraint in &field.constraints {
                if seen.insert(constraint.id.as_str()) {
                    ids.push(constraint.id.as_str());
                }
            }
            if let Some(nested) = field.kind.nested_schema() {
                nested.collect_constraint_ids(seen, ids);
            }
        }
    }
}

/// Builder for [`SchemaType`].
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
    strict: bool,
}

impl SchemaBuilder {
    /// Reject unknown keys instead of dropping them
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Declare a scalar field
    pub fn field(self, name: impl Into<String>, declare: impl FnOnce(FieldBuilder) -> FieldBuilder) -> Self {
        self.push(name, FieldKind::Scalar, declare)
    }

    /// Declare a field populated with another schema
    pub fn nested(
        self,
        name: impl Into<String>,
        schema: Arc<SchemaType>,
        declare: impl FnOnce(FieldBuilder) -> FieldBuilder,
    ) -> Self {
        self.push(name, FieldKind::Nested(schema), declare)
    }

    /// Declare an array field whose elements are populated with another schema
    pub fn nested_array(
        self,
        name: impl Into<String>,
        schema: Arc<SchemaType>,
        declare: impl FnOnce(FieldBuilder) -> FieldBuilder,
    ) -> Self {
        self.push(name, FieldKind::NestedArray(schema), declare)
    }

    fn push(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        declare: impl FnOnce(FieldBuilder) -> FieldBuilder,
    ) -> Self {
        let builder = declare(FieldBuilder::new(name.into(), kind));
        self.fields.push(builder.spec);
        self
    }

    /// Finish the declaration.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if a field name is empty or declared twice.
    pub fn build(self) -> SchemaResult<SchemaType> {
        let mut names = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName(self.name));
            }
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    schema: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        Ok(SchemaType {
            name: self.name,
            fields: self.fields,
            strict: self.strict,
        })
    }

    /// Finish the declaration and wrap it for use as a nested reference.
    pub fn build_shared(self) -> SchemaResult<Arc<SchemaType>> {
        self.build().map(Arc::new)
    }
}

/// Builder for one field's constraints and transform.
pub struct FieldBuilder {
    spec: FieldSpec,
}

impl FieldBuilder {
    fn new(name: String, kind: FieldKind) -> Self {
        Self {
            spec: FieldSpec {
                name,
                kind,
                constraints: Vec::new(),
                transform: None,
                guards: Vec::new(),
            },
        }
    }

    /// Attach a constraint with positional parameters
    pub fn constraint(mut self, id: impl Into<String>, params: Value) -> Self {
        self.spec.constraints.push(ConstraintSpec::new(id, params));
        self
    }

    /// Attach a constraint that only applies when `predicate` holds
    /// for the containing object
    pub fn constraint_if<F>(mut self, id: impl Into<String>, params: Value, predicate: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        self.spec
            .constraints
            .push(ConstraintSpec::new(id, params).when(predicate));
        self
    }

    /// Attach a prepared constraint
    pub fn with(mut self, constraint: ConstraintSpec) -> Self {
        self.spec.constraints.push(constraint);
        self
    }

    /// Set the value transform
    pub fn transform(mut self, transform: TransformSpec) -> Self {
        self.spec.transform = Some(transform);
        self
    }

    /// Only validate this field when `predicate` holds for the containing
    /// object. Repeated guards must all hold.
    pub fn validate_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        self.spec.guards.push(Arc::new(predicate));
        self
    }

    /// Shorthand for the `is_defined` constraint
    pub fn required(self) -> Self {
        self.constraint("is_defined", Value::Array(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_schema() -> Arc<SchemaType> {
        SchemaType::builder("User")
            .field("age", |f| f.constraint("min", json!([12])).constraint("max", json!([12])))
            .field("name", |f| f.constraint("contains", json!(["patrick"])))
            .build_shared()
            .unwrap()
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let schema = user_schema();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["age", "name"]);
        assert!(!schema.is_strict());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = SchemaType::builder("User")
            .field("age", |f| f)
            .field("age", |f| f)
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::DuplicateField { ref field, .. }) if field == "age"
        ));
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let result = SchemaType::builder("User").field("", |f| f).build();
        assert!(matches!(result, Err(SchemaError::EmptyFieldName(_))));
    }

    #[test]
    fn test_nested_kind_carries_schema() {
        let user = user_schema();
        let post = SchemaType::builder("Post")
            .strict(true)
            .nested("user", user.clone(), |f| f.required())
            .nested_array("users", user, |f| f)
            .build()
            .unwrap();

        assert!(post.is_strict());
        let kind = post.field("user").unwrap().kind();
        assert_eq!(kind.kind_name(), "nested");
        assert_eq!(kind.nested_schema().unwrap().name(), "User");
        assert_eq!(post.field("users").unwrap().kind().kind_name(), "nested_array");
        assert!(post.field("missing").is_none());
    }

    #[test]
    fn test_constraint_ids_include_nested() {
        let post = SchemaType::builder("Post")
            .nested("user", user_schema(), |f| f.required())
            .field("title", |f| f.constraint("length", json!([5, 20])))
            .build()
            .unwrap();

        assert_eq!(
            post.constraint_ids(),
            vec!["is_defined", "min", "max", "contains", "length"]
        );
    }

    #[test]
    fn test_activation_predicate() {
        let constraint = ConstraintSpec::new("is_email", json!([]))
            .when(|obj| obj.get("email").map_or(false, |v| !v.is_null()));

        let with_email = json!({"email": "a@b.co"});
        let without = json!({"email": null});
        assert!(constraint.is_active(with_email.as_object().unwrap()));
        assert!(!constraint.is_active(without.as_object().unwrap()));
        assert!(ConstraintSpec::new("min", json!([1])).is_active(&Map::new()));
    }

    #[test]
    fn test_guards_must_all_hold() {
        let schema = SchemaType::builder("Post")
            .field("users3", |f| {
                f.validate_if(|o| o.contains_key("users"))
                    .validate_if(|o| o.contains_key("users2"))
            })
            .build()
            .unwrap();
        let field = schema.field("users3").unwrap();

        let both = json!({"users": [], "users2": []});
        let one = json!({"users": []});
        assert!(field.applies_to(both.as_object().unwrap()));
        assert!(!field.applies_to(one.as_object().unwrap()));
    }
}
