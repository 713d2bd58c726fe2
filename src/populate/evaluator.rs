//! Constraint evaluator
//!
//! Runs every active constraint of one field. Constraints never
//! short-circuit each other: a field reports all of its failures.

use futures_util::future::join_all;
use serde_json::{Map, Value};

use crate::constraints::{message, ConstraintRegistry};
use crate::schema::FieldSpec;
use crate::validation::Violation;

/// Evaluates `field`'s constraints against `value`.
///
/// `value` is `Value::Null` for absent fields. Results keep declaration
/// order.
pub async fn evaluate(
    registry: &ConstraintRegistry,
    field: &FieldSpec,
    value: &Value,
    object: &Map<String, Value>,
) -> Vec<Violation> {
    let checks = field
        .constraints()
        .iter()
        .filter(|constraint| constraint.is_active(object))
        .filter_map(|constraint| {
            // Identifiers are checked against the registry before population starts.
            let Some(entry) = registry.lookup(&constraint.id) else {
                tracing::warn!(
                    field = field.name(),
                    constraint = %constraint.id,
                    "skipping unregistered constraint"
                );
                return None;
            };
            Some(async move {
                let passed = entry
                    .predicate()
                    .check(value, &constraint.params, object)
                    .await;
                (!passed).then(|| {
                    Violation::new(
                        constraint.id.clone(),
                        message::render(
                            entry.message_template(),
                            field.name(),
                            value,
                            &constraint.params,
                        ),
                    )
                })
            })
        });

    join_all(checks).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaType;
    use serde_json::json;

    fn post() -> SchemaType {
        SchemaType::builder("Post")
            .field("text", |f| {
                f.constraint("contains", json!(["hello"]))
                    .constraint("length", json!([10, 200]))
            })
            .field("email", |f| {
                f.constraint_if("is_email", json!([]), |o| {
                    o.get("email").map_or(false, |v| !v.is_null())
                })
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_reports_every_failure() {
        let registry = ConstraintRegistry::with_builtins();
        let schema = post();
        let field = schema.field("text").unwrap();

        let violations = evaluate(&registry, field, &json!("bye"), &Map::new()).await;
        let ids: Vec<_> = violations.iter().map(|v| v.constraint.as_str()).collect();
        assert_eq!(ids, vec!["contains", "length"]);
        assert_eq!(violations[0].message, "text must contain a hello string");
    }

    #[tokio::test]
    async fn test_passing_value_reports_nothing() {
        let registry = ConstraintRegistry::with_builtins();
        let schema = post();
        let field = schema.field("text").unwrap();

        let violations = evaluate(&registry, field, &json!("hello this blabla"), &Map::new()).await;
        assert!(violations.is_empty());
    }

    #[tokio::test]
    async fn test_inactive_constraint_skipped() {
        let registry = ConstraintRegistry::with_builtins();
        let schema = post();
        let field = schema.field("email").unwrap();

        let object = json!({"email": null});
        let violations = evaluate(&registry, field, &Value::Null, object.as_object().unwrap()).await;
        assert!(violations.is_empty());

        let object = json!({"email": "nope"});
        let violations = evaluate(&registry, field, &json!("nope"), object.as_object().unwrap()).await;
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, "is_email");
    }
}
