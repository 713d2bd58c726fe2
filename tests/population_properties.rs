//! Property tests for population
//!
//! Random documents against a fixed schema: filtering, strictness,
//! nested-array indexing and idempotence must hold for every input.

use std::sync::Arc;

use proptest::prelude::*;
use schemafill::populate::PopulatorConfig;
use schemafill::{ConstraintRegistry, PathSegment, Populator, SchemaType};
use serde_json::{json, Map, Value};

// =============================================================================
// Schema & Generators
// =============================================================================

const DECLARED: [&str; 3] = ["age", "name", "email"];

fn member_schema(strict: bool) -> Arc<SchemaType> {
    SchemaType::builder("Member")
        .strict(strict)
        .field("age", |f| f.constraint("min", json!([18])).constraint("max", json!([65])))
        .field("name", |f| f.constraint("length", json!([1, 32])))
        .field("email", |f| {
            f.constraint_if("is_email", json!([]), |o| o.get("email").map_or(false, |v| !v.is_null()))
        })
        .build_shared()
        .unwrap()
}

fn team_schema() -> SchemaType {
    SchemaType::builder("Team")
        .nested_array("members", member_schema(false), |f| f.required())
        .build()
        .unwrap()
}

fn valid_member() -> impl Strategy<Value = Value> {
    (18i64..=65, "[a-z]{1,32}", proptest::option::of("[a-z]{1,8}@[a-z]{1,8}\\.com")).prop_map(
        |(age, name, email)| {
            let mut object = Map::new();
            object.insert("age".into(), json!(age));
            object.insert("name".into(), json!(name));
            if let Some(email) = email {
                object.insert("email".into(), json!(email));
            }
            Value::Object(object)
        },
    )
}

fn unknown_key() -> impl Strategy<Value = String> {
    "[a-z_]{1,12}".prop_filter("must not be declared", |k| !DECLARED.contains(&k.as_str()))
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// A valid document comes back unchanged.
    #[test]
    fn prop_valid_document_round_trips(member in valid_member()) {
        let instance = Populator::default()
            .populate_blocking(&member, &member_schema(false))
            .unwrap();
        prop_assert_eq!(Value::Object(instance), member);
    }

    /// Lenient schemas drop unknown keys and keep everything else.
    #[test]
    fn prop_unknown_key_dropped(member in valid_member(), key in unknown_key(), extra in any::<i64>()) {
        let mut input = member.clone();
        input.as_object_mut().unwrap().insert(key.clone(), json!(extra));

        let instance = Populator::default()
            .populate_blocking(&input, &member_schema(false))
            .unwrap();
        prop_assert!(!instance.contains_key(&key));
        prop_assert_eq!(Value::Object(instance), member);
    }

    /// Strict schemas report an unknown key in exactly one entry.
    #[test]
    fn prop_unknown_key_rejected_once(member in valid_member(), key in unknown_key()) {
        let mut input = member;
        input.as_object_mut().unwrap().insert(key.clone(), json!(true));

        let err = Populator::default()
            .populate_blocking(&input, &member_schema(true))
            .unwrap_err();
        let errors = err.validation_errors().unwrap();

        let unknown: Vec<_> = errors.iter().filter(|e| e.property == PathSegment::UnknownKeys).collect();
        prop_assert_eq!(unknown.len(), 1);
        prop_assert_eq!(unknown[0].offending_keys(), Some(vec![key.as_str()]));
        prop_assert_eq!(errors.len(), 1);
    }

    /// The config override forces strictness on a lenient schema.
    #[test]
    fn prop_forbid_unknown_override(member in valid_member(), key in unknown_key()) {
        let mut input = member;
        input.as_object_mut().unwrap().insert(key, json!(null));

        let populator = Populator::with_config(
            Arc::new(ConstraintRegistry::with_builtins()),
            PopulatorConfig::forbid_unknown(),
        );
        let err = populator.populate_blocking(&input, &member_schema(false)).unwrap_err();
        prop_assert_eq!(&err.validation_errors().unwrap()[0].property, &PathSegment::UnknownKeys);
    }

    /// Exactly the out-of-range elements are reported, by index.
    #[test]
    fn prop_nested_array_reports_bad_indexes(ages in proptest::collection::vec(0i64..100, 0..12)) {
        let members: Vec<Value> = ages.iter().map(|age| json!({"age": age, "name": "x"})).collect();
        let input = json!({"members": members});
        let expected: Vec<usize> = ages
            .iter()
            .enumerate()
            .filter(|(_, age)| !(18..=65).contains(*age))
            .map(|(i, _)| i)
            .collect();

        match Populator::default().populate_blocking(&input, &team_schema()) {
            Ok(instance) => {
                prop_assert!(expected.is_empty());
                prop_assert_eq!(instance["members"].as_array().unwrap().len(), ages.len());
            }
            Err(err) => {
                let members = &err.validation_errors().unwrap()[0];
                let reported: Vec<usize> = members.children.iter().filter_map(|c| c.property.as_index()).collect();
                prop_assert_eq!(reported, expected);
            }
        }
    }

    /// Populating an instance again changes nothing.
    #[test]
    fn prop_population_idempotent(members in proptest::collection::vec(valid_member(), 0..6), noise in unknown_key()) {
        let mut input = json!({"members": members});
        input.as_object_mut().unwrap().insert(noise, json!("x"));

        let populator = Populator::default();
        let schema = team_schema();
        let first = populator.populate_blocking(&input, &schema).unwrap();
        let second = populator.populate_blocking(&Value::Object(first.clone()), &schema).unwrap();
        prop_assert_eq!(first, second);
    }
}
