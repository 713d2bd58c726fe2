//! Standard constraint library
//!
//! | id           | params         | passes when                                  |
//! |--------------|----------------|----------------------------------------------|
//! | `is_defined` | none           | value is not null / absent                   |
//! | `min`        | `[n]`          | number >= n                                  |
//! | `max`        | `[n]`          | number <= n                                  |
//! | `contains`   | `[s]`          | string contains s                            |
//! | `length`     | `[min, max?]`  | string length in chars within bounds         |
//! | `is_email`   | none           | string is an email address                   |
//! | `is_fqdn`    | none           | string is a fully qualified domain name      |
//! | `is_datable` | none           | string or epoch millis parses as a date      |
//! | `matches`    | `[pattern]`    | string matches the regular expression        |
//!
//! A value of the wrong JSON type fails every predicate except `is_defined`.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};

use super::registry::ConstraintRegistry;
use crate::transform::parse_date;

pub const IS_DEFINED: &str = "is_defined";
pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const CONTAINS: &str = "contains";
pub const LENGTH: &str = "length";
pub const IS_EMAIL: &str = "is_email";
pub const IS_FQDN: &str = "is_fqdn";
pub const IS_DATABLE: &str = "is_datable";
pub const MATCHES: &str = "matches";

/// Registers every builtin constraint, replacing same-named entries.
pub(crate) fn install(registry: &mut ConstraintRegistry) {
    registry.replace(IS_DEFINED, is_defined, "$property should not be null or undefined");
    registry.replace(MIN, min, "$property must not be less than $constraint1");
    registry.replace(MAX, max, "$property must not be greater than $constraint1");
    registry.replace(CONTAINS, contains, "$property must contain a $constraint1 string");
    registry.replace(
        LENGTH,
        length,
        "$property must be between $constraint1 and $constraint2 characters long",
    );
    registry.replace(IS_EMAIL, is_email, "$property must be an email");
    registry.replace(IS_FQDN, is_fqdn, "$property must be a valid domain name");
    registry.replace(IS_DATABLE, is_datable, "$property must be a valid date");
    registry.replace(MATCHES, matches, "$property must match $constraint1 regular expression");
}

fn param(params: &Value, index: usize) -> Option<&Value> {
    match params {
        Value::Array(args) => args.get(index),
        Value::Null => None,
        scalar if index == 0 => Some(scalar),
        _ => None,
    }
}

fn is_defined(value: &Value, _params: &Value, _object: &Map<String, Value>) -> bool {
    !value.is_null()
}

fn min(value: &Value, params: &Value, _object: &Map<String, Value>) -> bool {
    match (value.as_f64(), param(params, 0).and_then(Value::as_f64)) {
        (Some(n), Some(bound)) => n >= bound,
        _ => false,
    }
}

fn max(value: &Value, params: &Value, _object: &Map<String, Value>) -> bool {
    match (value.as_f64(), param(params, 0).and_then(Value::as_f64)) {
        (Some(n), Some(bound)) => n <= bound,
        _ => false,
    }
}

fn contains(value: &Value, params: &Value, _object: &Map<String, Value>) -> bool {
    match (value.as_str(), param(params, 0).and_then(Value::as_str)) {
        (Some(s), Some(needle)) => s.contains(needle),
        _ => false,
    }
}

fn length(value: &Value, params: &Value, _object: &Map<String, Value>) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    let len = s.chars().count() as u64;
    let lower = param(params, 0).and_then(Value::as_u64).unwrap_or(0);
    let upper = param(params, 1).and_then(Value::as_u64);
    len >= lower && upper.map_or(true, |upper| len <= upper)
}

fn is_email(value: &Value, _params: &Value, _object: &Map<String, Value>) -> bool {
    value.as_str().map_or(false, email_ok)
}

fn is_fqdn(value: &Value, _params: &Value, _object: &Map<String, Value>) -> bool {
    value.as_str().map_or(false, fqdn_ok)
}

fn is_datable(value: &Value, _params: &Value, _object: &Map<String, Value>) -> bool {
    match value {
        Value::String(s) => parse_date(s).is_some(),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis).is_some(),
        _ => false,
    }
}

fn matches(value: &Value, params: &Value, _object: &Map<String, Value>) -> bool {
    let (Some(s), Some(pattern)) = (value.as_str(), param(params, 0).and_then(Value::as_str)) else {
        return false;
    };
    compiled(pattern).map_or(false, |re| re.is_match(s))
}

/// Compiled `matches` patterns, keyed by source. Patterns come from schema
/// declarations, so the cache is bounded by the schemas in use.
fn pattern_cache() -> &'static RwLock<HashMap<String, Regex>> {
    static PATTERNS: OnceLock<RwLock<HashMap<String, Regex>>> = OnceLock::new();
    PATTERNS.get_or_init(|| RwLock::new(HashMap::new()))
}

fn compiled(pattern: &str) -> Option<Regex> {
    let cache = pattern_cache();
    if let Some(re) = cache.read().unwrap_or_else(PoisonError::into_inner).get(pattern) {
        return Some(re.clone());
    }

    match Regex::new(pattern) {
        Ok(re) => {
            cache
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(pattern.to_string(), re.clone());
            Some(re)
        }
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid pattern in matches constraint");
            None
        }
    }
}

fn label_regex() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").expect("static label pattern")
    })
}

fn tld_regex() -> &'static Regex {
    static TLD: OnceLock<Regex> = OnceLock::new();
    TLD.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z]{2,63}|xn--[A-Za-z0-9-]{2,59})$").expect("static tld pattern")
    })
}

fn local_part_regex() -> &'static Regex {
    static LOCAL: OnceLock<Regex> = OnceLock::new();
    LOCAL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
            .expect("static local part pattern")
    })
}

fn fqdn_ok(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    let labels: Vec<&str> = s.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };
    !rest.is_empty() && tld_regex().is_match(tld) && rest.iter().all(|l| label_regex().is_match(l))
}

fn email_ok(s: &str) -> bool {
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };
    local.len() <= 64 && local_part_regex().is_match(local) && fqdn_ok(domain)
}
