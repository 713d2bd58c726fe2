//! Value transforms
//!
//! A transform turns a field's raw value into the value stored on the
//! instance and seen by its constraints. It runs once per present, non-null
//! field, before any constraint. A failing transform never aborts
//! population: the engine reports it as a violation on the field, keyed by
//! the transform's name, and keeps the raw value.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use thiserror::Error;

/// A transform could not coerce its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct TransformError {
    reason: String,
}

impl TransformError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why the value was rejected
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A value coercion applied before validation.
pub trait Transform: Send + Sync {
    fn apply(&self, value: Value) -> BoxFuture<'_, Result<Value, TransformError>>;
}

impl<F> Transform for F
where
    F: Fn(Value) -> Result<Value, TransformError> + Send + Sync,
{
    fn apply(&self, value: Value) -> BoxFuture<'_, Result<Value, TransformError>> {
        future::ready(self(value)).boxed()
    }
}

struct AsyncTransform<F> {
    func: F,
}

impl<F, Fut> Transform for AsyncTransform<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, TransformError>> + Send + 'static,
{
    fn apply(&self, value: Value) -> BoxFuture<'_, Result<Value, TransformError>> {
        (self.func)(value).boxed()
    }
}

/// A named transform attached to a field.
#[derive(Clone)]
pub struct TransformSpec {
    name: String,
    func: Arc<dyn Transform>,
}

impl TransformSpec {
    /// Wrap a synchronous transform
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Wrap a transform that suspends
    pub fn from_async<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, TransformError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(AsyncTransform { func }),
        }
    }

    /// Name used as the violation key when the transform fails
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the transform once
    pub async fn apply(&self, value: Value) -> Result<Value, TransformError> {
        self.func.apply(value).await
    }
}

impl fmt::Debug for TransformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformSpec").field("name", &self.name).finish()
    }
}

/// Name of the [`to_date`] transform
pub const TO_DATE: &str = "to_date";

/// Coerces a date-like value into a canonical UTC RFC 3339 string.
///
/// Accepts RFC 3339 strings, naive date-times (taken as UTC), plain
/// `YYYY-MM-DD` dates and integer epoch milliseconds. The output has
/// millisecond precision and a `Z` suffix, so it deserializes into
/// `chrono::DateTime<Utc>`.
pub fn to_date() -> TransformSpec {
    TransformSpec::new(TO_DATE, |value: Value| {
        let parsed = match &value {
            Value::String(s) => parse_date(s),
            Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
            _ => None,
        };
        parsed
            .map(|date| Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)))
            .ok_or_else(|| TransformError::new("could not be converted to a date"))
    })
}

/// Parses the date formats accepted by [`to_date`].
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
