//! Constraint registry
//!
//! Maps a constraint identifier to its predicate and message template. The
//! registry is filled before population starts and is only read afterwards,
//! so it is shared through `Arc` without locking.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::{Map, Value};

use super::builtins;
use super::errors::{ConstraintError, ConstraintResult};

/// A predicate a field value must satisfy.
///
/// `value` is `Value::Null` when the field is absent. `object` is the
/// containing object after filtering and transforms.
pub trait Constraint: Send + Sync {
    fn check<'a>(
        &'a self,
        value: &'a Value,
        params: &'a Value,
        object: &'a Map<String, Value>,
    ) -> BoxFuture<'a, bool>;
}

impl<F> Constraint for F
where
    F: Fn(&Value, &Value, &Map<String, Value>) -> bool + Send + Sync,
{
    fn check<'a>(
        &'a self,
        value: &'a Value,
        params: &'a Value,
        object: &'a Map<String, Value>,
    ) -> BoxFuture<'a, bool> {
        future::ready(self(value, params, object)).boxed()
    }
}

/// Adapter for predicates that suspend.
///
/// The closure receives owned copies so the returned future can outlive the
/// borrowed field data.
pub struct AsyncConstraint<F> {
    func: F,
}

impl<F, Fut> AsyncConstraint<F>
where
    F: Fn(Value, Value, Map<String, Value>) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send + 'static,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> Constraint for AsyncConstraint<F>
where
    F: Fn(Value, Value, Map<String, Value>) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send + 'static,
{
    fn check<'a>(
        &'a self,
        value: &'a Value,
        params: &'a Value,
        object: &'a Map<String, Value>,
    ) -> BoxFuture<'a, bool> {
        (self.func)(value.clone(), params.clone(), object.clone()).boxed()
    }
}

/// A registered predicate with its message template.
#[derive(Clone)]
pub struct RegisteredConstraint {
    predicate: Arc<dyn Constraint>,
    message: String,
}

impl RegisteredConstraint {
    /// The predicate
    pub fn predicate(&self) -> &dyn Constraint {
        self.predicate.as_ref()
    }

    /// The unrendered message template
    pub fn message_template(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for RegisteredConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredConstraint")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Registry of constraints by identifier
#[derive(Debug, Default, Clone)]
pub struct ConstraintRegistry {
    entries: HashMap<String, RegisteredConstraint>,
}

impl ConstraintRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the standard constraint library
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::install(&mut registry);
        registry
    }

    /// Register a constraint.
    ///
    /// # Errors
    ///
    /// Returns `ConstraintError::AlreadyRegistered` if `id` is taken.
    pub fn register<C>(
        &mut self,
        id: impl Into<String>,
        predicate: C,
        message: impl Into<String>,
    ) -> ConstraintResult<()>
    where
        C: Constraint + 'static,
    {
        let id = id.into();
        if id.is_empty() {
            return Err(ConstraintError::EmptyId);
        }
        if self.entries.contains_key(&id) {
            return Err(ConstraintError::AlreadyRegistered(id));
        }
        self.insert(id, predicate, message);
        Ok(())
    }

    /// Register a constraint, replacing any previous entry for `id`.
    pub fn replace<C>(&mut self, id: impl Into<String>, predicate: C, message: impl Into<String>)
    where
        C: Constraint + 'static,
    {
        self.insert(id.into(), predicate, message);
    }

    fn insert<C>(&mut self, id: String, predicate: C, message: impl Into<String>)
    where
        C: Constraint + 'static,
    {
        self.entries.insert(
            id,
            RegisteredConstraint {
                predicate: Arc::new(predicate),
                message: message.into(),
            },
        );
    }

    /// Look up a constraint by identifier
    pub fn lookup(&self, id: &str) -> Option<&RegisteredConstraint> {
        self.entries.get(id)
    }

    /// Checks if a constraint is registered
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the number of registered constraints
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
