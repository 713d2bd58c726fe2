//! Populator configuration

use crate::schema::SchemaType;

/// How sibling work at one tree level is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldConcurrency {
    /// Sibling fields and array elements are awaited together
    #[default]
    Concurrent,
    /// Sibling fields and array elements are awaited one after another
    Sequential,
}

/// Configuration for a [`Populator`](super::Populator).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulatorConfig {
    /// Scheduling of sibling fields
    pub concurrency: FieldConcurrency,
    /// Overrides every schema's strict flag when set
    pub strict_override: Option<bool>,
}

impl PopulatorConfig {
    /// Config evaluating one field at a time.
    pub fn sequential() -> Self {
        Self {
            concurrency: FieldConcurrency::Sequential,
            ..Self::default()
        }
    }

    /// Config rejecting unknown keys at every level.
    pub fn forbid_unknown() -> Self {
        Self {
            strict_override: Some(true),
            ..Self::default()
        }
    }

    /// Config silently dropping unknown keys at every level.
    pub fn strip_unknown() -> Self {
        Self {
            strict_override: Some(false),
            ..Self::default()
        }
    }

    /// Effective strict flag for a schema.
    pub fn is_strict(&self, schema: &SchemaType) -> bool {
        self.strict_override.unwrap_or_else(|| schema.is_strict())
    }
}
