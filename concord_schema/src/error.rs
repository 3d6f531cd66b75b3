//! Validation error types for schema construction and input field checks.

use thiserror::Error;

/// Errors raised when constructing a [`crate::DecisionSchema`] violates its
/// structural rules.
///
/// Corresponds to spec's `InvalidSchema` error kind: reported only at
/// construction time, never surfaced from the analyser, resolver, or
/// orchestrator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A categorical schema was constructed with no categories.
    #[error("categorical schema requires at least one category")]
    EmptyCategories,
    /// A categorical schema was constructed with fewer than two categories.
    #[error("categorical schema requires at least two categories, got {0}")]
    TooFewCategories(usize),
    /// Two categories in a categorical schema were identical.
    #[error("categories must be unique; \"{0}\" appears more than once")]
    DuplicateCategory(String),
    /// A category label was empty or whitespace-only.
    #[error("category labels must not be empty or whitespace-only")]
    EmptyCategoryLabel,
    /// A scalar schema's bounds were inverted (`max <= min`).
    #[error("scalar schema requires max > min (got min={min}, max={max})")]
    InvertedScalarBounds {
        /// The configured minimum.
        min: f64,
        /// The configured maximum.
        max: f64,
    },
    /// A free-form schema's length bounds were inverted (`max_len <= min_len`).
    #[error("free-form schema requires max_len > min_len (got min_len={min_len}, max_len={max_len})")]
    InvertedFreeFormBounds {
        /// The configured minimum length.
        min_len: usize,
        /// The configured maximum length.
        max_len: usize,
    },
}

/// Errors raised when a plain input field (task, role, decision, thresholds)
/// fails a required-field or range check.
///
/// Corresponds to spec's `InvalidTask` error kind for task/agent/decision
/// inputs, and to the structural validation on [`crate::Thresholds`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FieldError {
    /// A required string field was empty or whitespace-only.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A numeric field fell outside its valid range.
    #[error("{field} value {value} is out of range [{lo}, {hi}]")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The invalid value.
        value: f64,
        /// Lower bound of the valid range (inclusive).
        lo: f64,
        /// Upper bound of the valid range (inclusive).
        hi: f64,
    },
    /// A name field contained characters outside `[A-Za-z0-9_-]`.
    #[error("name \"{0}\" may only contain alphanumeric characters, underscores, and hyphens")]
    InvalidName(String),
}
