//! Decision schemas and the canonical decision-value representation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// A canonicalised decision value, shaped to fit whichever [`DecisionSchema`]
/// it was produced against.
///
/// Agents and callers may hand in loosely-typed values (the wire format is
/// `serde_json::Value` at the edges); [`DecisionSchema::validate`] is the
/// single place a value is accepted into one of these five shapes before it
/// ever reaches the analyser or resolver. Keeping the representation closed
/// here means no dynamic `Any` leaks into the rest of the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecisionValue {
    /// A boolean decision outcome.
    Bool(bool),
    /// A single category, used by non-multi-select categorical schemas.
    Category(String),
    /// An unordered set of categories, used by multi-select categorical schemas.
    CategorySet(Vec<String>),
    /// A bounded real-valued score.
    Scalar(f64),
    /// Free-form text.
    Text(String),
}

impl DecisionValue {
    /// Returns the categories of a [`DecisionValue::Category`] or
    /// [`DecisionValue::CategorySet`] as a sorted, deduplicated set, or `None`
    /// for any other variant.
    fn category_set(&self) -> Option<BTreeSet<&str>> {
        match self {
            Self::Category(c) => Some(BTreeSet::from([c.as_str()])),
            Self::CategorySet(cs) => Some(cs.iter().map(String::as_str).collect()),
            _ => None,
        }
    }
}

/// The shape of a decision an [`crate::AgentRole`] is asked to produce, and the
/// yardstick the alignment analyser and disagreement resolver use to compare
/// agent decisions against each other.
///
/// A schema is constructed once per evaluation task and never mutated; all
/// four variants are validated at construction time so that the analyser and
/// resolver can assume a well-formed schema unconditionally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionSchema {
    /// A yes/no decision.
    Boolean {
        /// Label shown for `true`, e.g. `"approve"`.
        positive_label: String,
        /// Label shown for `false`, e.g. `"reject"`.
        negative_label: String,
    },
    /// A decision drawn from a fixed, closed set of named categories.
    Categorical {
        /// The closed set of valid categories, in display order.
        categories: Vec<String>,
        /// Whether more than one category may be selected at once.
        allow_multiple: bool,
    },
    /// A bounded real-valued score.
    Scalar {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// Unstructured free text, bounded only by optional length limits.
    FreeForm {
        /// Minimum accepted length in characters, if any.
        min_len: Option<usize>,
        /// Maximum accepted length in characters, if any.
        max_len: Option<usize>,
    },
}

impl DecisionSchema {
    /// Construct a boolean schema. Boolean schemas have no invalid
    /// configuration, so this never fails.
    pub fn boolean(
        positive_label: impl Into<String>,
        negative_label: impl Into<String>,
    ) -> Self {
        Self::Boolean {
            positive_label: positive_label.into(),
            negative_label: negative_label.into(),
        }
    }

    /// Construct a categorical schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyCategories`] if `categories` is empty,
    /// [`SchemaError::TooFewCategories`] if it has only one entry,
    /// [`SchemaError::EmptyCategoryLabel`] if any entry is empty or
    /// whitespace-only, and [`SchemaError::DuplicateCategory`] if two entries
    /// are identical.
    pub fn categorical(
        categories: Vec<String>,
        allow_multiple: bool,
    ) -> Result<Self, SchemaError> {
        if categories.is_empty() {
            return Err(SchemaError::EmptyCategories);
        }
        if categories.len() < 2 {
            return Err(SchemaError::TooFewCategories(categories.len()));
        }
        let mut seen = BTreeSet::new();
        for category in &categories {
            if category.trim().is_empty() {
                return Err(SchemaError::EmptyCategoryLabel);
            }
            if !seen.insert(category.as_str()) {
                return Err(SchemaError::DuplicateCategory(category.clone()));
            }
        }
        Ok(Self::Categorical {
            categories,
            allow_multiple,
        })
    }

    /// Construct a scalar schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvertedScalarBounds`] if `max <= min`.
    pub fn scalar(min: f64, max: f64) -> Result<Self, SchemaError> {
        if max <= min {
            return Err(SchemaError::InvertedScalarBounds { min, max });
        }
        Ok(Self::Scalar { min, max })
    }

    /// Construct a free-form schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvertedFreeFormBounds`] if both bounds are set
    /// and `max_len <= min_len`.
    pub fn free_form(
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> Result<Self, SchemaError> {
        if let (Some(min_len), Some(max_len)) = (min_len, max_len) {
            if max_len <= min_len {
                return Err(SchemaError::InvertedFreeFormBounds { min_len, max_len });
            }
        }
        Ok(Self::FreeForm { min_len, max_len })
    }

    /// A short, stable name for this schema's kind: `"boolean"`,
    /// `"categorical"`, `"scalar"`, or `"freeform"`.
    pub const fn schema_type(&self) -> &'static str {
        match self {
            Self::Boolean { .. } => "boolean",
            Self::Categorical { .. } => "categorical",
            Self::Scalar { .. } => "scalar",
            Self::FreeForm { .. } => "freeform",
        }
    }

    /// Returns `true` if `value` is well-formed for this schema.
    pub fn validate(&self, value: &DecisionValue) -> bool {
        match (self, value) {
            (Self::Boolean { .. }, DecisionValue::Bool(_)) => true,
            (
                Self::Categorical {
                    categories,
                    allow_multiple: false,
                },
                DecisionValue::Category(c),
            ) => categories.iter().any(|cat| cat == c),
            (
                Self::Categorical {
                    categories,
                    allow_multiple: true,
                },
                DecisionValue::CategorySet(cs),
            ) => !cs.is_empty() && cs.iter().all(|c| categories.iter().any(|cat| cat == c)),
            (Self::Scalar { min, max }, DecisionValue::Scalar(x)) => {
                (*min..=*max).contains(x)
            }
            (Self::FreeForm { min_len, max_len }, DecisionValue::Text(s)) => {
                let len = s.chars().count();
                min_len.is_none_or(|lo| len >= lo) && max_len.is_none_or(|hi| len <= hi)
            }
            _ => false,
        }
    }

    /// Clamp a raw confidence value into `[0.0, 1.0]`.
    ///
    /// Shared across all schema kinds; confidence normalisation does not
    /// depend on the schema's shape, only on agent-reported confidence being
    /// a probability.
    pub fn normalize_confidence(raw: f64) -> f64 {
        raw.clamp(0.0, 1.0)
    }

    /// Returns `true` if `a` and `b` represent the same decision under this
    /// schema's equality rules.
    ///
    /// For [`Self::Boolean`], exact equality. For [`Self::Categorical`],
    /// set equality (order-independent) when `allow_multiple`, exact string
    /// equality otherwise. For [`Self::FreeForm`], case- and
    /// whitespace-insensitive equality. [`Self::Scalar`] has no notion of
    /// pairwise equality; the analyser instead checks mean-relative
    /// tolerance across the whole set of agent decisions, so this always
    /// returns `false` for scalar schemas.
    pub fn values_equal(&self, a: &DecisionValue, b: &DecisionValue) -> bool {
        match self {
            Self::Boolean { .. } => a == b,
            Self::Categorical { .. } => match (a.category_set(), b.category_set()) {
                (Some(sa), Some(sb)) => sa == sb,
                _ => false,
            },
            Self::FreeForm { .. } => match (a, b) {
                (DecisionValue::Text(x), DecisionValue::Text(y)) => {
                    x.trim().eq_ignore_ascii_case(y.trim())
                }
                _ => false,
            },
            Self::Scalar { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_validates_bool_only() {
        let schema = DecisionSchema::boolean("approve", "reject");
        assert!(schema.validate(&DecisionValue::Bool(true)));
        assert!(!schema.validate(&DecisionValue::Text("approve".into())));
    }

    #[test]
    fn categorical_rejects_empty_and_single() {
        assert_eq!(
            DecisionSchema::categorical(vec![], false).unwrap_err(),
            SchemaError::EmptyCategories
        );
        assert_eq!(
            DecisionSchema::categorical(vec!["only".into()], false).unwrap_err(),
            SchemaError::TooFewCategories(1)
        );
    }

    #[test]
    fn categorical_rejects_duplicates_and_blank_labels() {
        assert!(matches!(
            DecisionSchema::categorical(vec!["a".into(), "a".into()], false),
            Err(SchemaError::DuplicateCategory(_))
        ));
        assert_eq!(
            DecisionSchema::categorical(vec!["a".into(), "  ".into()], false).unwrap_err(),
            SchemaError::EmptyCategoryLabel
        );
    }

    #[test]
    fn categorical_validates_membership() {
        let schema =
            DecisionSchema::categorical(vec!["red".into(), "green".into()], false).unwrap();
        assert!(schema.validate(&DecisionValue::Category("red".into())));
        assert!(!schema.validate(&DecisionValue::Category("blue".into())));
    }

    #[test]
    fn categorical_multi_requires_nonempty_subset() {
        let schema =
            DecisionSchema::categorical(vec!["red".into(), "green".into()], true).unwrap();
        assert!(schema.validate(&DecisionValue::CategorySet(vec!["red".into()])));
        assert!(!schema.validate(&DecisionValue::CategorySet(vec![])));
        assert!(!schema.validate(&DecisionValue::CategorySet(vec!["blue".into()])));
    }

    #[test]
    fn categorical_multi_equality_ignores_order() {
        let schema =
            DecisionSchema::categorical(vec!["a".into(), "b".into(), "c".into()], true).unwrap();
        let x = DecisionValue::CategorySet(vec!["a".into(), "b".into()]);
        let y = DecisionValue::CategorySet(vec!["b".into(), "a".into()]);
        assert!(schema.values_equal(&x, &y));
    }

    #[test]
    fn scalar_rejects_inverted_bounds() {
        assert_eq!(
            DecisionSchema::scalar(1.0, 1.0).unwrap_err(),
            SchemaError::InvertedScalarBounds { min: 1.0, max: 1.0 }
        );
        assert!(DecisionSchema::scalar(0.0, 1.0).is_ok());
    }

    #[test]
    fn scalar_validates_bounds_inclusive() {
        let schema = DecisionSchema::scalar(0.0, 10.0).unwrap();
        assert!(schema.validate(&DecisionValue::Scalar(0.0)));
        assert!(schema.validate(&DecisionValue::Scalar(10.0)));
        assert!(!schema.validate(&DecisionValue::Scalar(10.1)));
    }

    #[test]
    fn scalar_has_no_pairwise_equality() {
        let schema = DecisionSchema::scalar(0.0, 10.0).unwrap();
        let a = DecisionValue::Scalar(5.0);
        let b = DecisionValue::Scalar(5.0);
        assert!(!schema.values_equal(&a, &b));
    }

    #[test]
    fn free_form_rejects_inverted_bounds() {
        assert_eq!(
            DecisionSchema::free_form(Some(10), Some(5)).unwrap_err(),
            SchemaError::InvertedFreeFormBounds {
                min_len: 10,
                max_len: 5
            }
        );
        assert!(DecisionSchema::free_form(None, None).is_ok());
    }

    #[test]
    fn free_form_validates_length() {
        let schema = DecisionSchema::free_form(Some(2), Some(5)).unwrap();
        assert!(schema.validate(&DecisionValue::Text("hey".into())));
        assert!(!schema.validate(&DecisionValue::Text("h".into())));
        assert!(!schema.validate(&DecisionValue::Text("too long".into())));
    }

    #[test]
    fn free_form_equality_is_case_and_whitespace_insensitive() {
        let schema = DecisionSchema::free_form(None, None).unwrap();
        let a = DecisionValue::Text("  Looks Good  ".into());
        let b = DecisionValue::Text("looks good".into());
        assert!(schema.values_equal(&a, &b));
    }

    #[test]
    fn normalize_confidence_clamps() {
        assert_eq!(DecisionSchema::normalize_confidence(-0.5), 0.0);
        assert_eq!(DecisionSchema::normalize_confidence(1.5), 1.0);
        assert_eq!(DecisionSchema::normalize_confidence(0.42), 0.42);
    }

    #[test]
    fn schema_type_names_are_stable() {
        assert_eq!(DecisionSchema::boolean("a", "b").schema_type(), "boolean");
        assert_eq!(
            DecisionSchema::categorical(vec!["a".into(), "b".into()], false)
                .unwrap()
                .schema_type(),
            "categorical"
        );
        assert_eq!(
            DecisionSchema::scalar(0.0, 1.0).unwrap().schema_type(),
            "scalar"
        );
        assert_eq!(
            DecisionSchema::free_form(None, None).unwrap().schema_type(),
            "freeform"
        );
    }
}
