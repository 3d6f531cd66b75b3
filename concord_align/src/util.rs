//! Shared arithmetic and canonicalisation helpers used by the analyser and
//! resolver.

use concord_schema::DecisionValue;

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (Bessel's correction), matching Python's
/// `statistics.stdev`. Returns 0.0 for fewer than two samples.
pub(crate) fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// A canonical string key for a decision value, used for frequency-based
/// grouping (dissenting-agent detection, the `primary_decision` disagreement
/// check, and categorical vote tallying). This is a textual key only; schema-
/// aware equality (e.g. scalar tolerance) lives in
/// [`concord_schema::DecisionSchema::values_equal`] and in
/// [`crate::analyser::decisions_agree`].
pub(crate) fn decision_key(value: &DecisionValue) -> String {
    match value {
        DecisionValue::Bool(b) => b.to_string(),
        DecisionValue::Category(c) => c.clone(),
        DecisionValue::CategorySet(cs) => {
            let mut sorted = cs.clone();
            sorted.sort();
            sorted.join(",")
        }
        DecisionValue::Scalar(x) => x.to_string(),
        DecisionValue::Text(t) => t.clone(),
    }
}

/// Lowercased tokens of length > 3, split on whitespace, as a sorted set
/// with duplicates removed.
pub(crate) fn reasoning_keywords(rationale: &str) -> std::collections::BTreeSet<String> {
    rationale
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| w.len() > 3)
        .collect()
}
