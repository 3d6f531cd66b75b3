//! Alignment thresholds: the tunable numeric knobs the analyser compares
//! confidence metrics against.

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

fn require_unit_range(field: &'static str, value: f64) -> Result<f64, FieldError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(FieldError::OutOfRange {
            field,
            value,
            lo: 0.0,
            hi: 1.0,
        })
    }
}

/// Validated, immutable thresholds used by the alignment analyser.
///
/// Every field lies in `[0, 1]` except `scalar_decision_tolerance_ratio`,
/// which lies in `(0, 1]` since a zero tolerance would make scalar agreement
/// require bit-for-bit equality.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    soft_disagreement_confidence_spread: f64,
    hard_disagreement_confidence_spread: f64,
    insufficient_signal_avg_confidence: f64,
    min_confidence_for_consensus: f64,
    scalar_decision_tolerance_ratio: f64,
    reasoning_overlap_threshold: f64,
    evidence_consistency_threshold: f64,
}

impl Thresholds {
    /// Construct thresholds from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::OutOfRange`] for the first field found outside
    /// its valid range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        soft_disagreement_confidence_spread: f64,
        hard_disagreement_confidence_spread: f64,
        insufficient_signal_avg_confidence: f64,
        min_confidence_for_consensus: f64,
        scalar_decision_tolerance_ratio: f64,
        reasoning_overlap_threshold: f64,
        evidence_consistency_threshold: f64,
    ) -> Result<Self, FieldError> {
        if !(0.0..=1.0).contains(&scalar_decision_tolerance_ratio)
            || scalar_decision_tolerance_ratio == 0.0
        {
            return Err(FieldError::OutOfRange {
                field: "scalar_decision_tolerance_ratio",
                value: scalar_decision_tolerance_ratio,
                lo: f64::EPSILON,
                hi: 1.0,
            });
        }
        Ok(Self {
            soft_disagreement_confidence_spread: require_unit_range(
                "soft_disagreement_confidence_spread",
                soft_disagreement_confidence_spread,
            )?,
            hard_disagreement_confidence_spread: require_unit_range(
                "hard_disagreement_confidence_spread",
                hard_disagreement_confidence_spread,
            )?,
            insufficient_signal_avg_confidence: require_unit_range(
                "insufficient_signal_avg_confidence",
                insufficient_signal_avg_confidence,
            )?,
            min_confidence_for_consensus: require_unit_range(
                "min_confidence_for_consensus",
                min_confidence_for_consensus,
            )?,
            scalar_decision_tolerance_ratio,
            reasoning_overlap_threshold: require_unit_range(
                "reasoning_overlap_threshold",
                reasoning_overlap_threshold,
            )?,
            evidence_consistency_threshold: require_unit_range(
                "evidence_consistency_threshold",
                evidence_consistency_threshold,
            )?,
        })
    }

    /// Spread above which agent confidences are flagged as a soft disagreement.
    pub const fn soft_disagreement_confidence_spread(&self) -> f64 {
        self.soft_disagreement_confidence_spread
    }

    /// Spread above which agent confidences are flagged as a hard disagreement.
    pub const fn hard_disagreement_confidence_spread(&self) -> f64 {
        self.hard_disagreement_confidence_spread
    }

    /// Average confidence below which signal is considered insufficient.
    pub const fn insufficient_signal_avg_confidence(&self) -> f64 {
        self.insufficient_signal_avg_confidence
    }

    /// Minimum average confidence considered a strong consensus.
    pub const fn min_confidence_for_consensus(&self) -> f64 {
        self.min_confidence_for_consensus
    }

    /// Fraction of the mean that scalar decisions may deviate by and still agree.
    pub const fn scalar_decision_tolerance_ratio(&self) -> f64 {
        self.scalar_decision_tolerance_ratio
    }

    /// Minimum rationale keyword-overlap ratio below which reasoning diverges.
    pub const fn reasoning_overlap_threshold(&self) -> f64 {
        self.reasoning_overlap_threshold
    }

    /// Minimum evidence-length consistency below which evidence quality diverges.
    pub const fn evidence_consistency_threshold(&self) -> f64 {
        self.evidence_consistency_threshold
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            soft_disagreement_confidence_spread: 0.2,
            hard_disagreement_confidence_spread: 0.4,
            insufficient_signal_avg_confidence: 0.5,
            min_confidence_for_consensus: 0.7,
            scalar_decision_tolerance_ratio: 0.1,
            reasoning_overlap_threshold: 0.3,
            evidence_consistency_threshold: 0.5,
        }
    }
}

#[cfg(feature = "config-file")]
impl Thresholds {
    /// Parse thresholds from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed, or if the parsed
    /// values fail the same validation as [`Thresholds::new`].
    pub fn from_toml_str(s: &str) -> Result<Self, ThresholdsConfigError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "snake_case")]
        struct Raw {
            #[serde(default = "defaults::soft")]
            soft_disagreement_confidence_spread: f64,
            #[serde(default = "defaults::hard")]
            hard_disagreement_confidence_spread: f64,
            #[serde(default = "defaults::insufficient")]
            insufficient_signal_avg_confidence: f64,
            #[serde(default = "defaults::consensus")]
            min_confidence_for_consensus: f64,
            #[serde(default = "defaults::tolerance")]
            scalar_decision_tolerance_ratio: f64,
            #[serde(default = "defaults::overlap")]
            reasoning_overlap_threshold: f64,
            #[serde(default = "defaults::evidence")]
            evidence_consistency_threshold: f64,
        }

        mod defaults {
            pub const fn soft() -> f64 {
                0.2
            }
            pub const fn hard() -> f64 {
                0.4
            }
            pub const fn insufficient() -> f64 {
                0.5
            }
            pub const fn consensus() -> f64 {
                0.7
            }
            pub const fn tolerance() -> f64 {
                0.1
            }
            pub const fn overlap() -> f64 {
                0.3
            }
            pub const fn evidence() -> f64 {
                0.5
            }
        }

        let raw: Raw = toml::from_str(s)?;
        let thresholds = Self::new(
            raw.soft_disagreement_confidence_spread,
            raw.hard_disagreement_confidence_spread,
            raw.insufficient_signal_avg_confidence,
            raw.min_confidence_for_consensus,
            raw.scalar_decision_tolerance_ratio,
            raw.reasoning_overlap_threshold,
            raw.evidence_consistency_threshold,
        )?;
        Ok(thresholds)
    }
}

/// Error parsing or validating a [`Thresholds`] TOML document.
#[cfg(feature = "config-file")]
#[derive(Debug, thiserror::Error)]
pub enum ThresholdsConfigError {
    /// The document could not be parsed as TOML.
    #[error("invalid thresholds TOML: {0}")]
    Toml(#[from] toml::de::Error),
    /// A parsed field failed validation.
    #[error("invalid threshold value: {0}")]
    Field(#[from] FieldError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let t = Thresholds::default();
        assert_eq!(t.soft_disagreement_confidence_spread(), 0.2);
        assert_eq!(t.hard_disagreement_confidence_spread(), 0.4);
        assert_eq!(t.insufficient_signal_avg_confidence(), 0.5);
        assert_eq!(t.min_confidence_for_consensus(), 0.7);
        assert_eq!(t.scalar_decision_tolerance_ratio(), 0.1);
        assert_eq!(t.reasoning_overlap_threshold(), 0.3);
        assert_eq!(t.evidence_consistency_threshold(), 0.5);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(Thresholds::new(1.1, 0.4, 0.5, 0.7, 0.1, 0.3, 0.5).is_err());
        assert!(Thresholds::new(0.2, 0.4, 0.5, 0.7, -0.1, 0.3, 0.5).is_err());
    }

    #[test]
    fn rejects_zero_tolerance_ratio() {
        assert!(Thresholds::new(0.2, 0.4, 0.5, 0.7, 0.0, 0.3, 0.5).is_err());
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn parses_partial_toml_with_defaults() {
        let t = Thresholds::from_toml_str("min_confidence_for_consensus = 0.8\n").unwrap();
        assert_eq!(t.min_confidence_for_consensus(), 0.8);
        assert_eq!(t.soft_disagreement_confidence_spread(), 0.2);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn rejects_invalid_toml_value() {
        assert!(Thresholds::from_toml_str("reasoning_overlap_threshold = 5.0\n").is_err());
    }
}
