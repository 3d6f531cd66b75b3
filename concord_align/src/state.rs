//! Alignment state and the summary produced by the analyser.

use std::collections::BTreeMap;

use concord_schema::Thresholds;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A closed classification of how consistent a set of agent decisions is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentState {
    /// Agents agree on the decision and confidence is consistent.
    FullAlignment,
    /// Minor conflicts: elevated confidence spread or a handful of disagreement areas.
    SoftDisagreement,
    /// Fundamental conflict: disagreement on the decision itself, or many disagreement areas.
    HardDisagreement,
    /// Average confidence is too low to trust the decision either way.
    InsufficientSignal,
}

impl AlignmentState {
    /// The lowercase token used in serialised output, matching
    /// `full_alignment` / `soft_disagreement` / `hard_disagreement` /
    /// `insufficient_signal`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullAlignment => "full_alignment",
            Self::SoftDisagreement => "soft_disagreement",
            Self::HardDisagreement => "hard_disagreement",
            Self::InsufficientSignal => "insufficient_signal",
        }
    }
}

/// A named area in which agent decisions disagreed.
pub const AREA_PRIMARY_DECISION: &str = "primary_decision";
/// See [`AREA_PRIMARY_DECISION`].
pub const AREA_CONFIDENCE_LEVELS: &str = "confidence_levels";
/// See [`AREA_PRIMARY_DECISION`].
pub const AREA_REASONING_APPROACH: &str = "reasoning_approach";
/// See [`AREA_PRIMARY_DECISION`].
pub const AREA_EVIDENCE_QUALITY: &str = "evidence_quality";

/// A stable identifier for the analyser implementation that produced a
/// summary, recorded in its metadata.
pub const ANALYSIS_VERSION: &str = "concord-align-1";

/// The result of analysing a set of agent decisions for one evaluation task.
///
/// Field order matches the wire shape that external consumers must see:
/// `state, alignment_score, decision_agreement, confidence_spread,
/// confidence_distribution, avg_confidence, dissenting_agents,
/// disagreement_areas, consensus_strength, resolution_rationale, metadata`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    /// The determined alignment state.
    pub state: AlignmentState,
    /// Overall alignment score in `[0, 1]`.
    pub alignment_score: f64,
    /// Whether agents agreed on the primary decision.
    pub decision_agreement: bool,
    /// `max(confidence) - min(confidence)` across agents.
    pub confidence_spread: f64,
    /// Each agent's raw confidence, keyed by agent name.
    pub confidence_distribution: BTreeMap<String, f64>,
    /// The mean confidence across agents.
    pub avg_confidence: f64,
    /// Names of agents whose decision differs from the majority.
    pub dissenting_agents: Vec<String>,
    /// Areas of disagreement detected, in the fixed check order.
    pub disagreement_areas: Vec<String>,
    /// `alignment_score * avg_confidence`.
    pub consensus_strength: f64,
    /// A deterministic, human-readable explanation of `state`.
    pub resolution_rationale: String,
    /// Thresholds snapshot, agent count, schema tag, and analyser version.
    pub metadata: BTreeMap<String, Value>,
}

pub(crate) fn metadata_snapshot(
    thresholds: &Thresholds,
    agent_count: usize,
    schema_type: &str,
) -> BTreeMap<String, Value> {
    let mut metadata = BTreeMap::new();
    metadata.insert(
        "thresholds".to_string(),
        serde_json::to_value(thresholds).unwrap_or(Value::Null),
    );
    metadata.insert("agent_count".to_string(), Value::from(agent_count));
    metadata.insert("schema_type".to_string(), Value::from(schema_type));
    metadata.insert("analysis_version".to_string(), Value::from(ANALYSIS_VERSION));
    metadata
}
