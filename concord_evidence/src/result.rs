//! The evaluation result produced by the orchestrator: an alignment summary
//! plus the synthesised decision and bookkeeping fields.

use std::collections::BTreeMap;

use concord_align::AlignmentSummary;
use concord_kernel::Uniquifier;
use concord_schema::{AgentDecision, DecisionValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The outcome of one call to the orchestrator: everything an
/// [`AlignmentSummary`] carries, plus the decision the resolver synthesised
/// and the bookkeeping needed to escalate to a human reviewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// The task this result is for.
    pub task_id: String,
    /// The alignment analysis this result was synthesised from.
    #[serde(flatten)]
    pub alignment_summary: AlignmentSummary,
    /// The decision the resolver synthesised from all agent decisions.
    pub synthesized_decision: DecisionValue,
    /// Confidence in the synthesised decision, in `[0, 1]`.
    pub confidence: f64,
    /// The resolver's explanation of how it reached `synthesized_decision`.
    pub reasoning: String,
    /// Supporting evidence for the synthesised decision, capped at 5 entries.
    pub evidence: Vec<String>,
    /// Every agent decision that went into this result, in registered-agent order.
    pub agent_decisions: Vec<AgentDecision>,
    /// Whether this result should be escalated to a human reviewer.
    pub requires_human_review: bool,
    /// Why human review is required, if it is.
    pub review_reason: Option<String>,
    /// A fresh identifier for this evaluation.
    pub request_id: Uniquifier,
    /// Wall-clock time the whole evaluation took.
    pub processing_time_ms: u64,
    /// Opaque metadata carried alongside the result.
    pub metadata: BTreeMap<String, Value>,
}
