//! The HITL escalation builder (C6): turns an [`EvaluationResult`] that
//! requires human review into a structured, serialisable [`HITLRequest`].

use std::collections::{BTreeMap, BTreeSet};

use concord_align::{AlignmentState, AlignmentSummary};
use concord_kernel::Uniquifier;
use concord_schema::{AgentDecision, EventSink};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::result::EvaluationResult;

/// The reason an [`EvaluationResult`] was escalated to a human reviewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HITLEscalationReason {
    /// Agents fundamentally disagreed on the decision.
    HardDisagreement,
    /// Average agent confidence was too low to trust automatically.
    LowConfidence,
    /// Agents' supporting evidence was inconsistent in quality or quantity.
    InconsistentEvidence,
    /// Escalated by a rule outside the four alignment states above.
    CustomRule,
}

/// A structured request for human review of an evaluation.
///
/// Field order matches the wire shape external consumers must see:
/// `request_id, task_id, alignment_state, alignment_score,
/// escalation_reason, summary, agent_decisions, dissenting_agents,
/// created_at, metadata`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HITLRequest {
    /// `"hitl-{task_id}-{8-hex uniquifier}"`.
    pub request_id: String,
    /// The task this escalation is for.
    pub task_id: String,
    /// The alignment state that triggered escalation.
    pub alignment_state: AlignmentState,
    /// The alignment score at the time of escalation.
    pub alignment_score: f64,
    /// Why this request was escalated.
    pub escalation_reason: HITLEscalationReason,
    /// A short, deterministic explanation for the reviewer.
    pub summary: String,
    /// Every agent decision that went into the evaluation.
    pub agent_decisions: Vec<AgentDecision>,
    /// Names of agents whose decisions dissented from the majority.
    pub dissenting_agents: Vec<String>,
    /// ISO-8601 UTC timestamp with seconds precision.
    pub created_at: String,
    /// Confidence spread, average confidence, areas, consensus strength,
    /// rationale, agent count, processing time, and originating evaluation id.
    pub metadata: BTreeMap<String, Value>,
}

/// Build a [`HITLRequest`] from an evaluation result, if it requires human
/// review.
///
/// Pure given its inputs: `uniquifier` and `created_at` are supplied by the
/// caller rather than sourced internally, so this function never touches a
/// clock or an RNG itself.
///
/// Returns `None` and emits `hitl_escalation_not_required` if
/// `result.requires_human_review` is `false`. Otherwise determines the
/// escalation reason from `summary.state`, renders a fixed-template summary,
/// and emits `hitl_escalation_triggered`.
pub fn build_hitl_request(
    result: &EvaluationResult,
    summary: &AlignmentSummary,
    uniquifier: Uniquifier,
    created_at: OffsetDateTime,
    sink: Option<&dyn EventSink>,
) -> Option<HITLRequest> {
    if !result.requires_human_review {
        concord_schema::emit(
            sink,
            "hitl_escalation_not_required",
            BTreeMap::from([
                ("task_id".to_string(), Value::from(result.task_id.clone())),
                (
                    "alignment_state".to_string(),
                    Value::from(summary.state.as_str()),
                ),
                (
                    "requires_human_review".to_string(),
                    Value::from(result.requires_human_review),
                ),
            ]),
        );
        return None;
    }

    let escalation_reason = determine_escalation_reason(summary);
    let request_summary = escalation_summary(summary, escalation_reason);
    let request_id = format!("hitl-{}-{uniquifier}", result.task_id);
    let created_at = format_iso8601_seconds(created_at);

    let mut metadata = BTreeMap::new();
    metadata.insert(
        "confidence_spread".to_string(),
        Value::from(summary.confidence_spread),
    );
    metadata.insert(
        "avg_confidence".to_string(),
        Value::from(summary.avg_confidence),
    );
    metadata.insert(
        "disagreement_areas".to_string(),
        Value::from(summary.disagreement_areas.clone()),
    );
    metadata.insert(
        "consensus_strength".to_string(),
        Value::from(summary.consensus_strength),
    );
    metadata.insert(
        "resolution_rationale".to_string(),
        Value::from(summary.resolution_rationale.clone()),
    );
    metadata.insert(
        "agent_count".to_string(),
        Value::from(result.agent_decisions.len()),
    );
    metadata.insert(
        "processing_time_ms".to_string(),
        Value::from(result.processing_time_ms),
    );
    metadata.insert(
        "evaluation_request_id".to_string(),
        Value::from(result.request_id.to_string()),
    );

    let request = HITLRequest {
        request_id: request_id.clone(),
        task_id: result.task_id.clone(),
        alignment_state: summary.state,
        alignment_score: summary.alignment_score,
        escalation_reason,
        summary: request_summary,
        agent_decisions: result.agent_decisions.clone(),
        dissenting_agents: summary.dissenting_agents.clone(),
        created_at,
        metadata,
    };

    concord_schema::emit(
        sink,
        "hitl_escalation_triggered",
        BTreeMap::from([
            ("request_id".to_string(), Value::from(request_id)),
            ("task_id".to_string(), Value::from(result.task_id.clone())),
            (
                "alignment_state".to_string(),
                Value::from(summary.state.as_str()),
            ),
            (
                "alignment_score".to_string(),
                Value::from(summary.alignment_score),
            ),
        ]),
    );

    Some(request)
}

fn determine_escalation_reason(summary: &AlignmentSummary) -> HITLEscalationReason {
    match summary.state {
        AlignmentState::HardDisagreement => HITLEscalationReason::HardDisagreement,
        AlignmentState::InsufficientSignal => HITLEscalationReason::LowConfidence,
        AlignmentState::SoftDisagreement => {
            if summary
                .disagreement_areas
                .iter()
                .any(|a| a == concord_align::AREA_EVIDENCE_QUALITY)
            {
                HITLEscalationReason::InconsistentEvidence
            } else {
                HITLEscalationReason::LowConfidence
            }
        }
        AlignmentState::FullAlignment => HITLEscalationReason::CustomRule,
    }
}

fn escalation_summary(summary: &AlignmentSummary, reason: HITLEscalationReason) -> String {
    match reason {
        HITLEscalationReason::HardDisagreement => format!(
            "Agents disagree on the primary decision (alignment score {:.2}); {} agent(s) dissent: {}.",
            summary.alignment_score,
            summary.dissenting_agents.len(),
            summary.dissenting_agents.join(", ")
        ),
        HITLEscalationReason::LowConfidence => format!(
            "Average agent confidence ({:.2}) is too low for automated resolution.",
            summary.avg_confidence
        ),
        HITLEscalationReason::InconsistentEvidence => {
            "Agents provided inconsistent supporting evidence (consistency below threshold)."
                .to_string()
        }
        HITLEscalationReason::CustomRule => format!(
            "Escalation triggered by evaluation policy (alignment score {:.2}).",
            summary.alignment_score
        ),
    }
}

fn format_iso8601_seconds(ts: OffsetDateTime) -> String {
    let ts = ts.replace_nanosecond(0).unwrap_or(ts);
    ts.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// Check that a [`HITLRequest`] is internally consistent.
///
/// A request is valid iff `alignment_score` lies in `[0, 1]`,
/// `agent_decisions` is non-empty, and every dissenting agent name appears
/// among `agent_decisions`.
pub fn validate_hitl_request(request: &HITLRequest) -> bool {
    if !(0.0..=1.0).contains(&request.alignment_score) {
        return false;
    }
    if request.agent_decisions.is_empty() {
        return false;
    }
    let known_agents: BTreeSet<&str> = request
        .agent_decisions
        .iter()
        .map(AgentDecision::agent_name)
        .collect();
    request
        .dissenting_agents
        .iter()
        .all(|name| known_agents.contains(name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_align::analyse;
    use concord_schema::{DecisionSchema, DecisionValue, EvaluationTask, Thresholds};
    use std::collections::BTreeMap as Map;

    fn decision(name: &str, value: DecisionValue, confidence: f64) -> AgentDecision {
        AgentDecision::new(name, "critic", value, confidence, "rationale here", vec![]).unwrap()
    }

    fn hard_disagreement_result() -> (EvaluationResult, AlignmentSummary) {
        let task = EvaluationTask::new(
            "task-1",
            "review",
            DecisionSchema::boolean("approve", "reject"),
            Map::new(),
            "be thorough",
        )
        .unwrap();
        let decisions = vec![
            decision("a", DecisionValue::Bool(true), 0.8),
            decision("b", DecisionValue::Bool(false), 0.7),
        ];
        let summary = analyse(&task, &decisions, &Thresholds::default(), None).unwrap();
        let result = EvaluationResult {
            task_id: task.task_id().to_string(),
            alignment_summary: summary.clone(),
            synthesized_decision: DecisionValue::Bool(true),
            confidence: summary.consensus_strength,
            reasoning: "resolved".to_string(),
            evidence: vec![],
            agent_decisions: decisions,
            requires_human_review: summary.state == AlignmentState::HardDisagreement,
            review_reason: Some("Agents reached hard disagreement and require human review.".into()),
            request_id: Uniquifier::from_raw(0xDEAD_BEEF),
            processing_time_ms: 42,
            metadata: Map::new(),
        };
        (result, summary)
    }

    #[test]
    fn returns_none_when_review_not_required() {
        let (mut result, summary) = hard_disagreement_result();
        result.requires_human_review = false;
        let request = build_hitl_request(
            &result,
            &summary,
            Uniquifier::from_raw(1),
            OffsetDateTime::UNIX_EPOCH,
            None,
        );
        assert!(request.is_none());
    }

    #[test]
    fn builds_request_with_expected_id_format() {
        let (result, summary) = hard_disagreement_result();
        let request = build_hitl_request(
            &result,
            &summary,
            Uniquifier::from_raw(0x1234_5678),
            OffsetDateTime::UNIX_EPOCH,
            None,
        )
        .unwrap();
        assert_eq!(request.request_id, "hitl-task-1-12345678");
        assert_eq!(request.escalation_reason, HITLEscalationReason::HardDisagreement);
        assert!(validate_hitl_request(&request));
    }

    #[test]
    fn low_confidence_maps_to_insufficient_signal() {
        let task = EvaluationTask::new(
            "task-2",
            "review",
            DecisionSchema::boolean("approve", "reject"),
            Map::new(),
            "be thorough",
        )
        .unwrap();
        let decisions = vec![
            decision("a", DecisionValue::Bool(true), 0.2),
            decision("b", DecisionValue::Bool(true), 0.3),
        ];
        let summary = analyse(&task, &decisions, &Thresholds::default(), None).unwrap();
        assert_eq!(summary.state, AlignmentState::InsufficientSignal);
        let result = EvaluationResult {
            task_id: task.task_id().to_string(),
            alignment_summary: summary.clone(),
            synthesized_decision: DecisionValue::Bool(true),
            confidence: summary.consensus_strength,
            reasoning: "resolved".to_string(),
            evidence: vec![],
            agent_decisions: decisions,
            requires_human_review: true,
            review_reason: Some("low confidence".into()),
            request_id: Uniquifier::from_raw(2),
            processing_time_ms: 10,
            metadata: Map::new(),
        };
        let request = build_hitl_request(
            &result,
            &summary,
            Uniquifier::from_raw(3),
            OffsetDateTime::UNIX_EPOCH,
            None,
        )
        .unwrap();
        assert_eq!(request.escalation_reason, HITLEscalationReason::LowConfidence);
    }

    #[test]
    fn rejects_dissenting_agent_outside_decisions() {
        let (result, summary) = hard_disagreement_result();
        let mut request = build_hitl_request(
            &result,
            &summary,
            Uniquifier::from_raw(4),
            OffsetDateTime::UNIX_EPOCH,
            None,
        )
        .unwrap();
        request.dissenting_agents.push("ghost".to_string());
        assert!(!validate_hitl_request(&request));
    }
}
