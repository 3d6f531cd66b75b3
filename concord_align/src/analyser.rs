//! The alignment analyser (C3): a pure function turning a set of agent
//! decisions into an [`AlignmentSummary`].

use std::collections::{BTreeMap, BTreeSet};

use concord_schema::{AgentDecision, DecisionSchema, EventSink, EvaluationTask, Thresholds};
use serde_json::Value;

use crate::error::AlignError;
use crate::state::{
    metadata_snapshot, AlignmentState, AlignmentSummary, AREA_CONFIDENCE_LEVELS,
    AREA_EVIDENCE_QUALITY, AREA_PRIMARY_DECISION, AREA_REASONING_APPROACH,
};
use crate::util::{decision_key, mean, reasoning_keywords, sample_stdev};

/// Analyse a set of agent decisions for one evaluation task and produce an
/// [`AlignmentSummary`].
///
/// Pure, deterministic, and idempotent: calling this twice with the same
/// inputs produces bit-identical output. Requires at least two decisions.
///
/// # Errors
///
/// Returns [`AlignError::InsufficientAgents`] if `decisions` has fewer than
/// two entries.
pub fn analyse(
    task: &EvaluationTask,
    decisions: &[AgentDecision],
    thresholds: &Thresholds,
    sink: Option<&dyn EventSink>,
) -> Result<AlignmentSummary, AlignError> {
    if decisions.len() < 2 {
        return Err(AlignError::InsufficientAgents(decisions.len()));
    }

    let schema = task.decision_schema();

    concord_schema::emit(
        sink,
        "alignment_analysis_started",
        BTreeMap::from([
            ("task_id".to_string(), Value::from(task.task_id())),
            ("agent_count".to_string(), Value::from(decisions.len())),
            (
                "decision_schema_type".to_string(),
                Value::from(schema.schema_type()),
            ),
        ]),
    );

    // Step 1: decision agreement.
    let decision_agreement = decisions_agree(schema, decisions, thresholds);

    // Step 2: confidence metrics.
    let confidences: Vec<f64> = decisions.iter().map(AgentDecision::confidence).collect();
    let avg_confidence = mean(&confidences);
    let min_confidence = confidences.iter().copied().fold(f64::INFINITY, f64::min);
    let max_confidence = confidences
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let confidence_spread = max_confidence - min_confidence;

    // Step 3: dissenting agents.
    let dissenting_agents = dissenting_agents(decisions);

    // Step 4: disagreement areas, in fixed order.
    let mut disagreement_areas = Vec::new();
    let distinct_decision_keys: BTreeSet<String> = decisions
        .iter()
        .map(|d| decision_key(d.decision_value()))
        .collect();
    if distinct_decision_keys.len() > 1 {
        disagreement_areas.push(AREA_PRIMARY_DECISION.to_string());
    }
    if confidence_spread > thresholds.soft_disagreement_confidence_spread() {
        disagreement_areas.push(AREA_CONFIDENCE_LEVELS.to_string());
    }
    let reasoning_overlap = reasoning_overlap(decisions);
    if reasoning_overlap < thresholds.reasoning_overlap_threshold() {
        disagreement_areas.push(AREA_REASONING_APPROACH.to_string());
    }
    let evidence_consistency = evidence_consistency(decisions);
    if evidence_consistency < thresholds.evidence_consistency_threshold() {
        disagreement_areas.push(AREA_EVIDENCE_QUALITY.to_string());
    }

    // Step 5: alignment score.
    let agreement_component = if decision_agreement { 0.4 } else { 0.0 };
    let confidence_component = 0.3 * (1.0 - confidence_spread).max(0.0);
    let total_agents = dissenting_agents.len() + 1;
    let consensus_breadth = 1.0 - (dissenting_agents.len() as f64 / total_agents as f64);
    let alignment_score =
        (agreement_component + confidence_component + 0.3 * consensus_breadth).clamp(0.0, 1.0);

    // Step 6: state, by priority.
    let state = if avg_confidence < thresholds.insufficient_signal_avg_confidence() {
        AlignmentState::InsufficientSignal
    } else if !decision_agreement
        || confidence_spread > thresholds.hard_disagreement_confidence_spread()
        || disagreement_areas.len() >= 3
    {
        AlignmentState::HardDisagreement
    } else if confidence_spread > thresholds.soft_disagreement_confidence_spread()
        || !disagreement_areas.is_empty()
    {
        AlignmentState::SoftDisagreement
    } else {
        AlignmentState::FullAlignment
    };

    // Step 7: resolution rationale.
    let resolution_rationale = resolution_rationale(
        state,
        decision_agreement,
        avg_confidence,
        confidence_spread,
        &disagreement_areas,
        thresholds,
    );

    // Step 8: consensus strength.
    let consensus_strength = alignment_score * avg_confidence;

    let confidence_distribution: BTreeMap<String, f64> = decisions
        .iter()
        .map(|d| (d.agent_name().to_string(), d.confidence()))
        .collect();

    let summary = AlignmentSummary {
        state,
        alignment_score,
        decision_agreement,
        confidence_spread,
        confidence_distribution,
        avg_confidence,
        dissenting_agents,
        disagreement_areas,
        consensus_strength,
        resolution_rationale,
        metadata: metadata_snapshot(thresholds, decisions.len(), schema.schema_type()),
    };

    concord_schema::emit(
        sink,
        "alignment_analysis_completed",
        BTreeMap::from([
            ("task_id".to_string(), Value::from(task.task_id())),
            ("state".to_string(), Value::from(summary.state.as_str())),
            (
                "alignment_score".to_string(),
                Value::from(summary.alignment_score),
            ),
        ]),
    );

    Ok(summary)
}

/// Whether `decisions` agree on the primary decision, using schema-dispatched
/// equality. Distinct from the plain string-keyed comparison that drives
/// [`dissenting_agents`] and the `primary_decision` disagreement area.
fn decisions_agree(
    schema: &DecisionSchema,
    decisions: &[AgentDecision],
    thresholds: &Thresholds,
) -> bool {
    match schema {
        DecisionSchema::Scalar { min, max } => {
            let values: Vec<f64> = decisions
                .iter()
                .filter_map(|d| match d.decision_value() {
                    concord_schema::DecisionValue::Scalar(x) => Some(*x),
                    _ => None,
                })
                .collect();
            if values.len() < 2 {
                return true;
            }
            let tolerance = (max - min) * thresholds.scalar_decision_tolerance_ratio();
            let m = mean(&values);
            values.iter().all(|v| (v - m).abs() <= tolerance)
        }
        _ => {
            let Some(first) = decisions.first() else {
                return true;
            };
            decisions
                .iter()
                .all(|d| schema.values_equal(first.decision_value(), d.decision_value()))
        }
    }
}

fn dissenting_agents(decisions: &[AgentDecision]) -> Vec<String> {
    let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
    for decision in decisions {
        let key = decision_key(decision.decision_value());
        if let Some(group) = groups.iter_mut().find(|(k, _)| *k == key) {
            group.1.push(decision.agent_name());
        } else {
            groups.push((key, vec![decision.agent_name()]));
        }
    }
    // `Iterator::max_by_key` keeps the *last* maximum on ties; the majority
    // group must be the *first*-occurring key with the largest count, so
    // scan manually instead.
    let mut majority_agents: &[&str] = &[];
    for (_, agents) in &groups {
        if agents.len() > majority_agents.len() {
            majority_agents = agents;
        }
    }
    let majority: BTreeSet<&str> = majority_agents.iter().copied().collect();
    decisions
        .iter()
        .filter(|d| !majority.contains(d.agent_name()))
        .map(|d| d.agent_name().to_string())
        .collect()
}

fn reasoning_overlap(decisions: &[AgentDecision]) -> f64 {
    let keyword_sets: Vec<BTreeSet<String>> = decisions
        .iter()
        .map(|d| reasoning_keywords(d.rationale()))
        .collect();
    let Some((first, rest)) = keyword_sets.split_first() else {
        return 1.0;
    };
    let mut intersection = first.clone();
    let mut union = first.clone();
    for set in rest {
        intersection = intersection.intersection(set).cloned().collect();
        union.extend(set.iter().cloned());
    }
    if union.is_empty() {
        return 0.0;
    }
    intersection.len() as f64 / union.len() as f64
}

fn evidence_consistency(decisions: &[AgentDecision]) -> f64 {
    let lengths: Vec<f64> = decisions
        .iter()
        .map(|d| d.evidence().len() as f64)
        .collect();
    let m = mean(&lengths);
    if m == 0.0 {
        return if lengths.iter().all(|&l| l == 0.0) {
            1.0
        } else {
            0.0
        };
    }
    let cv = sample_stdev(&lengths) / m;
    (1.0 - cv).max(0.0)
}

#[allow(clippy::too_many_arguments)]
fn resolution_rationale(
    state: AlignmentState,
    decision_agreement: bool,
    avg_confidence: f64,
    confidence_spread: f64,
    disagreement_areas: &[String],
    thresholds: &Thresholds,
) -> String {
    match state {
        AlignmentState::FullAlignment => {
            format!("Agents are in full alignment with {avg_confidence:.2} average confidence.")
        }
        AlignmentState::InsufficientSignal => format!(
            "Average confidence ({avg_confidence:.2}) is below the insufficient-signal threshold ({:.2}).",
            thresholds.insufficient_signal_avg_confidence()
        ),
        AlignmentState::HardDisagreement => {
            let reason = if !decision_agreement {
                "agents disagree on the primary decision".to_string()
            } else if confidence_spread > thresholds.hard_disagreement_confidence_spread() {
                format!(
                    "confidence spread ({confidence_spread:.2}) exceeds the hard-disagreement threshold ({:.2})",
                    thresholds.hard_disagreement_confidence_spread()
                )
            } else {
                format!("{} disagreement areas were detected", disagreement_areas.len())
            };
            format!("Hard disagreement detected: {reason}.")
        }
        AlignmentState::SoftDisagreement => format!(
            "Soft disagreement detected across {} area(s): {}.",
            disagreement_areas.len(),
            disagreement_areas.join(", ")
        ),
    }
}
