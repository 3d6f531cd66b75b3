//! The disagreement resolver (C4): a pure, schema-dispatched function that
//! synthesises a single decision from a set of agent decisions.

use std::collections::BTreeMap;

use concord_schema::{AgentDecision, DecisionSchema, DecisionValue, EventSink, EvaluationTask};
use serde_json::Value;

use crate::state::AlignmentSummary;
use crate::util::decision_key;

/// Evidence collections synthesised by the resolver are clamped to this
/// length.
pub const MAX_EVIDENCE: usize = 5;

/// Resolve a set of agent decisions into a single synthesised decision.
///
/// Pure; dispatches on `task`'s decision schema. Returns
/// `(decision, confidence, reasoning, evidence)`. `confidence` is always
/// `summary.consensus_strength`; `evidence` never exceeds
/// [`MAX_EVIDENCE`] entries.
pub fn resolve(
    task: &EvaluationTask,
    decisions: &[AgentDecision],
    summary: &AlignmentSummary,
    sink: Option<&dyn EventSink>,
) -> (DecisionValue, f64, String, Vec<String>) {
    let schema = task.decision_schema();

    concord_schema::emit(
        sink,
        "disagreement_resolution_started",
        BTreeMap::from([
            ("task_id".to_string(), Value::from(task.task_id())),
            ("agent_count".to_string(), Value::from(decisions.len())),
            (
                "alignment_state".to_string(),
                Value::from(summary.state.as_str()),
            ),
            (
                "decision_schema_type".to_string(),
                Value::from(schema.schema_type()),
            ),
        ]),
    );

    let (decision, confidence, reasoning, evidence) = match schema {
        DecisionSchema::Boolean { .. } => resolve_boolean(decisions, summary),
        DecisionSchema::Categorical { .. } => resolve_categorical(decisions, summary),
        DecisionSchema::Scalar { .. } => resolve_scalar(decisions, summary),
        DecisionSchema::FreeForm { .. } => resolve_free_form(decisions, summary),
    };

    concord_schema::emit(
        sink,
        "disagreement_resolution_completed",
        BTreeMap::from([
            ("task_id".to_string(), Value::from(task.task_id())),
            ("final_confidence".to_string(), Value::from(confidence)),
            (
                "alignment_state".to_string(),
                Value::from(summary.state.as_str()),
            ),
            ("evidence_count".to_string(), Value::from(evidence.len())),
        ]),
    );

    (decision, confidence, reasoning, evidence)
}

fn collect_evidence<'a>(
    ordered_supporters: impl Iterator<Item = &'a AgentDecision>,
    per_agent_cap: usize,
    max_agents: usize,
) -> Vec<String> {
    let mut evidence = Vec::new();
    for decision in ordered_supporters.take(max_agents) {
        evidence.extend(decision.evidence().iter().take(per_agent_cap).cloned());
    }
    evidence.truncate(MAX_EVIDENCE);
    evidence
}

fn resolve_boolean(
    decisions: &[AgentDecision],
    summary: &AlignmentSummary,
) -> (DecisionValue, f64, String, Vec<String>) {
    let weighted_true: f64 = decisions
        .iter()
        .filter(|d| matches!(d.decision_value(), DecisionValue::Bool(true)))
        .map(AgentDecision::confidence)
        .sum();
    let weighted_false: f64 = decisions
        .iter()
        .filter(|d| matches!(d.decision_value(), DecisionValue::Bool(false)))
        .map(AgentDecision::confidence)
        .sum();
    let winner = weighted_true > weighted_false;

    let supporters: Vec<&AgentDecision> = decisions
        .iter()
        .filter(|d| matches!(d.decision_value(), DecisionValue::Bool(b) if *b == winner))
        .collect();
    let evidence = collect_evidence(supporters.iter().copied(), 2, 3);

    let reasoning = format!(
        "Boolean decision resolved to {winner} via confidence-weighted majority ({weighted_true:.3} for vs {weighted_against:.3} against across {n} agents).",
        weighted_against = if winner { weighted_false } else { weighted_true },
        n = decisions.len(),
    );

    (
        DecisionValue::Bool(winner),
        summary.consensus_strength,
        reasoning,
        evidence,
    )
}

fn resolve_categorical(
    decisions: &[AgentDecision],
    summary: &AlignmentSummary,
) -> (DecisionValue, f64, String, Vec<String>) {
    let mut scores: Vec<(String, f64)> = Vec::new();
    for decision in decisions {
        let key = decision_key(decision.decision_value());
        if let Some(entry) = scores.iter_mut().find(|(k, _)| *k == key) {
            entry.1 += decision.confidence();
        } else {
            scores.push((key, decision.confidence()));
        }
    }
    let mut winner = scores.first().cloned().unwrap_or_default();
    for candidate in &scores {
        if candidate.1 > winner.1 {
            winner = candidate.clone();
        }
    }

    let supporters: Vec<&AgentDecision> = decisions
        .iter()
        .filter(|d| decision_key(d.decision_value()) == winner.0)
        .collect();
    let evidence = collect_evidence(supporters.iter().copied(), 2, supporters.len());

    let reasoning = format!(
        "Categorical decision resolved to '{}' with total weighted support {:.3} across {} agents.",
        winner.0,
        winner.1,
        decisions.len()
    );

    (
        DecisionValue::Category(winner.0),
        summary.consensus_strength,
        reasoning,
        evidence,
    )
}

fn resolve_scalar(
    decisions: &[AgentDecision],
    summary: &AlignmentSummary,
) -> (DecisionValue, f64, String, Vec<String>) {
    let values: Vec<f64> = decisions
        .iter()
        .filter_map(|d| match d.decision_value() {
            DecisionValue::Scalar(x) => Some(*x),
            _ => None,
        })
        .collect();
    let total_weight: f64 = decisions.iter().map(AgentDecision::confidence).sum();
    let value = if total_weight == 0.0 {
        values.iter().sum::<f64>() / values.len() as f64
    } else {
        decisions
            .iter()
            .filter_map(|d| match d.decision_value() {
                DecisionValue::Scalar(x) => Some(x * d.confidence()),
                _ => None,
            })
            .sum::<f64>()
            / total_weight
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut by_confidence: Vec<&AgentDecision> = decisions.iter().collect();
    by_confidence.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));
    let evidence = collect_evidence(by_confidence.iter().copied(), 2, 3);

    let reasoning = format!(
        "Scalar decision resolved to {value:.3} via confidence-weighted mean (range [{min:.3}, {max:.3}] across {n} agents).",
        n = decisions.len(),
    );

    (
        DecisionValue::Scalar(value),
        summary.consensus_strength,
        reasoning,
        evidence,
    )
}

fn resolve_free_form(
    decisions: &[AgentDecision],
    summary: &AlignmentSummary,
) -> (DecisionValue, f64, String, Vec<String>) {
    let mut winner = &decisions[0];
    for candidate in decisions {
        if candidate.confidence() > winner.confidence() {
            winner = candidate;
        }
    }
    let decision_text = match winner.decision_value() {
        DecisionValue::Text(t) => t.clone(),
        other => decision_key(other),
    };

    let mut reasoning = format!(
        "Free-form decision taken from {} (confidence {:.3}).",
        winner.agent_name(),
        winner.confidence()
    );

    let others: Vec<&AgentDecision> = decisions
        .iter()
        .filter(|d| !std::ptr::eq(*d, winner))
        .collect();
    if !others.is_empty() {
        let summaries: Vec<String> = others
            .iter()
            .take(2)
            .map(|d| {
                let text = match d.decision_value() {
                    DecisionValue::Text(t) => t.clone(),
                    other => decision_key(other),
                };
                let truncated: String = text.chars().take(80).collect();
                format!("{} ({:.3}): {truncated}", d.agent_name(), d.confidence())
            })
            .collect();
        reasoning.push_str(&format!(" Other perspectives: {}", summaries.join("; ")));
    }

    let evidence = collect_evidence(decisions.iter(), 2, decisions.len());

    (
        DecisionValue::Text(decision_text),
        summary.consensus_strength,
        reasoning,
        evidence,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_schema::Thresholds;
    use std::collections::BTreeMap as Map;

    fn task(schema: DecisionSchema) -> EvaluationTask {
        EvaluationTask::new("t1", "review", schema, Map::new(), "be thorough").unwrap()
    }

    fn decision(name: &str, value: DecisionValue, confidence: f64) -> AgentDecision {
        AgentDecision::new(name, "critic", value, confidence, "rationale here", vec!["e1".into()])
            .unwrap()
    }

    fn stub_summary() -> AlignmentSummary {
        crate::analyser::analyse(
            &task(DecisionSchema::boolean("approve", "reject")),
            &[
                decision("a", DecisionValue::Bool(true), 0.8),
                decision("b", DecisionValue::Bool(true), 0.8),
            ],
            &Thresholds::default(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn boolean_majority_picks_higher_weighted_side() {
        let task = task(DecisionSchema::boolean("approve", "reject"));
        let decisions = [
            decision("a", DecisionValue::Bool(true), 0.9),
            decision("b", DecisionValue::Bool(false), 0.4),
        ];
        let summary = stub_summary();
        let (decision, _, reasoning, evidence) = resolve(&task, &decisions, &summary, None);
        assert_eq!(decision, DecisionValue::Bool(true));
        assert!(reasoning.contains("confidence-weighted majority"));
        assert_eq!(evidence, vec!["e1".to_string()]);
    }

    #[test]
    fn boolean_tie_resolves_to_false() {
        let task = task(DecisionSchema::boolean("approve", "reject"));
        let decisions = [
            decision("a", DecisionValue::Bool(true), 0.5),
            decision("b", DecisionValue::Bool(false), 0.5),
        ];
        let summary = stub_summary();
        let (decision, ..) = resolve(&task, &decisions, &summary, None);
        assert_eq!(decision, DecisionValue::Bool(false));
    }

    #[test]
    fn scalar_falls_back_to_mean_when_total_weight_zero() {
        let schema = DecisionSchema::scalar(0.0, 10.0).unwrap();
        let task = task(schema);
        let decisions = [
            decision("a", DecisionValue::Scalar(2.0), 0.0),
            decision("b", DecisionValue::Scalar(4.0), 0.0),
        ];
        let summary = stub_summary();
        let (decision, ..) = resolve(&task, &decisions, &summary, None);
        assert_eq!(decision, DecisionValue::Scalar(3.0));
    }

    #[test]
    fn free_form_picks_highest_confidence_and_summarises_others() {
        let schema = DecisionSchema::free_form(None, None).unwrap();
        let task = task(schema);
        let decisions = [
            decision("a", DecisionValue::Text("looks solid".into()), 0.9),
            decision("b", DecisionValue::Text("some concerns".into()), 0.4),
        ];
        let summary = stub_summary();
        let (decision, _, reasoning, _) = resolve(&task, &decisions, &summary, None);
        assert_eq!(decision, DecisionValue::Text("looks solid".into()));
        assert!(reasoning.contains("Other perspectives"));
    }

    #[test]
    fn evidence_is_capped_at_five() {
        let schema = DecisionSchema::boolean("approve", "reject");
        let task = task(schema);
        let decisions: Vec<AgentDecision> = (0..4)
            .map(|i| {
                AgentDecision::new(
                    format!("agent-{i}"),
                    "critic",
                    DecisionValue::Bool(true),
                    0.9,
                    "rationale here",
                    vec!["e1".into(), "e2".into(), "e3".into()],
                )
                .unwrap()
            })
            .collect();
        let summary = stub_summary();
        let (_, _, _, evidence) = resolve(&task, &decisions, &summary, None);
        assert!(evidence.len() <= MAX_EVIDENCE);
    }
}
