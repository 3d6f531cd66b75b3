//! Human-readable rendering of an [`EvaluationResult`] for an operator or a
//! human reviewer. Free functions, no ANSI, fully deterministic.

use concord_schema::DecisionValue;

use crate::result::EvaluationResult;

fn title_case_state(state_str: &str) -> String {
    state_str
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn decision_text(value: &DecisionValue) -> String {
    match value {
        DecisionValue::Bool(b) => b.to_string(),
        DecisionValue::Category(c) => c.clone(),
        DecisionValue::CategorySet(set) => set.iter().cloned().collect::<Vec<_>>().join(", "),
        DecisionValue::Scalar(x) => format!("{x}"),
        DecisionValue::Text(t) => t.clone(),
    }
}

/// A one-paragraph, line-oriented summary naming the alignment state,
/// dissenting agents grouped by decision, confidence spread, and
/// disagreement areas.
///
/// Sections that don't apply (full agreement, low confidence spread, no
/// disagreement areas) are omitted rather than rendered empty.
pub fn disagreement_summary(result: &EvaluationResult) -> String {
    let summary = &result.alignment_summary;
    let mut lines = Vec::new();

    lines.push(format!(
        "Alignment State: {}",
        title_case_state(summary.state.as_str())
    ));

    if !summary.decision_agreement {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for decision in &result.agent_decisions {
            let key = decision_text(decision.decision_value());
            if let Some(entry) = grouped.iter_mut().find(|(k, _)| *k == key) {
                entry.1.push(decision.agent_name().to_string());
            } else {
                grouped.push((key, vec![decision.agent_name().to_string()]));
            }
        }
        lines.push("Decision Disagreement:".to_string());
        for (decision, agents) in grouped {
            lines.push(format!("  - {decision}: {}", agents.join(", ")));
        }
    }

    if summary.confidence_spread > 0.2 {
        let mut by_confidence: Vec<(&str, f64)> = result
            .agent_decisions
            .iter()
            .map(|d| (d.agent_name(), d.confidence()))
            .collect();
        by_confidence.sort_by(|a, b| b.1.total_cmp(&a.1));
        lines.push("Confidence Spread:".to_string());
        for (agent_name, confidence) in by_confidence {
            lines.push(format!("  - {agent_name}: {confidence:.2}"));
        }
    }

    if !summary.disagreement_areas.is_empty() {
        lines.push(format!(
            "Disagreement Areas: {}",
            summary.disagreement_areas.join(", ")
        ));
    }

    lines.join("\n")
}

/// A fixed-template checklist for a human reviewer, followed by a per-agent
/// summary line for every decision that went into `result`.
pub fn reviewer_instructions(result: &EvaluationResult) -> String {
    let mut lines = vec![
        "Please review the agent evaluations and provide your assessment.".to_string(),
        String::new(),
        "Consider the following:".to_string(),
        "1. Review each agent's decision, confidence, and reasoning".to_string(),
        "2. Identify which agent(s) provide the most compelling evidence".to_string(),
        "3. Consider any factors the agents may have missed".to_string(),
        "4. Make your own independent assessment".to_string(),
        String::new(),
        format!("Task: {}", result.task_id),
        format!(
            "Current disagreement: {}",
            result.review_reason.as_deref().unwrap_or("none recorded")
        ),
        String::new(),
        "Agent Summaries:".to_string(),
    ];

    for decision in &result.agent_decisions {
        lines.push(format!(
            "- {} ({}): {} (confidence: {:.2})",
            decision.agent_name(),
            decision.role_type(),
            decision_text(decision.decision_value()),
            decision.confidence()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_align::analyse;
    use concord_kernel::Uniquifier;
    use concord_schema::{AgentDecision, DecisionSchema, EvaluationTask, Thresholds};
    use std::collections::BTreeMap;

    fn sample_result() -> EvaluationResult {
        let task = EvaluationTask::new(
            "task-7",
            "review",
            DecisionSchema::boolean("approve", "reject"),
            BTreeMap::new(),
            "be thorough",
        )
        .unwrap();
        let decisions = vec![
            AgentDecision::new(
                "alice",
                "critic",
                DecisionValue::Bool(true),
                0.9,
                "looks fine",
                vec!["e1".into()],
            )
            .unwrap(),
            AgentDecision::new(
                "bob",
                "skeptic",
                DecisionValue::Bool(false),
                0.3,
                "has concerns",
                vec![],
            )
            .unwrap(),
        ];
        let summary = analyse(&task, &decisions, &Thresholds::default(), None).unwrap();
        EvaluationResult {
            task_id: task.task_id().to_string(),
            alignment_summary: summary,
            synthesized_decision: DecisionValue::Bool(true),
            confidence: 0.5,
            reasoning: "resolved".to_string(),
            evidence: vec![],
            agent_decisions: decisions,
            requires_human_review: true,
            review_reason: Some("Agents disagree on the primary decision.".to_string()),
            request_id: Uniquifier::from_raw(1),
            processing_time_ms: 5,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn deterministic_output() {
        let result = sample_result();
        let first = disagreement_summary(&result);
        let second = disagreement_summary(&result);
        assert_eq!(first, second);
        assert!(first.contains("Alignment State:"));
        assert!(first.contains("Decision Disagreement:"));
        assert!(first.contains("alice"));
    }

    #[test]
    fn reviewer_instructions_include_task_and_agents() {
        let result = sample_result();
        let text = reviewer_instructions(&result);
        assert!(text.starts_with("Please review the agent evaluations"));
        assert!(text.contains("Task: task-7"));
        assert!(text.contains("bob (skeptic): false (confidence: 0.30)"));
    }

    #[test]
    fn full_agreement_omits_disagreement_section() {
        let task = EvaluationTask::new(
            "task-8",
            "review",
            DecisionSchema::boolean("approve", "reject"),
            BTreeMap::new(),
            "be thorough",
        )
        .unwrap();
        let decisions = vec![
            AgentDecision::new(
                "alice",
                "critic",
                DecisionValue::Bool(true),
                0.9,
                "looks fine",
                vec![],
            )
            .unwrap(),
            AgentDecision::new(
                "bob",
                "critic",
                DecisionValue::Bool(true),
                0.85,
                "agreed",
                vec![],
            )
            .unwrap(),
        ];
        let summary = analyse(&task, &decisions, &Thresholds::default(), None).unwrap();
        let result = EvaluationResult {
            task_id: task.task_id().to_string(),
            alignment_summary: summary,
            synthesized_decision: DecisionValue::Bool(true),
            confidence: 0.9,
            reasoning: "resolved".to_string(),
            evidence: vec![],
            agent_decisions: decisions,
            requires_human_review: false,
            review_reason: None,
            request_id: Uniquifier::from_raw(2),
            processing_time_ms: 5,
            metadata: BTreeMap::new(),
        };
        let text = disagreement_summary(&result);
        assert!(!text.contains("Decision Disagreement:"));
    }
}
