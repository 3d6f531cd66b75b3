//! The evaluation task, agent role, and agent decision data model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FieldError;
use crate::schema::{DecisionSchema, DecisionValue};

fn require_non_empty(field: &'static str, s: &str) -> Result<String, FieldError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty { field });
    }
    Ok(trimmed.to_string())
}

fn require_range(field: &'static str, value: f64, lo: f64, hi: f64) -> Result<f64, FieldError> {
    if (lo..=hi).contains(&value) {
        Ok(value)
    } else {
        Err(FieldError::OutOfRange {
            field,
            value,
            lo,
            hi,
        })
    }
}

fn require_valid_name(name: &str) -> Result<String, FieldError> {
    let trimmed = require_non_empty("name", name)?;
    if trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(trimmed)
    } else {
        Err(FieldError::InvalidName(trimmed))
    }
}

/// A single unit of work handed to every agent in an evaluation round.
///
/// Constructed once per call to the orchestrator and never mutated
/// afterwards; all agents in the round receive the same `EvaluationTask`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationTask {
    task_id: String,
    task_type: String,
    decision_schema: DecisionSchema,
    context: BTreeMap<String, Value>,
    evaluation_criteria: String,
    metadata: BTreeMap<String, Value>,
}

impl EvaluationTask {
    /// Construct a new evaluation task.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Empty`] if `task_id`, `task_type`, or
    /// `evaluation_criteria` is empty or whitespace-only.
    pub fn new(
        task_id: impl Into<String>,
        task_type: impl Into<String>,
        decision_schema: DecisionSchema,
        context: BTreeMap<String, Value>,
        evaluation_criteria: impl Into<String>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            task_id: require_non_empty("task_id", &task_id.into())?,
            task_type: require_non_empty("task_type", &task_type.into())?,
            decision_schema,
            context,
            evaluation_criteria: require_non_empty(
                "evaluation_criteria",
                &evaluation_criteria.into(),
            )?,
            metadata: BTreeMap::new(),
        })
    }

    /// Attach metadata, replacing whatever was set before.
    #[must_use]
    pub fn with_metadata(mut self, metadata: BTreeMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// The task identifier.
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// The task type, a free-form classification string.
    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    /// The decision schema every agent decision in this round must conform to.
    pub const fn decision_schema(&self) -> &DecisionSchema {
        &self.decision_schema
    }

    /// Contextual data supplied to agents alongside the task.
    pub const fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    /// Human-readable description of what agents are evaluating against.
    pub fn evaluation_criteria(&self) -> &str {
        &self.evaluation_criteria
    }

    /// Opaque metadata carried alongside the task.
    pub const fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }
}

/// The default maximum token budget for an agent role.
pub const DEFAULT_MAX_TOKENS: u32 = 500;
/// The default sampling temperature for an agent role.
pub const DEFAULT_TEMPERATURE: f64 = 0.1;

/// A role an agent plays in an evaluation round: its name, instructions, and
/// sampling configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentRole {
    name: String,
    role_type: String,
    instruction: String,
    prompt_template: Option<String>,
    max_tokens: u32,
    temperature: f64,
    metadata: BTreeMap<String, Value>,
}

impl AgentRole {
    /// Construct an agent role with default `max_tokens` and `temperature`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidName`] if `name` is empty or contains
    /// characters outside `[A-Za-z0-9_-]`, and [`FieldError::Empty`] if
    /// `role_type` or `instruction` is empty or whitespace-only.
    pub fn new(
        name: impl Into<String>,
        role_type: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            name: require_valid_name(&name.into())?,
            role_type: require_non_empty("role_type", &role_type.into())?,
            instruction: require_non_empty("instruction", &instruction.into())?,
            prompt_template: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            metadata: BTreeMap::new(),
        })
    }

    /// Override the default prompt template.
    #[must_use]
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    /// Override the default max-token budget.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::OutOfRange`] if `max_tokens` is outside `1..=4000`.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Result<Self, FieldError> {
        require_range("max_tokens", f64::from(max_tokens), 1.0, 4000.0)?;
        self.max_tokens = max_tokens;
        Ok(self)
    }

    /// Override the default sampling temperature.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::OutOfRange`] if `temperature` is outside `0.0..=2.0`.
    pub fn with_temperature(mut self, temperature: f64) -> Result<Self, FieldError> {
        self.temperature = require_range("temperature", temperature, 0.0, 2.0)?;
        Ok(self)
    }

    /// Attach metadata, replacing whatever was set before.
    #[must_use]
    pub fn with_metadata(mut self, metadata: BTreeMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// The agent's name, unique within an orchestrator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The agent's role type, e.g. `"critic"` or `"domain_expert"`.
    pub fn role_type(&self) -> &str {
        &self.role_type
    }

    /// The instruction text given to this agent.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// The prompt template, if overridden.
    pub fn prompt_template(&self) -> Option<&str> {
        self.prompt_template.as_deref()
    }

    /// The max-token budget.
    pub const fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// The sampling temperature.
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Opaque metadata carried alongside the role.
    pub const fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }
}

/// A single agent's decision for one [`EvaluationTask`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentDecision {
    agent_name: String,
    role_type: String,
    decision_value: DecisionValue,
    confidence: f64,
    rationale: String,
    evidence: Vec<String>,
    processing_time_ms: Option<u64>,
    metadata: BTreeMap<String, Value>,
}

impl AgentDecision {
    /// Construct an agent decision.
    ///
    /// `confidence` is clamped into `[0, 1]` via
    /// [`DecisionSchema::normalize_confidence`] before storage, matching the
    /// original framework's normalisation behaviour rather than rejecting
    /// out-of-range values outright. `evidence` entries are trimmed and
    /// empty entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Empty`] if `agent_name`, `role_type`, or
    /// `rationale` is empty or whitespace-only.
    pub fn new(
        agent_name: impl Into<String>,
        role_type: impl Into<String>,
        decision_value: DecisionValue,
        confidence: f64,
        rationale: impl Into<String>,
        evidence: Vec<String>,
    ) -> Result<Self, FieldError> {
        let evidence = evidence
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Ok(Self {
            agent_name: require_non_empty("agent_name", &agent_name.into())?,
            role_type: require_non_empty("role_type", &role_type.into())?,
            decision_value,
            confidence: DecisionSchema::normalize_confidence(confidence),
            rationale: require_non_empty("rationale", &rationale.into())?,
            evidence,
            processing_time_ms: None,
            metadata: BTreeMap::new(),
        })
    }

    /// Record how long this agent took to produce its decision.
    #[must_use]
    pub const fn with_processing_time_ms(mut self, ms: u64) -> Self {
        self.processing_time_ms = Some(ms);
        self
    }

    /// Attach metadata, replacing whatever was set before.
    #[must_use]
    pub fn with_metadata(mut self, metadata: BTreeMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// The name of the agent that produced this decision.
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// The role type of the agent that produced this decision.
    pub fn role_type(&self) -> &str {
        &self.role_type
    }

    /// The decision value itself.
    pub const fn decision_value(&self) -> &DecisionValue {
        &self.decision_value
    }

    /// The agent's self-reported confidence, in `[0, 1]`.
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// The agent's rationale for this decision.
    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    /// Supporting evidence strings, trimmed and never empty.
    pub fn evidence(&self) -> &[String] {
        &self.evidence
    }

    /// How long the agent took to produce this decision, if known.
    pub const fn processing_time_ms(&self) -> Option<u64> {
        self.processing_time_ms
    }

    /// Opaque metadata carried alongside the decision.
    pub const fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boolean_schema() -> DecisionSchema {
        DecisionSchema::boolean("approve", "reject")
    }

    #[test]
    fn task_rejects_empty_fields() {
        assert!(EvaluationTask::new("", "t", boolean_schema(), BTreeMap::new(), "c").is_err());
        assert!(EvaluationTask::new("id", "  ", boolean_schema(), BTreeMap::new(), "c").is_err());
        assert!(EvaluationTask::new("id", "t", boolean_schema(), BTreeMap::new(), "").is_err());
    }

    #[test]
    fn task_trims_fields() {
        let task =
            EvaluationTask::new("  id  ", "t", boolean_schema(), BTreeMap::new(), "c").unwrap();
        assert_eq!(task.task_id(), "id");
    }

    #[test]
    fn role_defaults() {
        let role = AgentRole::new("critic-1", "critic", "be critical").unwrap();
        assert_eq!(role.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(role.temperature(), DEFAULT_TEMPERATURE);
    }

    #[test]
    fn role_rejects_bad_name() {
        assert!(AgentRole::new("has space", "critic", "be critical").is_err());
        assert!(AgentRole::new("", "critic", "be critical").is_err());
        assert!(AgentRole::new("ok_name-1", "critic", "be critical").is_ok());
    }

    #[test]
    fn role_validates_max_tokens_and_temperature_ranges() {
        let role = AgentRole::new("n", "t", "i").unwrap();
        assert!(role.clone().with_max_tokens(0).is_err());
        assert!(role.clone().with_max_tokens(4001).is_err());
        assert!(role.clone().with_max_tokens(4000).is_ok());
        assert!(role.clone().with_temperature(-0.1).is_err());
        assert!(role.clone().with_temperature(2.1).is_err());
        assert!(role.with_temperature(2.0).is_ok());
    }

    #[test]
    fn decision_clamps_confidence_and_filters_evidence() {
        let decision = AgentDecision::new(
            "agent-1",
            "critic",
            DecisionValue::Bool(true),
            1.5,
            "looks fine",
            vec!["  ".into(), "solid test coverage".into(), String::new()],
        )
        .unwrap();
        assert_eq!(decision.confidence(), 1.0);
        assert_eq!(decision.evidence(), ["solid test coverage"]);
    }

    #[test]
    fn decision_rejects_empty_required_fields() {
        assert!(AgentDecision::new(
            "",
            "critic",
            DecisionValue::Bool(true),
            0.5,
            "r",
            vec![]
        )
        .is_err());
        assert!(AgentDecision::new(
            "a",
            "critic",
            DecisionValue::Bool(true),
            0.5,
            "  ",
            vec![]
        )
        .is_err());
    }
}
