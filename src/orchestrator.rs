//! The multi-agent orchestrator (C5): fans agents out, retries transient
//! failures, tolerates partial failure, and assembles an [`EvaluationResult`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use concord_align::{self, AlignmentState};
use concord_evidence::EvaluationResult;
use concord_kernel::Uniquifier;
use concord_schema::{EventSink, EvaluationTask, Thresholds};
use tokio::task::JoinSet;

use crate::agent::Agent;
use crate::error::{AgentError, CoreError};

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn fresh_uniquifier() -> Uniquifier {
    let mut buf = [0u8; 4];
    getrandom::getrandom(&mut buf).expect("OS entropy failed");
    Uniquifier::from_raw(u32::from_le_bytes(buf))
}

/// Runs a fixed set of agents against an [`EvaluationTask`], retrying
/// transient per-agent failures and assembling the surviving decisions into
/// an [`EvaluationResult`].
///
/// Immutable after construction; safe to reuse (and to share via `Arc`)
/// across concurrent evaluations, since each call to [`Orchestrator::evaluate`]
/// only reads shared configuration and owns its own per-call state.
pub struct Orchestrator {
    agents: Vec<Arc<dyn Agent>>,
    thresholds: Thresholds,
    enable_hitl: bool,
    max_retries: u32,
    timeout: Duration,
    sink: Option<Arc<dyn EventSink>>,
}

impl Orchestrator {
    /// Start building an orchestrator over `agents`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InsufficientAgents`] if `agents` is empty.
    pub fn new(agents: Vec<Arc<dyn Agent>>) -> Result<Self, CoreError> {
        if agents.is_empty() {
            return Err(concord_align::AlignError::InsufficientAgents(0).into());
        }
        Ok(Self {
            agents,
            thresholds: Thresholds::default(),
            enable_hitl: true,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            sink: None,
        })
    }

    /// Override the default thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Override whether hard disagreement triggers `requires_human_review`.
    #[must_use]
    pub const fn with_enable_hitl(mut self, enable_hitl: bool) -> Self {
        self.enable_hitl = enable_hitl;
        self
    }

    /// Override the per-agent retry budget. Must be at least 1.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = if max_retries == 0 { 1 } else { max_retries };
        self
    }

    /// Override the per-attempt cancellation deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach an event sink; events are emitted in the fixed closed set from
    /// spec §4.8.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn sink(&self) -> Option<&dyn EventSink> {
        self.sink.as_deref()
    }

    /// Run every registered agent against `task`, resolve their decisions,
    /// and assemble an [`EvaluationResult`].
    ///
    /// Agents run concurrently; `result.agent_decisions` preserves the
    /// registered-agent order regardless of completion order. Fails only if
    /// every agent fails, or if fewer than two decisions survive (alignment
    /// analysis requires at least two).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTask`] if `task`'s context is empty,
    /// [`CoreError::OrchestratorFailure`] if every agent fails, or
    /// [`CoreError::InsufficientAgents`] if fewer than two decisions survive.
    pub async fn evaluate(&self, task: &EvaluationTask) -> Result<EvaluationResult, CoreError> {
        self.validate_task(task)?;

        let request_id = fresh_uniquifier();
        let started_at = Instant::now();

        concord_schema::emit(
            self.sink(),
            "multi_agent_evaluation_started",
            BTreeMap::from([
                ("task_id".to_string(), task.task_id().into()),
                ("agent_count".to_string(), self.agents.len().into()),
                ("request_id".to_string(), request_id.to_string().into()),
            ]),
        );

        let (decisions, failures) = self.execute_agents(task).await;

        if decisions.is_empty() {
            concord_schema::emit(
                self.sink(),
                "multi_agent_evaluation_failed",
                BTreeMap::from([
                    ("task_id".to_string(), task.task_id().into()),
                    ("request_id".to_string(), request_id.to_string().into()),
                ]),
            );
            return Err(CoreError::OrchestratorFailure(self.agents.len(), failures));
        }

        if !failures.is_empty() {
            concord_schema::emit(
                self.sink(),
                "partial_agent_failure",
                BTreeMap::from([
                    ("task_id".to_string(), task.task_id().into()),
                    ("successful_agents".to_string(), decisions.len().into()),
                    ("failed_agents".to_string(), failures.len().into()),
                ]),
            );
        }

        let summary = concord_align::analyse(task, &decisions, &self.thresholds, self.sink())?;
        let (synthesized_decision, confidence, reasoning, evidence) =
            concord_align::resolve(task, &decisions, &summary, self.sink());

        let requires_human_review =
            self.enable_hitl && summary.state == AlignmentState::HardDisagreement;
        let review_reason = requires_human_review.then(|| {
            "Agents reached hard disagreement and require human review.".to_string()
        });

        let result = EvaluationResult {
            task_id: task.task_id().to_string(),
            alignment_summary: summary,
            synthesized_decision,
            confidence,
            reasoning,
            evidence,
            agent_decisions: decisions,
            requires_human_review,
            review_reason,
            request_id,
            processing_time_ms: u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            metadata: BTreeMap::new(),
        };

        concord_schema::emit(
            self.sink(),
            "multi_agent_evaluation_completed",
            BTreeMap::from([
                ("task_id".to_string(), task.task_id().into()),
                ("request_id".to_string(), request_id.to_string().into()),
                (
                    "alignment_state".to_string(),
                    result.alignment_summary.state.as_str().into(),
                ),
                (
                    "requires_human_review".to_string(),
                    result.requires_human_review.into(),
                ),
            ]),
        );

        Ok(result)
    }

    fn validate_task(&self, task: &EvaluationTask) -> Result<(), CoreError> {
        // `EvaluationTask::new` already guarantees non-empty `task_id`,
        // `task_type`, and `evaluation_criteria`; the one field it leaves
        // unchecked is `context`, which the orchestrator requires here.
        if task.context().is_empty() {
            return Err(CoreError::InvalidTask(
                "task context must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    async fn execute_agents(
        &self,
        task: &EvaluationTask,
    ) -> (Vec<concord_schema::AgentDecision>, Vec<(String, String)>) {
        let mut join_set = JoinSet::new();
        for (index, agent) in self.agents.iter().cloned().enumerate() {
            let task = task.clone();
            let max_retries = self.max_retries;
            let timeout = self.timeout;
            let sink = self.sink.clone();
            concord_schema::emit(
                self.sink(),
                "executing_agent",
                BTreeMap::from([
                    ("agent_name".to_string(), agent.role().name().into()),
                    ("role_type".to_string(), agent.role().role_type().into()),
                    ("task_id".to_string(), task.task_id().into()),
                ]),
            );
            join_set.spawn(async move {
                let outcome =
                    execute_agent_with_retry(&agent, &task, max_retries, timeout, sink.as_deref())
                        .await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<concord_schema::AgentDecision>> =
            (0..self.agents.len()).map(|_| None).collect();
        let mut failures = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            let (index, outcome) = joined.expect("agent execution task panicked");
            match outcome {
                Ok(decision) => slots[index] = Some(decision),
                Err(failure) => failures.push(failure),
            }
        }

        let decisions = slots.into_iter().flatten().collect();
        failures.sort_by(|a, b| a.0.cmp(&b.0));
        (decisions, failures)
    }
}

async fn execute_agent_with_retry(
    agent: &Arc<dyn Agent>,
    task: &EvaluationTask,
    max_retries: u32,
    timeout: Duration,
    sink: Option<&dyn EventSink>,
) -> Result<concord_schema::AgentDecision, (String, String)> {
    let name = agent.role().name().to_string();
    let mut last_reason = "agent produced no attempts".to_string();

    for attempt in 0..max_retries {
        let outcome = tokio::time::timeout(timeout, agent.evaluate(task)).await;
        match outcome {
            Ok(Ok(decision)) => {
                let confidence_ok = (0.0..=1.0).contains(&decision.confidence());
                let schema_ok = task.decision_schema().validate(decision.decision_value());
                if confidence_ok && schema_ok {
                    return Ok(decision);
                }
                last_reason = "decision failed schema or confidence validation".to_string();
                break;
            }
            Ok(Err(AgentError::TransientFailure(reason))) => {
                last_reason = reason;
            }
            Ok(Err(AgentError::PermanentFailure(reason) | AgentError::InvalidTask(reason))) => {
                last_reason = reason;
                break;
            }
            Err(_elapsed) => {
                last_reason = "agent call exceeded the per-attempt timeout".to_string();
            }
        }

        if attempt + 1 < max_retries {
            concord_schema::emit(
                sink,
                "agent_retry",
                BTreeMap::from([
                    ("agent_name".to_string(), name.clone().into()),
                    ("attempt".to_string(), (attempt + 1).into()),
                    ("max_retries".to_string(), max_retries.into()),
                ]),
            );
            tokio::time::sleep(Duration::from_secs_f64(0.5 * f64::from(attempt + 1))).await;
        }
    }

    concord_schema::emit(
        sink,
        "agent_execution_failed",
        BTreeMap::from([
            ("agent_name".to_string(), name.clone().into()),
            ("reason".to_string(), last_reason.clone().into()),
        ]),
    );

    Err((name, last_reason))
}
