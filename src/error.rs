//! The ambient error taxonomy unifying every component's local errors.

use thiserror::Error;

/// Errors an [`crate::Agent`] may return from a single evaluation attempt.
///
/// `TransientFailure` is retried by the orchestrator up to its configured
/// `max_retries`; `PermanentFailure` and `InvalidTask` are terminal for that
/// agent and the evaluation continues without it.
#[derive(Clone, Debug, Error)]
pub enum AgentError {
    /// The task is structurally unsuitable for this agent; never retried.
    #[error("task is invalid for this agent: {0}")]
    InvalidTask(String),
    /// A retryable failure, e.g. a transport error or rate limit.
    #[error("transient agent failure: {0}")]
    TransientFailure(String),
    /// A non-retryable failure, e.g. the agent rejects the task outright.
    #[error("permanent agent failure: {0}")]
    PermanentFailure(String),
}

/// The closed error type surfaced by the evaluation core.
///
/// Per-component validation errors (schema construction, threshold
/// construction, field validation) are distinct small `thiserror` enums
/// converted into this type via `#[from]`; this type is what callers of the
/// orchestrator and the standalone schema/threshold constructors actually
/// see.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A decision schema was constructed with structurally invalid fields.
    #[error("invalid decision schema: {0}")]
    InvalidSchema(#[from] concord_schema::SchemaError),
    /// An evaluation task or one of its fields failed validation.
    #[error("invalid evaluation task: {0}")]
    InvalidTask(String),
    /// Too few agent decisions were available to run alignment analysis,
    /// either because the orchestrator was constructed with no agents or
    /// because fewer than two agents produced a usable decision.
    #[error(transparent)]
    InsufficientAgents(#[from] concord_align::AlignError),
    /// Every agent failed; carries each agent's name and final failure
    /// reason, in registered-agent order.
    #[error("all {0} agent(s) failed: {1:?}")]
    OrchestratorFailure(usize, Vec<(String, String)>),
}
