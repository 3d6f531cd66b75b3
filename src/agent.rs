//! The agent capability contract (C2).

use std::future::Future;
use std::pin::Pin;

use concord_schema::{AgentDecision, AgentRole, EvaluationTask};

use crate::error::AgentError;

/// A boxed, dynamically dispatchable future, used to keep [`Agent`] object-safe.
pub type AgentFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Anything capable of producing a decision for an [`EvaluationTask`].
///
/// The core never inspects how an implementation computes its decision —
/// an LLM call, a rule engine, or a fixed stub are all equally valid.
/// Implementations must not mutate `task` and must be safe to invoke
/// concurrently with other agents.
pub trait Agent: Send + Sync {
    /// This agent's role: name, instructions, and sampling configuration.
    fn role(&self) -> &AgentRole;

    /// Produce a decision for `task`.
    ///
    /// Boxed rather than a plain `async fn` so that `Agent` remains usable
    /// as `Arc<dyn Agent>` inside the orchestrator's agent list.
    fn evaluate<'a>(&'a self, task: &'a EvaluationTask) -> AgentFuture<'a, Result<AgentDecision, AgentError>>;
}
