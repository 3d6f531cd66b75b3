//! Decision schemas, the evaluation task/agent/decision data model, and
//! alignment thresholds for the `concord` multi-agent evaluation core.
//!
//! Every type in this crate is an immutable value object: construction
//! validates, and nothing downstream mutates a schema, task, role, decision,
//! or threshold set once built. That invariant is what lets
//! `concord-align`'s analyser and resolver be pure, deterministic functions
//! of their inputs.

#![warn(missing_docs)]

mod error;
mod schema;
mod sink;
mod task;
mod thresholds;

pub use error::{FieldError, SchemaError};
pub use schema::{DecisionSchema, DecisionValue};
pub use sink::{emit, EventSink, NoopEventSink};
pub use task::{AgentDecision, AgentRole, EvaluationTask, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
pub use thresholds::Thresholds;

#[cfg(feature = "config-file")]
pub use thresholds::ThresholdsConfigError;
