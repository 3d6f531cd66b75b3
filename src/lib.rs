//! A deterministic multi-agent evaluation core: several independent agents
//! each produce a decision for the same task, an alignment analyser scores
//! how consistent those decisions are, a disagreement resolver synthesises a
//! single decision from them, and a human-in-the-loop escalation builder
//! flags the cases that need a person.
//!
//! The four components above are pure, deterministic functions
//! ([`concord_align::analyse`], [`concord_align::resolve`],
//! [`concord_evidence::build_hitl_request`]) re-exported from their own
//! crates; this crate adds the two pieces that need I/O or concurrency:
//! the [`Agent`] capability contract and the [`Orchestrator`] that runs a set
//! of agents and assembles their output into an [`concord_evidence::EvaluationResult`].

#![warn(missing_docs)]

mod agent;
#[cfg(feature = "config-file")]
mod config;
mod error;
mod orchestrator;

pub use agent::{Agent, AgentFuture};
#[cfg(feature = "config-file")]
pub use config::OrchestratorSettings;
pub use error::{AgentError, CoreError};
pub use orchestrator::Orchestrator;

pub use concord_align::{analyse, resolve, AlignError, AlignmentState, AlignmentSummary};
pub use concord_evidence::{
    build_hitl_request, render, validate_hitl_request, EvaluationResult, HITLEscalationReason,
    HITLRequest,
};
pub use concord_kernel::Uniquifier;
pub use concord_schema::{
    AgentDecision, AgentRole, DecisionSchema, DecisionValue, EventSink, EvaluationTask,
    NoopEventSink, SchemaError, Thresholds,
};

#[cfg(feature = "tracing-integration")]
pub use concord_evidence::TracingEventSink;
