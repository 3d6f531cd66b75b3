//! Evidence and escalation for the `concord` multi-agent evaluation core.
//!
//! This crate holds the shapes and functions downstream of analysis and
//! resolution: the [`EvaluationResult`] the orchestrator returns, the
//! human-in-the-loop escalation builder ([`build_hitl_request`]), and
//! operator-facing rendering helpers.

#![warn(missing_docs)]

mod hitl;
pub mod render;
mod result;
mod sink;

pub use hitl::{build_hitl_request, validate_hitl_request, HITLEscalationReason, HITLRequest};
pub use result::EvaluationResult;

#[cfg(feature = "tracing-integration")]
pub use sink::TracingEventSink;
