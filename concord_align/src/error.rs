//! Errors raised by the analyser and resolver.

use thiserror::Error;

/// Errors raised by [`crate::analyse`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AlignError {
    /// Fewer than two agent decisions were supplied; alignment analysis
    /// requires at least two independent decisions to compare.
    #[error("alignment analysis requires at least 2 agent decisions, got {0}")]
    InsufficientAgents(usize),
}
