//! Alignment analysis and disagreement resolution for the `concord`
//! multi-agent evaluation core.
//!
//! This crate holds the two pure, deterministic components that sit between
//! raw agent decisions and a synthesised evaluation result: the analyser
//! ([`analyse`]), which scores how aligned a set of decisions is, and the
//! resolver ([`resolve`]), which synthesises a single decision from them.
//! Neither component performs I/O or holds state across calls.

#![warn(missing_docs)]

mod analyser;
mod error;
mod resolver;
mod state;
mod util;

pub use analyser::analyse;
pub use error::AlignError;
pub use resolver::{resolve, MAX_EVIDENCE};
pub use state::{
    AlignmentState, AlignmentSummary, ANALYSIS_VERSION, AREA_CONFIDENCE_LEVELS,
    AREA_EVIDENCE_QUALITY, AREA_PRIMARY_DECISION, AREA_REASONING_APPROACH,
};
