// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Core shared types for kbest-rs.

pub mod budget;
pub mod diagnostics;
pub mod error;
pub mod execution_context;
pub mod intervals;
pub mod observability;
pub mod selector;
pub mod sequence;

pub use budget::Budget;
pub use diagnostics::{DIAGNOSTICS_SCHEMA_VERSION, Diagnostics};
pub use error::{KbestError, checked_add, checked_mul};
pub use execution_context::{ExecutionContext, Limits};
pub use intervals::{
    Interval, count_runs, intervals_from_mask, mask_from_intervals, masked_sum, validate_mask,
};
pub use observability::{ProgressSink, TelemetrySink};
pub use selector::{IntervalSelector, SelectionResult};
pub use sequence::SequenceView;
