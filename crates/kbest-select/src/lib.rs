// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Exact selection of at most `k` disjoint maximum-sum intervals.
//!
//! [`KBest`] implements [`kbest_core::IntervalSelector`] with an O(n·k)
//! two-state dynamic program. [`select`] is the plain slice-in, mask-out
//! entry point.

pub mod kadane;
pub mod kbest;
mod score;

pub use kadane::best_single_interval;
pub use kbest::{
    AUTO_BACKPOINTER_MAX_BYTES, KBest, KBestConfig, Reconstruction, default_checkpoint_interval,
    select, select_with_signed_budget,
};
