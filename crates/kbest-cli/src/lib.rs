// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Library half of the `kbest` binary: input loading, errors and the
//! selection entry point shared by the subcommands.

pub mod error;
pub mod input;

pub use error::CliError;
pub use input::{InputSummary, LoadedValues, load_values, mask_from_values};

use kbest_core::{Budget, ExecutionContext, IntervalSelector, Limits, SelectionResult, SequenceView};
use kbest_select::{KBest, KBestConfig, Reconstruction};

/// Selector options as they arrive from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOptions {
    pub k: i64,
    pub reconstruction: Reconstruction,
    pub checkpoint_interval: Option<usize>,
    pub memory_budget_bytes: Option<usize>,
}

impl SelectOptions {
    pub fn config(&self) -> Result<KBestConfig, CliError> {
        Ok(KBestConfig {
            budget: Budget::from_signed(self.k)?,
            reconstruction: self.reconstruction,
            checkpoint_interval: self.checkpoint_interval,
        })
    }

    pub fn limits(&self) -> Limits {
        Limits {
            memory_budget_bytes: self.memory_budget_bytes,
        }
    }
}

/// Validates the budget, then the input, then runs the selector.
pub fn run_selection(
    values: &[f64],
    options: &SelectOptions,
) -> Result<(KBestConfig, SelectionResult), CliError> {
    let config = options.config()?;
    let view = SequenceView::new(values)?;
    let limits = options.limits();
    let ctx = ExecutionContext::new(&limits);
    let selector = KBest::new(config.clone())?;
    let result = selector.select(&view, &ctx)?;
    Ok((config, result))
}
