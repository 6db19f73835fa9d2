// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::diagnostics::Diagnostics;
use crate::intervals::{Interval, intervals_from_mask, masked_sum};
use crate::{ExecutionContext, KbestError, SequenceView};

/// Selector contract: full sequence in, full selection out.
pub trait IntervalSelector {
    fn select(
        &self,
        x: &SequenceView<'_>,
        ctx: &ExecutionContext<'_>,
    ) -> Result<SelectionResult, KbestError>;
}

/// Output of a selection run: the mask plus everything derived from it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionResult {
    pub mask: Vec<u8>,
    pub intervals: Vec<Interval>,
    pub selected_sum: f64,
    pub diagnostics: Diagnostics,
}

impl SelectionResult {
    /// Builds a result from a mask, validating it against the input and the
    /// run budget recorded in `diagnostics`.
    pub fn new(
        x: &SequenceView<'_>,
        mask: Vec<u8>,
        diagnostics: Diagnostics,
    ) -> Result<Self, KbestError> {
        let intervals = intervals_from_mask(x.values(), &mask)?;
        if intervals.len() > diagnostics.budget {
            return Err(KbestError::invalid_input(format!(
                "selection uses {} runs but budget is {}",
                intervals.len(),
                diagnostics.budget
            )));
        }
        let selected_sum = masked_sum(x.values(), &mask);
        Ok(Self {
            mask,
            intervals,
            selected_sum,
            diagnostics,
        })
    }

    pub fn run_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn selected_count(&self) -> usize {
        self.mask.iter().filter(|&&bit| bit != 0).count()
    }
}
