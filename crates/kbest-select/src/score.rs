// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! DP cell values and the total order used to rank transitions.
//!
//! A [`Score`] accumulates four additive quantities along a selection path.
//! Cells are compared lexicographically:
//!
//! 1. larger `sum`,
//! 2. fewer selected negative values,
//! 3. fewer runs,
//! 4. more selected positions.
//!
//! A run made only of zeros therefore never spends budget, while zeros next to
//! a run are absorbed into it. Full ties keep the incumbent transition: a run
//! is extended rather than restarted, and a position is skipped rather than
//! selected. Because each key is additive along a path, the lexicographic
//! optimum is exact.

/// Accumulated objective of a partial selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Score {
    pub sum: f64,
    pub negatives: usize,
    pub selected: usize,
    pub runs: usize,
}

impl Score {
    /// Nothing selected yet.
    pub const EMPTY: Self = Self {
        sum: 0.0,
        negatives: 0,
        selected: 0,
        runs: 0,
    };

    /// State that no selection path can reach (an open run with no budget).
    pub const UNREACHABLE: Self = Self {
        sum: f64::NEG_INFINITY,
        negatives: 0,
        selected: 0,
        runs: 0,
    };

    pub fn is_reachable(&self) -> bool {
        self.sum != f64::NEG_INFINITY
    }

    /// Appends `value` as a selected position.
    pub fn push(self, value: f64, starts_run: bool) -> Self {
        if !self.is_reachable() {
            return Self::UNREACHABLE;
        }
        Self {
            sum: self.sum + value,
            negatives: self.negatives + usize::from(value < 0.0),
            selected: self.selected + 1,
            runs: self.runs + usize::from(starts_run),
        }
    }

    /// Strictly better than `other` under the lexicographic order.
    pub fn beats(&self, other: &Self) -> bool {
        if self.sum != other.sum {
            return self.sum > other.sum;
        }
        if self.negatives != other.negatives {
            return self.negatives < other.negatives;
        }
        if self.runs != other.runs {
            return self.runs < other.runs;
        }
        self.selected > other.selected
    }
}

/// Outcome of advancing one `(runs, position)` cell by one element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Step {
    pub open: Score,
    /// `open` began a new run instead of extending the previous one.
    pub started: bool,
    pub closed: Score,
    /// `closed` took the open state, i.e. the element is selected.
    pub selected: bool,
}

/// Advances one cell: `open_prev`/`closed_prev` are the same-budget states of
/// the previous column, `closed_prev_lower` the state with one fewer run.
pub(crate) fn transition(
    open_prev: Score,
    closed_prev: Score,
    closed_prev_lower: Score,
    value: f64,
) -> Step {
    let extend = open_prev.push(value, false);
    let start = closed_prev_lower.push(value, true);
    let started = start.beats(&extend);
    let open = if started { start } else { extend };

    let selected = open.beats(&closed_prev);
    let closed = if selected { open } else { closed_prev };

    Step {
        open,
        started,
        closed,
        selected,
    }
}
