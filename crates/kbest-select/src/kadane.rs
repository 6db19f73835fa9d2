// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use kbest_core::{Interval, SequenceView};

/// Maximum-sum contiguous interval, or `None` when no interval has a
/// positive sum. Among equal sums the earliest-ending interval wins.
pub fn best_single_interval(x: &SequenceView<'_>) -> Option<Interval> {
    let mut best: Option<Interval> = None;
    let mut run_start = 0;
    let mut run_sum = 0.0;

    for (idx, &value) in x.values().iter().enumerate() {
        if run_sum <= 0.0 {
            run_start = idx;
            run_sum = 0.0;
        }
        run_sum += value;

        if run_sum > 0.0 && best.as_ref().is_none_or(|incumbent| run_sum > incumbent.sum) {
            best = Some(Interval {
                start: run_start,
                end: idx + 1,
                sum: run_sum,
            });
        }
    }

    best
}
