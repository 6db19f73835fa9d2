// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use kbest_core::{Interval, KbestError, SequenceView, intervals_from_mask, validate_mask};

/// Largest input accepted by [`exhaustive_best_sum`].
pub const EXHAUSTIVE_MAX_N: usize = 24;

/// Summary of a mask evaluated against its input and a run budget.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionReport {
    pub n: usize,
    pub budget: usize,
    pub run_count: usize,
    pub selected_count: usize,
    pub negatives_selected: usize,
    pub selected_sum: f64,
    /// Sum of every value; the full selection is feasible whenever the
    /// budget is at least one.
    pub total_sum: f64,
    pub within_budget: bool,
    pub intervals: Vec<Interval>,
}

/// Result of comparing a mask against the brute-force optimum.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct OptimalityCheck {
    pub report: SelectionReport,
    pub best_sum: f64,
    /// `best_sum - report.selected_sum`; never meaningfully negative for a
    /// mask within budget.
    pub gap: f64,
    pub optimal: bool,
}

/// Evaluates `mask` over `values` without assuming it came from a selector.
pub fn evaluate_selection(
    values: &[f64],
    mask: &[u8],
    budget: usize,
) -> Result<SelectionReport, KbestError> {
    let view = SequenceView::new(values)?;
    validate_mask(mask, view.len())?;
    let intervals = intervals_from_mask(values, mask)?;

    let mut selected_count = 0;
    let mut negatives_selected = 0;
    let mut selected_sum = 0.0;
    for (&value, _) in values.iter().zip(mask).filter(|(_, bit)| **bit != 0) {
        selected_count += 1;
        negatives_selected += usize::from(value < 0.0);
        selected_sum += value;
    }

    Ok(SelectionReport {
        n: values.len(),
        budget,
        run_count: intervals.len(),
        selected_count,
        negatives_selected,
        selected_sum,
        total_sum: view.total(),
        within_budget: intervals.len() <= budget,
        intervals,
    })
}

/// Brute-force optimum: the best sum and the fewest runs any mask reaching it
/// uses.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExhaustiveOptimum {
    pub best_sum: f64,
    /// Minimum run count over masks within [`sum_tolerance`] of `best_sum`.
    pub min_runs: usize,
}

fn for_each_feasible_mask(
    values: &[f64],
    budget: usize,
    mut visit: impl FnMut(f64, usize),
) -> Result<(), KbestError> {
    let view = SequenceView::new(values)?;
    let n = view.len();
    if n > EXHAUSTIVE_MAX_N {
        return Err(KbestError::resource_limit(format!(
            "exhaustive search supports n <= {EXHAUSTIVE_MAX_N}; got n={n}"
        )));
    }

    for bits in 0u32..(1u32 << n) {
        let mut runs = 0;
        let mut sum = 0.0;
        let mut previous = false;
        for (idx, &value) in values.iter().enumerate() {
            let selected = bits & (1 << idx) != 0;
            if selected {
                sum += value;
                runs += usize::from(!previous);
            }
            previous = selected;
        }
        if runs <= budget {
            visit(sum, runs);
        }
    }
    Ok(())
}

/// Best achievable selected sum with at most `budget` runs, by enumerating
/// every mask. Inputs longer than [`EXHAUSTIVE_MAX_N`] are rejected.
pub fn exhaustive_best_sum(values: &[f64], budget: usize) -> Result<f64, KbestError> {
    let mut best = 0.0_f64;
    for_each_feasible_mask(values, budget, |sum, _| {
        if sum > best {
            best = sum;
        }
    })?;
    Ok(best)
}

/// Like [`exhaustive_best_sum`], also reporting the fewest runs an optimal
/// mask needs. Enumerates twice.
pub fn exhaustive_optimum(values: &[f64], budget: usize) -> Result<ExhaustiveOptimum, KbestError> {
    let best_sum = exhaustive_best_sum(values, budget)?;
    let tolerance = sum_tolerance(values);
    let mut min_runs = usize::MAX;
    for_each_feasible_mask(values, budget, |sum, runs| {
        if (sum - best_sum).abs() <= tolerance {
            min_runs = min_runs.min(runs);
        }
    })?;
    Ok(ExhaustiveOptimum { best_sum, min_runs })
}

/// Scale-aware tolerance for comparing sums of `values` accumulated in
/// different orders.
pub fn sum_tolerance(values: &[f64]) -> f64 {
    let magnitude: f64 = values.iter().map(|value| value.abs()).sum();
    1e-9 * (1.0 + magnitude)
}

/// Evaluates `mask` and compares its sum with [`exhaustive_best_sum`].
pub fn check_optimality(
    values: &[f64],
    mask: &[u8],
    budget: usize,
) -> Result<OptimalityCheck, KbestError> {
    let report = evaluate_selection(values, mask, budget)?;
    let best_sum = exhaustive_best_sum(values, budget)?;
    let gap = best_sum - report.selected_sum;
    let optimal = report.within_budget && gap.abs() <= sum_tolerance(values);
    Ok(OptimalityCheck {
        report,
        best_sum,
        gap,
        optimal,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        EXHAUSTIVE_MAX_N, check_optimality, evaluate_selection, exhaustive_best_sum,
        exhaustive_optimum, sum_tolerance,
    };
    use kbest_core::KbestError;

    #[test]
    fn report_counts_runs_and_negatives() {
        let report = evaluate_selection(&[2.0, -1.0, 3.0, -4.0, 1.0], &[1, 1, 1, 0, 1], 1)
            .expect("valid mask");
        assert_eq!(report.run_count, 2);
        assert_eq!(report.selected_count, 4);
        assert_eq!(report.negatives_selected, 1);
        assert_eq!(report.selected_sum, 5.0);
        assert_eq!(report.total_sum, 1.0);
        assert!(!report.within_budget);
        assert_eq!(report.intervals[0].end, 3);
    }

    #[test]
    fn report_rejects_bad_masks() {
        assert!(evaluate_selection(&[1.0, 2.0], &[1], 1).is_err());
        assert!(evaluate_selection(&[1.0, 2.0], &[1, 2], 1).is_err());
        assert!(matches!(
            evaluate_selection(&[f64::NAN], &[0], 1),
            Err(KbestError::InvalidInput(_))
        ));
    }

    #[test]
    fn exhaustive_matches_hand_computed_optima() {
        let values = [5.0, -1.0, 3.0, -3.0, 1.0];
        assert_eq!(exhaustive_best_sum(&values, 0).expect("small"), 0.0);
        assert_eq!(exhaustive_best_sum(&values, 1).expect("small"), 7.0);
        assert_eq!(exhaustive_best_sum(&values, 2).expect("small"), 8.0);
        assert_eq!(exhaustive_best_sum(&values, 3).expect("small"), 9.0);
        assert_eq!(exhaustive_best_sum(&[-1.0; 4], 2).expect("small"), 0.0);
        assert_eq!(exhaustive_best_sum(&[], 2).expect("empty"), 0.0);
    }

    #[test]
    fn exhaustive_optimum_reports_fewest_runs_on_sum_ties() {
        let trailing_zero = exhaustive_optimum(&[1.0, -1.0, 0.0], 2).expect("small");
        assert_eq!(trailing_zero.best_sum, 1.0);
        assert_eq!(trailing_zero.min_runs, 1);

        let zeros_only = exhaustive_optimum(&[0.0, -1.0, 0.0], 2).expect("small");
        assert_eq!(zeros_only.best_sum, 0.0);
        assert_eq!(zeros_only.min_runs, 0);

        let split = exhaustive_optimum(&[5.0, -1.0, 3.0], 2).expect("small");
        assert_eq!(split.best_sum, 8.0);
        assert_eq!(split.min_runs, 2);

        assert!(exhaustive_optimum(&vec![0.0; EXHAUSTIVE_MAX_N + 1], 1).is_err());
    }

    #[test]
    fn exhaustive_rejects_long_inputs() {
        let values = vec![1.0; EXHAUSTIVE_MAX_N + 1];
        let err = exhaustive_best_sum(&values, 1).expect_err("too long");
        assert!(matches!(err, KbestError::ResourceLimit(_)));
    }

    #[test]
    fn optimality_check_flags_suboptimal_and_over_budget_masks() {
        let values = [5.0, -1.0, 3.0, -3.0, 1.0];
        let optimal = check_optimality(&values, &[1, 1, 1, 0, 0], 1).expect("valid");
        assert!(optimal.optimal);
        assert!(optimal.gap.abs() <= sum_tolerance(&values));

        let suboptimal = check_optimality(&values, &[1, 0, 0, 0, 0], 1).expect("valid");
        assert!(!suboptimal.optimal);
        assert_eq!(suboptimal.gap, 2.0);

        let over_budget = check_optimality(&values, &[1, 0, 1, 0, 1], 1).expect("valid");
        assert!(!over_budget.report.within_budget);
        assert!(!over_budget.optimal);
    }
}
