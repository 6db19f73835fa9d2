// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use kbest_core::{SequenceView, count_runs, masked_sum};
use kbest_eval::sum_tolerance;
use kbest_select::{best_single_interval, select};

const SIZES: [usize; 5] = [5, 13, 135, 388, 2_349];
const BUDGETS: [usize; 6] = [1, 2, 3, 10, 100, 200];
const REPEATS: usize = 5;

fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

fn uniform_open(state: &mut u64) -> f64 {
    ((lcg_next(state) >> 11) as f64 + 0.5) / (1u64 << 53) as f64
}

/// Standard-normal draws via Box-Muller.
fn standard_normal(n: usize, state: &mut u64) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let u1 = uniform_open(state);
            let u2 = uniform_open(state);
            (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
        })
        .collect()
}

#[test]
fn random_normal_grid_respects_sanity_bounds() {
    let mut state = 15_u64;

    for n in SIZES {
        for k in BUDGETS {
            for _ in 0..REPEATS {
                let values = standard_normal(n, &mut state);
                let mask = select(&values, k).expect("selection should succeed");
                let sum = masked_sum(&values, &mask);
                let view = SequenceView::new(&values).expect("finite values");
                let total = view.total();
                let tolerance = sum_tolerance(&values);

                assert_eq!(mask.len(), n);
                assert!(count_runs(&mask) <= k, "n={n} k={k}: too many runs");
                assert!(sum >= 0.0, "n={n} k={k}: negative sum {sum}");
                assert!(sum + tolerance >= total, "n={n} k={k}: {sum} < total {total}");

                let single = best_single_interval(&view).map_or(0.0, |interval| interval.sum);
                assert!(
                    sum + tolerance >= single,
                    "n={n} k={k}: {sum} < best single interval {single}"
                );
            }
        }
    }
}
