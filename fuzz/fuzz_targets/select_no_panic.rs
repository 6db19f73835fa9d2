// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use kbest_core::{
    Budget, ExecutionContext, IntervalSelector, KbestError, Limits, SequenceView, count_runs,
    mask_from_intervals, masked_sum,
};
use kbest_eval::{EXHAUSTIVE_MAX_N, exhaustive_best_sum, sum_tolerance};
use kbest_select::{KBest, KBestConfig, Reconstruction};
use libfuzzer_sys::fuzz_target;

fn build_config(strategy_seed: u8, k: usize, interval_seed: u8) -> KBestConfig {
    KBestConfig {
        budget: Budget::new(k),
        reconstruction: match strategy_seed % 3 {
            0 => Reconstruction::Auto,
            1 => Reconstruction::BackPointers,
            _ => Reconstruction::Checkpointed,
        },
        checkpoint_interval: if interval_seed & 1 == 0 {
            None
        } else {
            Some(common::bounded(interval_seed >> 1, 1, 64))
        },
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);
    let config = build_config(cursor.next_u8(), usize::from(cursor.next_u8()), cursor.next_u8());
    let k = config.budget.get();
    let raw_mode = cursor.next_u8();
    let memory_budget = match cursor.next_u8() {
        0 => Some(usize::from(cursor.next_u8()) * 64),
        _ => None,
    };

    let values = match raw_mode % 3 {
        0 => common::decode_f64_chunks(cursor.remaining(), 256, true),
        1 => common::decode_f64_chunks(cursor.remaining(), 256, false),
        _ => common::decode_grid_values(cursor.remaining(), 256),
    };

    let Ok(view) = SequenceView::new(&values) else {
        assert!(values.iter().any(|value| !value.is_finite()));
        return;
    };
    let limits = Limits {
        memory_budget_bytes: memory_budget,
    };
    let ctx = ExecutionContext::new(&limits);
    let selector = KBest::new(config).expect("fuzz configs are valid");

    let result = match selector.select(&view, &ctx) {
        Ok(result) => result,
        Err(KbestError::NumericalIssue(_) | KbestError::ResourceLimit(_)) => return,
        Err(err) => panic!("unexpected error for finite input: {err}"),
    };

    assert_eq!(result.mask.len(), values.len());
    assert!(count_runs(&result.mask) <= k);
    let rebuilt = mask_from_intervals(&result.intervals, values.len()).expect("intervals in bounds");
    assert_eq!(rebuilt, result.mask);
    let sum = masked_sum(&values, &result.mask);
    assert!(sum >= 0.0 || !sum.is_finite());

    if values.len() <= EXHAUSTIVE_MAX_N.min(16) {
        let best = exhaustive_best_sum(&values, k).expect("small input");
        if best.is_finite() && sum.is_finite() {
            assert!((best - sum).abs() <= sum_tolerance(&values) * 1e3);
        }
    }
});
