// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::KbestError;

/// Half-open run `[start, end)` of selected positions and the sum it covers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
    pub sum: f64,
}

impl Interval {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}): sum={}", self.start, self.end, self.sum)
    }
}

/// Checks that `mask` holds only 0/1 entries and matches `n`.
pub fn validate_mask(mask: &[u8], n: usize) -> Result<(), KbestError> {
    if mask.len() != n {
        return Err(KbestError::invalid_input(format!(
            "mask length mismatch: got {}, expected {n}",
            mask.len()
        )));
    }
    if let Some((idx, value)) = mask
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| *value > 1)
    {
        return Err(KbestError::invalid_input(format!(
            "mask must contain only 0/1 entries: mask[{idx}] = {value}"
        )));
    }
    Ok(())
}

/// Number of maximal runs of 1s.
pub fn count_runs(mask: &[u8]) -> usize {
    let mut runs = 0;
    let mut previous = 0u8;
    for &bit in mask {
        if bit != 0 && previous == 0 {
            runs += 1;
        }
        previous = bit;
    }
    runs
}

/// Sum of the values under the mask, accumulated left to right from `+0.0`.
pub fn masked_sum(values: &[f64], mask: &[u8]) -> f64 {
    values
        .iter()
        .zip(mask)
        .filter(|(_, bit)| **bit != 0)
        .fold(0.0, |acc, (value, _)| acc + value)
}

/// Splits a mask into its maximal runs, annotated with their sums.
pub fn intervals_from_mask(values: &[f64], mask: &[u8]) -> Result<Vec<Interval>, KbestError> {
    validate_mask(mask, values.len())?;

    let mut intervals = Vec::new();
    let mut current: Option<Interval> = None;
    for (idx, (&value, &bit)) in values.iter().zip(mask).enumerate() {
        if bit == 0 {
            intervals.extend(current.take());
        } else if let Some(run) = current.as_mut() {
            run.end = idx + 1;
            run.sum += value;
        } else {
            current = Some(Interval {
                start: idx,
                end: idx + 1,
                sum: value,
            });
        }
    }
    intervals.extend(current);
    Ok(intervals)
}

/// Expands intervals back into a 0/1 mask of length `n`.
///
/// Intervals must lie inside `0..n`; overlapping intervals simply mark the
/// same positions twice.
pub fn mask_from_intervals(intervals: &[Interval], n: usize) -> Result<Vec<u8>, KbestError> {
    let mut mask = vec![0u8; n];
    for interval in intervals {
        if interval.start > interval.end || interval.end > n {
            return Err(KbestError::invalid_input(format!(
                "interval [{}, {}) is out of bounds for n={n}",
                interval.start, interval.end
            )));
        }
        mask[interval.start..interval.end].fill(1);
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::{
        Interval, count_runs, intervals_from_mask, mask_from_intervals, masked_sum, validate_mask,
    };
    use crate::KbestError;

    #[test]
    fn count_runs_counts_maximal_blocks() {
        assert_eq!(count_runs(&[]), 0);
        assert_eq!(count_runs(&[0, 0, 0]), 0);
        assert_eq!(count_runs(&[1, 1, 1]), 1);
        assert_eq!(count_runs(&[1, 0, 1, 0, 1]), 3);
        assert_eq!(count_runs(&[0, 1, 1, 0, 0, 1]), 2);
    }

    #[test]
    fn masked_sum_ignores_unselected_positions() {
        let values = [5.0, -1.0, 3.0, -3.0, 1.0];
        assert_eq!(masked_sum(&values, &[1, 0, 1, 0, 1]), 9.0);
        assert_eq!(masked_sum(&values, &[0, 0, 0, 0, 0]), 0.0);
    }

    #[test]
    fn intervals_follow_runs() {
        let values = [5.0, -1.0, 3.0, 2.0, 1.0];
        let intervals = intervals_from_mask(&values, &[1, 0, 1, 1, 0]).expect("valid mask");
        assert_eq!(
            intervals,
            vec![
                Interval {
                    start: 0,
                    end: 1,
                    sum: 5.0
                },
                Interval {
                    start: 2,
                    end: 4,
                    sum: 5.0
                },
            ]
        );

        let trailing = intervals_from_mask(&values, &[0, 0, 0, 1, 1]).expect("valid mask");
        assert_eq!(trailing.len(), 1);
        assert_eq!(trailing[0].start, 3);
        assert_eq!(trailing[0].end, 5);
        assert_eq!(trailing[0].len(), 2);
    }

    #[test]
    fn mask_roundtrips_through_intervals() {
        let values = [0.7, 2.6, -1.2, 0.3, 1.4, -0.6, 2.1];
        let mask = vec![1, 1, 0, 1, 1, 0, 1];
        let intervals = intervals_from_mask(&values, &mask).expect("valid mask");
        assert_eq!(intervals.len(), count_runs(&mask));
        let rebuilt = mask_from_intervals(&intervals, values.len()).expect("in bounds");
        assert_eq!(rebuilt, mask);
    }

    #[test]
    fn invalid_masks_are_rejected() {
        let err = validate_mask(&[1, 0], 3).expect_err("length mismatch");
        assert!(err.to_string().contains("mask length mismatch"));

        let err = validate_mask(&[1, 2, 0], 3).expect_err("non-binary entry");
        match err {
            KbestError::InvalidInput(msg) => assert!(msg.contains("mask[1] = 2")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn out_of_bounds_interval_is_rejected() {
        let interval = Interval {
            start: 2,
            end: 6,
            sum: 1.0,
        };
        assert!(mask_from_intervals(&[interval], 5).is_err());
    }
}
