// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::KbestError;

/// Zero-copy view over a validated one-dimensional sequence.
///
/// Construction fails fast on NaN or infinite entries, so every downstream
/// comparison of sums is well defined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceView<'a> {
    values: &'a [f64],
}

impl<'a> SequenceView<'a> {
    /// Constructs a validated view. Empty sequences are allowed.
    pub fn new(values: &'a [f64]) -> Result<Self, KbestError> {
        if let Some((idx, value)) = values
            .iter()
            .copied()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(KbestError::invalid_input(format!(
                "values must be finite: values[{idx}] = {value}"
            )));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.values.iter().fold(0.0, |acc, value| acc + value)
    }

    pub fn all_negative(&self) -> bool {
        self.values.iter().all(|&value| value < 0.0)
    }

    pub fn all_non_negative(&self) -> bool {
        self.values.iter().all(|&value| value >= 0.0)
    }
}
