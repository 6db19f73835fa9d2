// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::KbestError;

/// Maximum number of maximal runs a selection mask may contain.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Budget(usize);

impl Budget {
    pub const fn new(k: usize) -> Self {
        Self(k)
    }

    /// Builds a budget from a signed count, rejecting negative values.
    pub fn from_signed(k: i64) -> Result<Self, KbestError> {
        usize::try_from(k)
            .map(Self)
            .map_err(|_| KbestError::invalid_budget(format!("k must be >= 0; got {k}")))
    }

    pub const fn get(self) -> usize {
        self.0
    }

    /// Budget actually usable for a sequence of length `n`.
    ///
    /// A length-`n` sequence never holds more than `n` runs, so larger budgets
    /// are clamped.
    pub fn effective(self, n: usize) -> usize {
        self.0.min(n)
    }
}

impl From<usize> for Budget {
    fn from(k: usize) -> Self {
        Self(k)
    }
}

impl TryFrom<i64> for Budget {
    type Error = KbestError;

    fn try_from(k: i64) -> Result<Self, Self::Error> {
        Self::from_signed(k)
    }
}

impl std::fmt::Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
