// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Errors surfaced by k-best interval selection.
///
/// Every failure is reported before a mask is produced; there are no partial
/// results.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KbestError {
    /// The run budget was negative or otherwise unusable.
    #[error("invalid budget: {0}")]
    InvalidBudget(String),
    /// The input sequence, mask or configuration was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// An objective left the finite range during the sweep.
    #[error("numerical issue: {0}")]
    NumericalIssue(String),
    /// A configured limit or a size computation overflowed.
    #[error("resource limit: {0}")]
    ResourceLimit(String),
}

impl KbestError {
    pub fn invalid_budget(msg: impl Into<String>) -> Self {
        Self::InvalidBudget(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn resource_limit(msg: impl Into<String>) -> Self {
        Self::ResourceLimit(msg.into())
    }

    /// Stable machine-readable code for the error category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidBudget(_) => "invalid_budget",
            Self::InvalidInput(_) => "invalid_input",
            Self::NumericalIssue(_) => "numerical_issue",
            Self::ResourceLimit(_) => "resource_limit",
        }
    }
}

/// Multiplies two sizes, reporting overflow as a resource limit.
pub fn checked_mul(lhs: usize, rhs: usize, context: &str) -> Result<usize, KbestError> {
    lhs.checked_mul(rhs)
        .ok_or_else(|| KbestError::resource_limit(format!("{context} overflow")))
}

/// Adds two sizes, reporting overflow as a resource limit.
pub fn checked_add(lhs: usize, rhs: usize, context: &str) -> Result<usize, KbestError> {
    lhs.checked_add(rhs)
        .ok_or_else(|| KbestError::resource_limit(format!("{context} overflow")))
}
