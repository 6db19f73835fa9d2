// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use kbest_core::KbestError;
use pyo3::PyErr;
use pyo3::exceptions::{PyFloatingPointError, PyMemoryError, PyValueError};

/// Maps selection errors into Python exception classes.
pub(crate) fn kbest_error_to_pyerr(err: KbestError) -> PyErr {
    match err {
        KbestError::InvalidBudget(msg) | KbestError::InvalidInput(msg) => {
            PyValueError::new_err(msg)
        }
        KbestError::NumericalIssue(msg) => PyFloatingPointError::new_err(msg),
        KbestError::ResourceLimit(msg) => PyMemoryError::new_err(msg),
    }
}
