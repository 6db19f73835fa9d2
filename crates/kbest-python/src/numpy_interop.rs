// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use numpy::{PyArray1, PyArrayMethods, PyUntypedArray, PyUntypedArrayMethods};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;

/// Copies `weights` into an owned buffer so the GIL can be released while
/// the selector runs.
///
/// Accepts one-dimensional numpy arrays of any numeric dtype (cast to
/// float64) and Python sequences of numbers.
pub(crate) fn extract_weights(weights: &Bound<'_, PyAny>) -> PyResult<Vec<f64>> {
    if let Ok(array) = weights.downcast::<PyUntypedArray>() {
        let ndim = array.ndim();
        if ndim != 1 {
            return Err(PyValueError::new_err(format!(
                "weights must be one-dimensional; got ndim={ndim}"
            )));
        }

        if let Ok(typed) = array.downcast::<PyArray1<f64>>() {
            return Ok(typed.readonly().as_array().iter().copied().collect());
        }

        let cast = array.call_method1("astype", ("float64",))?;
        let typed = cast.downcast::<PyArray1<f64>>().map_err(|_| {
            PyTypeError::new_err("weights array could not be converted to float64")
        })?;
        return Ok(typed.readonly().as_array().iter().copied().collect());
    }

    weights.extract::<Vec<f64>>().map_err(|_| {
        PyTypeError::new_err("weights must be a 1-D numpy array or a sequence of numbers")
    })
}
