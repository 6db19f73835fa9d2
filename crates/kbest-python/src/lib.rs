// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]
// PyO3-generated wrappers can trip false-positive clippy::useless_conversion diagnostics.
#![allow(clippy::useless_conversion)]

mod error_map;
mod numpy_interop;

use crate::error_map::kbest_error_to_pyerr;
use crate::numpy_interop::extract_weights;
use kbest_core::{Budget, Interval, intervals_from_mask};
use pyo3::prelude::*;
use pyo3::types::PyModule;

fn select_owned(
    py: Python<'_>,
    weights: &Bound<'_, PyAny>,
    k: i64,
) -> PyResult<(Vec<f64>, Vec<u8>)> {
    let budget = Budget::from_signed(k).map_err(kbest_error_to_pyerr)?;
    let values = extract_weights(weights)?;
    let mask = py
        .allow_threads(|| kbest_select::select(&values, budget.get()))
        .map_err(kbest_error_to_pyerr)?;
    Ok((values, mask))
}

/// Calculate the <= k intervals that maximize the sum over the given weights.
///
/// Returns a 0/1 label per weight.
#[pyfunction]
#[pyo3(signature = (weights, k))]
fn calculate_kbest_intervals(
    py: Python<'_>,
    weights: &Bound<'_, PyAny>,
    k: i64,
) -> PyResult<Vec<i32>> {
    let (_, mask) = select_owned(py, weights, k)?;
    Ok(mask.into_iter().map(i32::from).collect())
}

/// Same selection as `calculate_kbest_intervals`, returned as
/// `(start, end, sum)` tuples with half-open bounds.
#[pyfunction(name = "kbest_intervals")]
#[pyo3(signature = (weights, k))]
fn kbest_interval_list(
    py: Python<'_>,
    weights: &Bound<'_, PyAny>,
    k: i64,
) -> PyResult<Vec<(usize, usize, f64)>> {
    let (values, mask) = select_owned(py, weights, k)?;
    let intervals: Vec<Interval> =
        intervals_from_mask(&values, &mask).map_err(kbest_error_to_pyerr)?;
    Ok(intervals
        .into_iter()
        .map(|interval| (interval.start, interval.end, interval.sum))
        .collect())
}

#[pymodule]
#[pyo3(name = "kbest_intervals")]
fn kbest_intervals_module(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add("__version__", env!("CARGO_PKG_VERSION"))?;
    module.add_function(wrap_pyfunction!(calculate_kbest_intervals, module)?)?;
    module.add_function(wrap_pyfunction!(kbest_interval_list, module)?)?;
    Ok(())
}
