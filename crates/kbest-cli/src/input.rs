// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::CliError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A one-dimensional sequence read from disk.
#[derive(Clone, Debug)]
pub struct LoadedValues {
    pub path: PathBuf,
    pub format: &'static str,
    pub values: Vec<f64>,
}

impl LoadedValues {
    pub fn summary(&self) -> InputSummary {
        InputSummary {
            path: self.path.display().to_string(),
            format: self.format.to_string(),
            n: self.values.len(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct InputSummary {
    pub path: String,
    pub format: String,
    pub n: usize,
}

/// Loads a `.csv`, `.json` or `.txt` sequence, picking the parser by extension.
pub fn load_values(path: &Path) -> Result<LoadedValues, CliError> {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            CliError::invalid_input(format!(
                "unable to infer input format for '{}'; expected .csv, .json or .txt",
                path.display()
            ))
        })?;

    let format = match extension.as_str() {
        "csv" => "csv",
        "json" => "json",
        "txt" => "txt",
        _ => {
            return Err(CliError::invalid_input(format!(
                "unsupported input format '{extension}'; expected .csv, .json or .txt"
            )));
        }
    };

    let raw = fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;

    let values = match format {
        "csv" => parse_csv_values(&raw)?,
        "json" => parse_json_values(&raw)?,
        _ => parse_txt_values(&raw)?,
    };

    tracing::debug!(path = %path.display(), format, n = values.len(), "loaded input");

    Ok(LoadedValues {
        path: path.to_path_buf(),
        format,
        values,
    })
}

/// Converts loaded values into a 0/1 mask.
pub fn mask_from_values(values: &[f64]) -> Result<Vec<u8>, CliError> {
    values
        .iter()
        .enumerate()
        .map(|(idx, &value)| {
            if value == 0.0 {
                Ok(0)
            } else if value == 1.0 {
                Ok(1)
            } else {
                Err(CliError::invalid_input(format!(
                    "mask[{idx}] must be 0 or 1; got {value}"
                )))
            }
        })
        .collect()
}

/// Parses a single-row or single-column CSV with an optional header row.
pub fn parse_csv_values(raw: &str) -> Result<Vec<f64>, CliError> {
    let rows = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    if rows.is_empty() {
        return Ok(vec![]);
    }

    let (values, n, d) = match parse_csv_rows(&rows) {
        Ok(parsed) => parsed,
        Err(_) if rows.len() > 1 && first_row_is_header(rows[0], rows[1]) => {
            parse_csv_rows(&rows[1..])?
        }
        Err(_) if rows.len() == 1 && all_non_numeric(rows[0]) => return Ok(vec![]),
        Err(err) => return Err(err),
    };

    if n > 1 && d > 1 {
        return Err(CliError::invalid_input(format!(
            "CSV input must be a single row or a single column; got {n} rows x {d} columns"
        )));
    }
    Ok(values)
}

fn parse_csv_rows(rows: &[&str]) -> Result<(Vec<f64>, usize, usize), CliError> {
    let mut values = Vec::<f64>::new();
    let mut expected_cols: Option<usize> = None;

    for (row_idx, row) in rows.iter().enumerate() {
        let cells = row.split(',').map(str::trim).collect::<Vec<_>>();

        match expected_cols {
            Some(cols) if cells.len() != cols => {
                return Err(CliError::invalid_input(format!(
                    "CSV row {} has {} columns but expected {cols}",
                    row_idx + 1,
                    cells.len(),
                )));
            }
            Some(_) => {}
            None => expected_cols = Some(cells.len()),
        }

        for (col_idx, cell) in cells.iter().enumerate() {
            let value = cell.parse::<f64>().map_err(|_| {
                CliError::invalid_input(format!(
                    "CSV row {} column {} is not a valid float: '{cell}'",
                    row_idx + 1,
                    col_idx + 1,
                ))
            })?;
            values.push(value);
        }
    }

    Ok((values, rows.len(), expected_cols.unwrap_or(0)))
}

fn first_row_is_header(first_row: &str, second_row: &str) -> bool {
    first_row.split(',').count() == second_row.split(',').count()
        && all_non_numeric(first_row)
        && second_row
            .split(',')
            .all(|cell| cell.trim().parse::<f64>().is_ok())
}

fn all_non_numeric(row: &str) -> bool {
    row.split(',').all(|cell| cell.trim().parse::<f64>().is_err())
}

/// Parses a JSON array of numbers.
pub fn parse_json_values(raw: &str) -> Result<Vec<f64>, CliError> {
    serde_json::from_str::<Vec<f64>>(raw)
        .map_err(|source| CliError::json("input must be a JSON array of numbers", source))
}

/// Parses whitespace-separated numbers.
pub fn parse_txt_values(raw: &str) -> Result<Vec<f64>, CliError> {
    raw.split_whitespace()
        .enumerate()
        .map(|(idx, token)| {
            token.parse::<f64>().map_err(|_| {
                CliError::invalid_input(format!("token {} is not a valid float: '{token}'", idx + 1))
            })
        })
        .collect()
}
