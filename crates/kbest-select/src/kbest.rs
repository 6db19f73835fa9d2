// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::score::{Score, Step, transition};
use kbest_core::{
    Budget, Diagnostics, ExecutionContext, IntervalSelector, KbestError, Limits, SelectionResult,
    SequenceView, checked_add, checked_mul,
};
use std::borrow::Cow;
use std::mem::size_of;
use std::str::FromStr;
use std::time::Instant;

/// Back-pointer tables up to this size are preferred by [`Reconstruction::Auto`].
pub const AUTO_BACKPOINTER_MAX_BYTES: usize = 4 * 1024 * 1024;

const PROGRESS_STRIDE: usize = 256;

const FLAG_STARTED: u8 = 0b01;
const FLAG_SELECTED: u8 = 0b10;

/// How the backward pass recovers the optimal mask.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reconstruction {
    /// Back-pointers for small tables, checkpointed replay otherwise.
    #[default]
    Auto,
    /// One flag byte per `(runs, position)` cell.
    BackPointers,
    /// DP columns kept every `checkpoint_interval` positions; blocks are
    /// recomputed during the backward walk.
    Checkpointed,
}

impl Reconstruction {
    pub fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::BackPointers => "backpointers",
            Self::Checkpointed => "checkpointed",
        }
    }
}

impl FromStr for Reconstruction {
    type Err = KbestError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "backpointers" | "back_pointers" | "back-pointers" => Ok(Self::BackPointers),
            "checkpointed" | "recompute" => Ok(Self::Checkpointed),
            _ => Err(KbestError::invalid_input(format!(
                "unsupported reconstruction '{raw}'; expected one of: auto, backpointers, checkpointed"
            ))),
        }
    }
}

/// Configuration for [`KBest`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KBestConfig {
    pub budget: Budget,
    pub reconstruction: Reconstruction,
    /// Distance between stored DP columns for checkpointed reconstruction.
    /// Defaults to `ceil(sqrt(n))`.
    pub checkpoint_interval: Option<usize>,
}

impl Default for KBestConfig {
    fn default() -> Self {
        Self {
            budget: Budget::new(1),
            reconstruction: Reconstruction::Auto,
            checkpoint_interval: None,
        }
    }
}

impl KBestConfig {
    fn validate(&self) -> Result<(), KbestError> {
        if self.checkpoint_interval == Some(0) {
            return Err(KbestError::invalid_input(
                "checkpoint_interval must be >= 1; got 0",
            ));
        }
        Ok(())
    }

    fn resolved_checkpoint_interval(&self, n: usize) -> usize {
        self.checkpoint_interval
            .unwrap_or_else(|| default_checkpoint_interval(n))
    }
}

/// Exact k-best interval selector.
///
/// Maximizes the sum of selected values subject to at most `k` maximal runs
/// in O(n·min(k, n)) time. Ties between equally good masks are resolved by a
/// fixed order: fewer selected negatives, then fewer runs, then more selected
/// positions, then the leftmost mask. Inputs with no negative value select
/// everything as one run.
#[derive(Clone, Debug)]
pub struct KBest {
    config: KBestConfig,
}

impl KBest {
    pub fn new(config: KBestConfig) -> Result<Self, KbestError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Selector with budget `k` and default reconstruction.
    pub fn with_budget(k: usize) -> Self {
        Self {
            config: KBestConfig {
                budget: Budget::new(k),
                ..KBestConfig::default()
            },
        }
    }

    pub fn config(&self) -> &KBestConfig {
        &self.config
    }
}

/// Selects at most `k` maximum-sum intervals and returns the 0/1 mask.
pub fn select(values: &[f64], k: usize) -> Result<Vec<u8>, KbestError> {
    let view = SequenceView::new(values)?;
    let limits = Limits::default();
    let ctx = ExecutionContext::new(&limits);
    Ok(KBest::with_budget(k).select(&view, &ctx)?.mask)
}

/// Like [`select`], for callers holding a signed budget.
pub fn select_with_signed_budget(values: &[f64], k: i64) -> Result<Vec<u8>, KbestError> {
    let budget = Budget::from_signed(k)?;
    select(values, budget.get())
}

/// `ceil(sqrt(n))`, at least one.
pub fn default_checkpoint_interval(n: usize) -> usize {
    let root = n.isqrt();
    if root * root < n { root + 1 } else { root.max(1) }
}

/// Rolling DP column: `closed[j]` and `open[j]` for `j in 0..=k`.
#[derive(Clone, Debug)]
struct DpColumn {
    closed: Vec<Score>,
    open: Vec<Score>,
}

impl DpColumn {
    fn initial(rows: usize) -> Self {
        Self {
            closed: vec![Score::EMPTY; rows],
            open: vec![Score::UNREACHABLE; rows],
        }
    }

    /// Consumes one element in place. Rows are visited from the top so that
    /// `closed[j - 1]` still holds the previous column when row `j` reads it.
    fn advance(&mut self, value: f64, mut record: impl FnMut(usize, &Step)) {
        for j in (1..self.closed.len()).rev() {
            let step = transition(self.open[j], self.closed[j], self.closed[j - 1], value);
            self.open[j] = step.open;
            self.closed[j] = step.closed;
            record(j, &step);
        }
    }

    fn best(&self) -> Score {
        self.closed[self.closed.len() - 1]
    }
}

/// Columns of DP state stored back to back.
#[derive(Clone, Debug)]
struct ScoreGrid {
    rows: usize,
    closed: Vec<Score>,
    open: Vec<Score>,
}

impl ScoreGrid {
    fn with_columns(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            closed: vec![Score::UNREACHABLE; rows * columns],
            open: vec![Score::UNREACHABLE; rows * columns],
        }
    }

    fn store(&mut self, column_idx: usize, column: &DpColumn) {
        let range = column_idx * self.rows..(column_idx + 1) * self.rows;
        self.closed[range.clone()].copy_from_slice(&column.closed);
        self.open[range].copy_from_slice(&column.open);
    }

    fn load(&self, column_idx: usize, column: &mut DpColumn) {
        let range = column_idx * self.rows..(column_idx + 1) * self.rows;
        column.closed.copy_from_slice(&self.closed[range.clone()]);
        column.open.copy_from_slice(&self.open[range]);
    }

    fn cell(&self, column_idx: usize, j: usize) -> (Score, Score) {
        let idx = column_idx * self.rows + j;
        (self.open[idx], self.closed[idx])
    }
}

/// Winning transitions at cell `(j, i)`, where `i` counts consumed elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Choice {
    started: bool,
    selected: bool,
}

impl Choice {
    const NONE: Self = Self {
        started: false,
        selected: false,
    };

    fn from_flags(flags: u8) -> Self {
        Self {
            started: flags & FLAG_STARTED != 0,
            selected: flags & FLAG_SELECTED != 0,
        }
    }

    fn flags(step: &Step) -> u8 {
        let mut flags = 0;
        if step.started {
            flags |= FLAG_STARTED;
        }
        if step.selected {
            flags |= FLAG_SELECTED;
        }
        flags
    }
}

trait ChoiceSource {
    fn choice(&mut self, j: usize, i: usize) -> Choice;
}

/// Flag byte per cell, laid out column by column.
struct BackPointerTable {
    rows: usize,
    flags: Vec<u8>,
}

impl ChoiceSource for BackPointerTable {
    fn choice(&mut self, j: usize, i: usize) -> Choice {
        Choice::from_flags(self.flags[(i - 1) * self.rows + j])
    }
}

/// Replays one block of columns from its checkpoint and re-derives each
/// transition by comparing the candidate scores again.
struct CheckpointReplay<'a> {
    values: &'a [f64],
    interval: usize,
    checkpoints: ScoreGrid,
    block: ScoreGrid,
    loaded_block: Option<usize>,
    scratch: DpColumn,
    cells_replayed: usize,
}

impl CheckpointReplay<'_> {
    fn load_block(&mut self, block_idx: usize) {
        let start = block_idx * self.interval;
        let values = self.values;
        let end = (start + self.interval).min(values.len());
        self.checkpoints.load(block_idx, &mut self.scratch);
        for (offset, &value) in values[start..end].iter().enumerate() {
            self.block.store(offset, &self.scratch);
            if start + offset + 1 < end {
                self.scratch.advance(value, |_, _| {});
                self.cells_replayed += self.block.rows - 1;
            }
        }
        self.loaded_block = Some(block_idx);
        tracing::trace!(block_idx, start, end, "replayed checkpoint block");
    }
}

impl ChoiceSource for CheckpointReplay<'_> {
    fn choice(&mut self, j: usize, i: usize) -> Choice {
        if j == 0 {
            return Choice::NONE;
        }
        let block_idx = (i - 1) / self.interval;
        if self.loaded_block != Some(block_idx) {
            self.load_block(block_idx);
        }
        let offset = i - 1 - block_idx * self.interval;
        let (open_prev, closed_prev) = self.block.cell(offset, j);
        let (_, closed_prev_lower) = self.block.cell(offset, j - 1);
        let step = transition(open_prev, closed_prev, closed_prev_lower, self.values[i - 1]);
        Choice {
            started: step.started,
            selected: step.selected,
        }
    }
}

/// Walks from `(k, n, closed)` back to the first element, marking every
/// position whose reconstructed state is open.
fn reconstruct_mask(
    n: usize,
    k: usize,
    source: &mut impl ChoiceSource,
) -> Result<Vec<u8>, KbestError> {
    let mut mask = vec![0u8; n];
    let mut j = k;
    let mut open = false;

    for i in (1..=n).rev() {
        let choice = source.choice(j, i);
        if !open && !choice.selected {
            continue;
        }

        mask[i - 1] = 1;
        if choice.started {
            j = j.checked_sub(1).ok_or_else(|| {
                KbestError::numerical_issue(format!(
                    "backtracking failed: run started with no budget left at position {}",
                    i - 1
                ))
            })?;
            open = false;
        } else {
            open = true;
        }
    }

    Ok(mask)
}

#[derive(Default, Clone, Copy, Debug)]
struct RuntimeStats {
    cells_evaluated: usize,
    state_bytes: usize,
}

fn score_column_bytes(rows: usize) -> Result<usize, KbestError> {
    let scores = checked_mul(rows, 2, "dp column score count")?;
    checked_mul(scores, size_of::<Score>(), "dp column bytes")
}

/// Bytes held by the back-pointer strategy: rolling column, flag table, mask.
fn estimate_backpointer_bytes(n: usize, rows: usize) -> Result<usize, KbestError> {
    let column = score_column_bytes(rows)?;
    let flags = checked_mul(n, rows, "backpointer cell count")?;
    let base = checked_add(column, flags, "backpointer state bytes")?;
    checked_add(base, n, "backpointer state bytes")
}

/// Bytes held by the checkpointed strategy: rolling and scratch columns,
/// stored checkpoints, one replay block, mask.
fn estimate_checkpointed_bytes(
    n: usize,
    rows: usize,
    interval: usize,
) -> Result<usize, KbestError> {
    let column = score_column_bytes(rows)?;
    let checkpoint_count = n.div_ceil(interval);
    let stored_columns = checked_add(checkpoint_count, interval.min(n), "checkpoint column count")?;
    let stored_columns = checked_add(stored_columns, 2, "checkpoint column count")?;
    let stored = checked_mul(stored_columns, column, "checkpoint state bytes")?;
    checked_add(stored, n, "checkpoint state bytes")
}

fn ensure_finite_objective(column: &DpColumn, position: usize) -> Result<(), KbestError> {
    let best = column.best();
    if best.sum == f64::INFINITY {
        return Err(KbestError::numerical_issue(format!(
            "non-finite objective after position {position}: selected sum overflowed"
        )));
    }
    Ok(())
}

fn full_selection(values: &[f64]) -> Result<Score, KbestError> {
    let mut score = Score::EMPTY;
    for (position, &value) in values.iter().enumerate() {
        score = score.push(value, position == 0);
        if score.sum == f64::INFINITY {
            return Err(KbestError::numerical_issue(format!(
                "non-finite objective after position {position}: selected sum overflowed"
            )));
        }
    }
    Ok(score)
}

fn report_sweep_progress(ctx: &ExecutionContext<'_>, position: usize, n: usize) {
    if position.is_multiple_of(PROGRESS_STRIDE) {
        ctx.report_progress(position as f32 / n as f32);
    }
}

fn run_with_backpointers(
    values: &[f64],
    k: usize,
    ctx: &ExecutionContext<'_>,
    runtime: &mut RuntimeStats,
) -> Result<(Vec<u8>, Score), KbestError> {
    let n = values.len();
    let rows = k + 1;
    let mut column = DpColumn::initial(rows);
    let mut table = BackPointerTable {
        rows,
        flags: vec![0u8; checked_mul(n, rows, "backpointer cell count")?],
    };

    for (i, &value) in values.iter().enumerate() {
        report_sweep_progress(ctx, i, n);
        let cells = &mut table.flags[i * rows..(i + 1) * rows];
        column.advance(value, |j, step| cells[j] = Choice::flags(step));
        ensure_finite_objective(&column, i)?;
        runtime.cells_evaluated += k;
    }

    let best = column.best();
    let mask = reconstruct_mask(n, k, &mut table)?;
    Ok((mask, best))
}

fn run_checkpointed(
    values: &[f64],
    k: usize,
    interval: usize,
    ctx: &ExecutionContext<'_>,
    runtime: &mut RuntimeStats,
) -> Result<(Vec<u8>, Score), KbestError> {
    let n = values.len();
    let rows = k + 1;
    let mut column = DpColumn::initial(rows);
    let mut checkpoints = ScoreGrid::with_columns(rows, n.div_ceil(interval));

    for (i, &value) in values.iter().enumerate() {
        report_sweep_progress(ctx, i, n);
        if i.is_multiple_of(interval) {
            checkpoints.store(i / interval, &column);
        }
        column.advance(value, |_, _| {});
        ensure_finite_objective(&column, i)?;
        runtime.cells_evaluated += k;
    }

    let best = column.best();
    let mut replay = CheckpointReplay {
        values,
        interval,
        checkpoints,
        block: ScoreGrid::with_columns(rows, interval.min(n)),
        loaded_block: None,
        scratch: DpColumn::initial(rows),
        cells_replayed: 0,
    };
    let mask = reconstruct_mask(n, k, &mut replay)?;
    runtime.cells_evaluated += replay.cells_replayed;
    Ok((mask, best))
}

impl IntervalSelector for KBest {
    fn select(
        &self,
        x: &SequenceView<'_>,
        ctx: &ExecutionContext<'_>,
    ) -> Result<SelectionResult, KbestError> {
        let started_at = Instant::now();
        let values = x.values();
        let n = values.len();
        let budget = self.config.budget.get();
        let k = self.config.budget.effective(n);
        let mut runtime = RuntimeStats::default();
        let mut notes = vec![];
        let mut warnings = vec![];

        if k > 0 && x.all_negative() {
            notes.push("all values negative; the empty selection is optimal".to_string());
        } else if k > 0 && x.all_non_negative() {
            notes.push("all values non-negative; the full selection is optimal".to_string());
        }
        if budget > n && n > 0 {
            notes.push(format!(
                "budget k={budget} exceeds n={n}; using effective budget {k}"
            ));
        }

        let (mask, best, reconstruction) = if n == 0 || k == 0 {
            notes.push("trivial selection: empty input or zero budget".to_string());
            (vec![0u8; n], Score::EMPTY, Cow::Borrowed("none"))
        } else if x.all_non_negative() {
            // The sweep never opens a run of zeros, so all-zero inputs would
            // come back empty.
            (vec![1u8; n], full_selection(values)?, Cow::Borrowed("none"))
        } else {
            let rows = k + 1;
            let interval = self.config.resolved_checkpoint_interval(n);
            let strategy = match self.config.reconstruction {
                Reconstruction::Auto => {
                    let backpointer_bytes = estimate_backpointer_bytes(n, rows)?;
                    if backpointer_bytes <= AUTO_BACKPOINTER_MAX_BYTES
                        && ctx.fits_memory_budget(backpointer_bytes)
                    {
                        Reconstruction::BackPointers
                    } else {
                        Reconstruction::Checkpointed
                    }
                }
                explicit => explicit,
            };

            runtime.state_bytes = match strategy {
                Reconstruction::Checkpointed => estimate_checkpointed_bytes(n, rows, interval)?,
                _ => estimate_backpointer_bytes(n, rows)?,
            };
            ctx.enforce_memory_budget(runtime.state_bytes, "kbest dp state")?;

            tracing::debug!(
                n,
                budget,
                effective_budget = k,
                reconstruction = strategy.name(),
                state_bytes = runtime.state_bytes,
                "starting kbest sweep"
            );

            let (mask, best) = match strategy {
                Reconstruction::Checkpointed => {
                    notes.push(format!("checkpoint_interval={interval}"));
                    run_checkpointed(values, k, interval, ctx, &mut runtime)?
                }
                _ => run_with_backpointers(values, k, ctx, &mut runtime)?,
            };
            (mask, best, Cow::Borrowed(strategy.name()))
        };

        if best.runs > k {
            warnings.push(format!(
                "reconstructed optimum reports {} runs for effective budget {k}",
                best.runs
            ));
        }

        let runtime_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);

        ctx.record_scalar(
            "select.kbest.cells_evaluated",
            runtime.cells_evaluated as f64,
        );
        ctx.record_scalar("select.kbest.state_bytes", runtime.state_bytes as f64);
        ctx.record_scalar("select.kbest.runtime_ms", runtime_ms as f64);
        ctx.report_progress(1.0);

        notes.push(format!(
            "optimal_sum={}, runs={}, selected={}, negatives_selected={}",
            best.sum, best.runs, best.selected, best.negatives
        ));

        tracing::debug!(
            n,
            optimal_sum = best.sum,
            runs = best.runs,
            cells_evaluated = runtime.cells_evaluated,
            runtime_ms,
            "kbest selection finished"
        );

        let diagnostics = Diagnostics {
            n,
            budget,
            effective_budget: k,
            runtime_ms: Some(runtime_ms),
            notes,
            warnings,
            algorithm: Cow::Borrowed("kbest"),
            reconstruction,
            state_bytes: Some(runtime.state_bytes),
            cells_evaluated: Some(runtime.cells_evaluated),
            ..Diagnostics::default()
        };

        SelectionResult::new(x, mask, diagnostics)
    }
}
