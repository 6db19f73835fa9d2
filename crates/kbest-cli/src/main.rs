// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use kbest_cli::{CliError, InputSummary, SelectOptions, load_values, mask_from_values, run_selection};
use kbest_core::{Budget, SelectionResult};
use kbest_eval::{SelectionReport, evaluate_selection, exhaustive_best_sum, sum_tolerance};
use kbest_select::{KBestConfig, Reconstruction};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "KBEST_LOG";

/// Select at most k disjoint maximum-sum intervals from a numeric sequence.
#[derive(Debug, Parser)]
#[command(name = "kbest", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the optimal selection mask.
    Select(SelectArgs),
    /// Evaluate an existing mask against its input.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct SelectArgs {
    /// Input sequence (.csv, .json or .txt).
    #[arg(long)]
    input: PathBuf,
    /// Maximum number of runs.
    #[arg(long, allow_hyphen_values = true)]
    k: i64,
    #[arg(long, value_enum, default_value_t = ReconstructionArg::Auto)]
    reconstruction: ReconstructionArg,
    /// Distance between stored DP columns; defaults to ceil(sqrt(n)).
    #[arg(long)]
    checkpoint_interval: Option<usize>,
    #[arg(long)]
    memory_budget_bytes: Option<usize>,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[arg(long)]
    input: PathBuf,
    /// 0/1 mask in any supported input format.
    #[arg(long)]
    mask: PathBuf,
    #[arg(long, allow_hyphen_values = true)]
    k: i64,
    /// Also compare against brute-force enumeration (n <= 24).
    #[arg(long)]
    exhaustive: bool,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReconstructionArg {
    Auto,
    Backpointers,
    Checkpointed,
}

impl From<ReconstructionArg> for Reconstruction {
    fn from(value: ReconstructionArg) -> Self {
        match value {
            ReconstructionArg::Auto => Self::Auto,
            ReconstructionArg::Backpointers => Self::BackPointers,
            ReconstructionArg::Checkpointed => Self::Checkpointed,
        }
    }
}

impl SelectArgs {
    fn options(&self) -> SelectOptions {
        SelectOptions {
            k: self.k,
            reconstruction: self.reconstruction.into(),
            checkpoint_interval: self.checkpoint_interval,
            memory_budget_bytes: self.memory_budget_bytes,
        }
    }
}

#[derive(Serialize)]
struct SelectOutput {
    command: &'static str,
    input: InputSummary,
    config: KBestConfig,
    run_count: usize,
    selected_count: usize,
    #[serde(flatten)]
    result: SelectionResult,
}

#[derive(Serialize)]
struct CheckOutput {
    command: &'static str,
    input: InputSummary,
    mask_input: InputSummary,
    report: SelectionReport,
    optimal_sum: f64,
    gap: f64,
    optimal: bool,
    exhaustive: Option<ExhaustiveOutput>,
}

#[derive(Serialize)]
struct ExhaustiveOutput {
    best_sum: f64,
    gap: f64,
    optimal: bool,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            err.exit()
        }
        Err(err) => return Err(CliError::Usage(err.render().to_string().trim_end().to_string())),
    };

    match cli.command {
        Command::Select(args) => handle_select(&args),
        Command::Check(args) => handle_check(&args),
    }
}

fn handle_select(args: &SelectArgs) -> Result<(), CliError> {
    let options = args.options();
    // Budget errors are reported even when the input cannot be read.
    options.config()?;
    let loaded = load_values(&args.input)?;
    let (config, result) = run_selection(&loaded.values, &options)?;

    tracing::info!(
        n = loaded.values.len(),
        k = args.k,
        runs = result.run_count(),
        selected_sum = result.selected_sum,
        "selection complete"
    );

    let output = SelectOutput {
        command: "select",
        input: loaded.summary(),
        config,
        run_count: result.run_count(),
        selected_count: result.selected_count(),
        result,
    };
    write_json_output(&output, args.output.as_deref())
}

fn handle_check(args: &CheckArgs) -> Result<(), CliError> {
    let budget = Budget::from_signed(args.k)?;
    let loaded = load_values(&args.input)?;
    let mask_loaded = load_values(&args.mask)?;
    let mask = mask_from_values(&mask_loaded.values)?;

    let report = evaluate_selection(&loaded.values, &mask, budget.get())?;
    let optimum = kbest_select::select(&loaded.values, budget.get())?;
    let optimal_sum = kbest_core::masked_sum(&loaded.values, &optimum);
    let tolerance = sum_tolerance(&loaded.values);
    let gap = optimal_sum - report.selected_sum;

    let exhaustive = if args.exhaustive {
        let best_sum = exhaustive_best_sum(&loaded.values, budget.get())?;
        let exhaustive_gap = best_sum - report.selected_sum;
        Some(ExhaustiveOutput {
            best_sum,
            gap: exhaustive_gap,
            optimal: report.within_budget && exhaustive_gap.abs() <= tolerance,
        })
    } else {
        None
    };

    let output = CheckOutput {
        command: "check",
        input: loaded.summary(),
        mask_input: mask_loaded.summary(),
        optimal: report.within_budget && gap.abs() <= tolerance,
        report,
        optimal_sum,
        gap,
        exhaustive,
    };
    write_json_output(&output, args.output.as_deref())
}

fn write_json_output<T: Serialize>(
    payload: &T,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload)
        .map_err(|source| CliError::json("failed to serialize JSON output", source))?;

    if let Some(path) = output_path {
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
    } else {
        println!("{encoded}");
        Ok(())
    }
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("error [{}]: {err}", err.code()),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, ReconstructionArg};
    use clap::Parser;
    use kbest_select::Reconstruction;

    #[test]
    fn select_arguments_parse_with_defaults() {
        let cli = Cli::try_parse_from(["kbest", "select", "--input", "w.csv", "--k", "3"])
            .expect("arguments should parse");
        let Command::Select(args) = cli.command else {
            panic!("expected select command");
        };
        assert_eq!(args.k, 3);
        assert_eq!(args.reconstruction, ReconstructionArg::Auto);
        assert!(args.output.is_none());
        assert_eq!(args.options().reconstruction, Reconstruction::Auto);
    }

    #[test]
    fn negative_budget_parses_and_fails_later() {
        let cli = Cli::try_parse_from(["kbest", "select", "--input", "w.csv", "--k", "-1"])
            .expect("negative k should reach validation");
        let Command::Select(args) = cli.command else {
            panic!("expected select command");
        };
        let err = args.options().config().expect_err("k < 0 is invalid");
        assert_eq!(err.code(), "invalid_budget");
    }

    #[test]
    fn select_accepts_strategy_and_limits() {
        let cli = Cli::try_parse_from([
            "kbest",
            "select",
            "--input",
            "w.json",
            "--k",
            "10",
            "--reconstruction",
            "checkpointed",
            "--checkpoint-interval",
            "32",
            "--memory-budget-bytes",
            "1048576",
        ])
        .expect("arguments should parse");
        let Command::Select(args) = cli.command else {
            panic!("expected select command");
        };
        let options = args.options();
        assert_eq!(options.reconstruction, Reconstruction::Checkpointed);
        assert_eq!(options.checkpoint_interval, Some(32));
        assert_eq!(options.limits().memory_budget_bytes, Some(1_048_576));
    }

    #[test]
    fn check_requires_mask() {
        assert!(Cli::try_parse_from(["kbest", "check", "--input", "w.csv", "--k", "1"]).is_err());
        let cli = Cli::try_parse_from([
            "kbest",
            "check",
            "--input",
            "w.csv",
            "--mask",
            "m.csv",
            "--k",
            "1",
            "--exhaustive",
        ])
        .expect("arguments should parse");
        let Command::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert!(args.exhaustive);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(
            Cli::try_parse_from([
                "kbest",
                "select",
                "--input",
                "w.csv",
                "--k",
                "1",
                "--reconstruction",
                "greedy",
            ])
            .is_err()
        );
    }
}
