//! CLI entry point for the preprocessing toolkit.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use polars::prelude::*;
use serde::Serialize;
use starterkit_processing::{
    ColumnSubset, DataCleaner, DataProfiler, DatasetOverview, EventLoop, ImputationSummary,
    LoadedDataset, MissingValueStrategy, StatisticalImputer, TaskBridge, TransformConfig,
    TransformOutcome, TransformReport, TransformationKind, TransformationPipeline,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::{error, info};

/// CLI-compatible missing value strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingStrategy {
    /// Fill numeric columns with their mean
    Mean,
    /// Fill numeric columns with their median
    Median,
    /// Fill with the most frequent value
    Mode,
    /// Drop rows with missing values
    Remove,
}

impl From<CliMissingStrategy> for MissingValueStrategy {
    fn from(cli: CliMissingStrategy) -> Self {
        match cli {
            CliMissingStrategy::Mean => MissingValueStrategy::Mean,
            CliMissingStrategy::Median => MissingValueStrategy::Median,
            CliMissingStrategy::Mode => MissingValueStrategy::Mode,
            CliMissingStrategy::Remove => MissingValueStrategy::Remove,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Column-wise data preprocessing",
    long_about = "Load a CSV/TXT, Parquet or Excel file, inspect it and apply transformations.\n\n\
                  TRANSFORMATIONS:\n  \
                  Standardization, Normalization, One-Hot Encoding, Label Encoding,\n  \
                  Log Transformation, Polynomial Transformation\n\n\
                  EXAMPLES:\n  \
                  # Inspect a dataset\n  \
                  starterkit -i data.csv --info\n\n  \
                  # Standardize and one-hot encode two columns\n  \
                  starterkit -i data.csv -t Standardization -t \"One-Hot Encoding\" -c age -c city\n\n  \
                  # Fill missing values, then emit a JSON report\n  \
                  starterkit -i data.csv --missing median -t Normalization --json"
)]
struct Args {
    /// Path to the dataset (.csv, .txt, .parquet, .xlsx or .xls)
    #[arg(short, long)]
    input: PathBuf,

    /// Transformation to apply (repeatable)
    #[arg(short, long = "transform")]
    transform: Vec<String>,

    /// Restrict cleaning and transformations to these columns (repeatable)
    ///
    /// If not specified, every column is used
    #[arg(short, long = "columns")]
    columns: Vec<String>,

    /// Remove duplicate rows before transforming
    #[arg(long)]
    dedupe: bool,

    /// Strategy for handling missing values before transforming
    #[arg(long, value_enum)]
    missing: Option<CliMissingStrategy>,

    /// Print a per-column overview of the loaded dataset
    #[arg(long)]
    info: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Number of rows of the result to print
    #[arg(long, default_value = "5")]
    rows: usize,

    /// Interval between completion checks of the background load
    #[arg(long, default_value = "1000")]
    poll_interval_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Everything the run produced, for `--json`.
#[derive(Serialize)]
struct CliReport {
    file: String,
    loaded_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    overview: Option<DatasetOverview>,
    duplicates_removed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    imputation: Option<ImputationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transformations: Option<TransformReport>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Reject unknown transformation names before doing any work
    let request = TransformationKind::parse_request(&args.transform)?;

    let config = TransformConfig::builder()
        .poll_interval(Duration::from_millis(args.poll_interval_ms))
        .build()?;
    let pipeline = TransformationPipeline::builder()
        .config(config.clone())
        .build()?;

    let event_loop = EventLoop::new();
    let bridge = TaskBridge::with_config(event_loop.clone(), &config);
    let outcome: Rc<RefCell<Option<Result<()>>>> = Rc::new(RefCell::new(None));

    info!("Loading dataset from: {}", args.input.display());
    let path = args.input.clone();
    let sink = Rc::clone(&outcome);
    bridge.submit_and_continue(
        "load",
        move || LoadedDataset::load(path),
        move |loaded| {
            let result = loaded
                .map_err(anyhow::Error::from)
                .and_then(|loaded| process(loaded, &args, &pipeline, &request));
            *sink.borrow_mut() = Some(result);
        },
    );
    event_loop.run_until_idle();

    let result = outcome
        .borrow_mut()
        .take()
        .unwrap_or_else(|| Err(anyhow!("Background load finished without a result")));
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

fn process(
    loaded: LoadedDataset,
    args: &Args,
    pipeline: &TransformationPipeline,
    request: &[TransformationKind],
) -> Result<()> {
    let mut data = loaded.data.clone();
    let overview = if args.info {
        Some(DataProfiler::overview(&data)?)
    } else {
        None
    };

    let mut duplicates_removed = 0;
    if args.dedupe {
        let (deduplicated, removed) = DataCleaner::remove_duplicates(&data, &args.columns)?;
        data = deduplicated;
        duplicates_removed = removed;
    }

    let mut imputation = None;
    if let Some(strategy) = args.missing {
        let (filled, summary) =
            StatisticalImputer::handle_missing_values(&data, strategy.into(), &args.columns)?;
        data = filled;
        imputation = Some(summary);
    }

    let subset = ColumnSubset::new(args.columns.iter().cloned());
    let (data, transformations) = match pipeline.apply(&data, request, &subset)? {
        TransformOutcome::NoOp => (data, None),
        TransformOutcome::Transformed(result) => (result.data, Some(result.report)),
    };

    let report = CliReport {
        file: loaded.file_name(),
        loaded_at: loaded.loaded_at.to_rfc3339(),
        overview,
        duplicates_removed,
        imputation,
        transformations,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human_readable_summary(&report, &data, args.rows);
    }
    Ok(())
}

/// Print the run summary.
///
/// Uses `println!` intentionally: this is the primary output, visible
/// regardless of log level.
fn print_human_readable_summary(report: &CliReport, data: &DataFrame, rows: usize) {
    println!("\n{}", "=".repeat(80));
    println!("{} (loaded {})", report.file, report.loaded_at);
    println!("{}\n", "=".repeat(80));

    if let Some(overview) = &report.overview {
        println!("DATASET OVERVIEW");
        println!("{}", "-".repeat(40));
        println!("  Rows: {}", overview.shape.0);
        println!("  Columns: {}", overview.shape.1);
        println!("  Duplicate rows: {}", overview.duplicate_rows);
        println!("  Missing values: {}", overview.total_nulls);
        println!();
        println!(
            "{:<20} {:<12} {:<12} {:<10} {:<10} {:<10}",
            "Column", "Type", "Kind", "Missing", "Unique", "Skew"
        );
        println!("{}", "-".repeat(76));
        for col in &overview.columns {
            let skew = col
                .numeric
                .as_ref()
                .and_then(|summary| summary.skewness)
                .map(|s| format!("{s:.3}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<20} {:<12} {:<12} {:<10} {:<10} {:<10}",
                truncate_str(&col.name, 19),
                truncate_str(&col.dtype, 11),
                col.kind.to_string(),
                col.null_count,
                col.unique_count,
                skew
            );
        }
        println!();

        println!(
            "{:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"
        );
        println!("{}", "-".repeat(128));
        for col in &overview.columns {
            let Some(stats) = &col.numeric else {
                continue;
            };
            let std = stats
                .std
                .map(|s| format!("{s:.3}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<20} {:>8} {:>12.3} {:>12} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>12.3}",
                truncate_str(&col.name, 19),
                stats.count,
                stats.mean,
                std,
                stats.min,
                stats.q25,
                stats.median,
                stats.q75,
                stats.max
            );
        }
        println!();
    }

    if report.duplicates_removed > 0 {
        println!("Removed {} duplicate rows", report.duplicates_removed);
    }
    if let Some(imputation) = &report.imputation {
        for step in &imputation.processing_steps {
            println!("  - {}", step);
        }
    }

    match &report.transformations {
        None => println!("No transformations requested"),
        Some(transformations) => {
            println!("TRANSFORMATIONS");
            println!("{}", "-".repeat(40));
            for step in &transformations.applied {
                println!("  [{}] {}: {}", step.kind, step.column, step.detail);
            }
            for skip in &transformations.skipped {
                println!("  [{}] {}: skipped ({:?})", skip.kind, skip.column, skip.reason);
            }
            println!(
                "  Shape {:?} -> {:?} in {} ms",
                transformations.shape_before, transformations.shape_after, transformations.duration_ms
            );
        }
    }

    println!("\n{}", data.head(Some(rows)));
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
