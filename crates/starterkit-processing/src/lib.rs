//! Column-wise Preprocessing Library
//!
//! Loads a tabular dataset, inspects it and applies a requested set of
//! column-wise transformations, built on Polars.
//!
//! # Overview
//!
//! - **Transformations**: standardization, min-max normalization, one-hot and
//!   label encoding, skew-gated log and polynomial (square) transformations
//! - **Inspection**: per-column dtype, missing values, cardinality and
//!   numeric statistics including skewness
//! - **Cleaning**: duplicate removal and missing value handling over a column subset
//! - **Task Bridge**: run slow work on a producer thread and pick up the
//!   result from a single-threaded loop without blocking it
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use starterkit_processing::{ColumnSubset, TransformationKind, TransformationPipeline};
//! use starterkit_processing::loader::load_dataset;
//!
//! let df = load_dataset("data.csv")?;
//!
//! let outcome = TransformationPipeline::builder()
//!     .build()?
//!     .apply(
//!         &df,
//!         &[TransformationKind::Standardize, TransformationKind::OneHotEncode],
//!         &ColumnSubset::all(),
//!     )?;
//!
//! if let Some(result) = outcome.into_result() {
//!     println!("{}", result.data.head(Some(5)));
//!     println!("{} columns transformed", result.report.applied.len());
//! }
//! ```
//!
//! # Ordering rules
//!
//! Standardization and normalization are mutually exclusive and always run
//! first; standardization wins when both are requested. All other kinds run in
//! request order. See [`TransformPlan`].
//!
//! # Background loading
//!
//! ```rust,ignore
//! use starterkit_processing::bridge::{EventLoop, TaskBridge};
//!
//! let event_loop = EventLoop::new();
//! let bridge = TaskBridge::with_config(event_loop.clone(), &TransformConfig::default());
//! bridge.submit_and_continue("load", move || load_dataset(path), |result| { /* ... */ });
//! event_loop.run_until_idle();
//! ```

pub mod bridge;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod transforms;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use bridge::{EventLoop, Scheduler, TaskBridge, TaskHandle, TaskPoll, await_and_continue, submit};
pub use cleaner::DataCleaner;
pub use config::{ConfigValidationError, TransformConfig, TransformConfigBuilder};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use imputers::{ImputationSummary, MissingValueStrategy, StatisticalImputer};
pub use loader::{DatasetFormat, LoadedDataset, load_dataset};
pub use pipeline::{
    ClosureProgressReporter, ProgressReporter, ProgressUpdate, TransformPlan, TransformStage,
    TransformationPipeline, TransformationPipelineBuilder,
};
pub use profiler::{ColumnOverview, DataProfiler, DatasetOverview, NumericSummary};
pub use types::{
    AppliedStep, ColumnKind, ColumnSubset, SkipReason, SkippedColumn, TransformOutcome,
    TransformReport, TransformResult, TransformationKind,
};
