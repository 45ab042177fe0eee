//! Main transformation pipeline.
//!
//! This module provides the `TransformationPipeline` struct and its builder.

use crate::config::TransformConfig;
use crate::error::{PreprocessingError, Result};
use crate::pipeline::plan::TransformPlan;
use crate::pipeline::progress::{ClosureProgressReporter, ProgressReporter, ProgressUpdate};
use crate::transforms;
use crate::types::{
    ColumnSubset, TransformOutcome, TransformReport, TransformResult, TransformationKind,
};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Applies a requested set of transformations to a column subset.
///
/// Use [`TransformationPipeline::builder()`] to configure thresholds and
/// progress reporting.
///
/// # Example
///
/// ```rust,ignore
/// use starterkit_processing::{ColumnSubset, TransformationPipeline};
///
/// let outcome = TransformationPipeline::builder()
///     .build()?
///     .apply_named(&df, &["Standardization", "One-Hot Encoding"], &[] as &[&str])?;
/// ```
pub struct TransformationPipeline {
    config: TransformConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// The pipeline may be moved into a background producer
static_assertions::assert_impl_all!(TransformationPipeline: Send, Sync);

impl Default for TransformationPipeline {
    fn default() -> Self {
        Self {
            config: TransformConfig::default(),
            progress_reporter: None,
        }
    }
}

impl TransformationPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> TransformationPipelineBuilder {
        TransformationPipelineBuilder::default()
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Apply `request` to the columns in `subset` (all columns when empty).
    ///
    /// The input frame is never modified. An empty request returns
    /// [`TransformOutcome::NoOp`].
    pub fn apply(
        &self,
        df: &DataFrame,
        request: &[TransformationKind],
        subset: &ColumnSubset,
    ) -> Result<TransformOutcome> {
        let plan = TransformPlan::from_request(request);
        if plan.is_empty() {
            debug!("Empty transformation request, nothing to do");
            return Ok(TransformOutcome::NoOp);
        }

        let start_time = Instant::now();
        let columns = subset.resolve(df);
        let total = plan.len();
        info!(
            "Applying {} transformation(s) to {} column(s)",
            total,
            columns.len()
        );

        let mut data = df.clone();
        let mut report = TransformReport {
            shape_before: df.shape(),
            ..TransformReport::default()
        };

        for (step, kind) in plan.kinds().enumerate() {
            self.report_progress(ProgressUpdate::step(kind, step, total));
            self.run_step(kind, &mut data, &columns, &mut report)?;
            report.executed.push(kind);
        }

        report.shape_after = data.shape();
        report.duration_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            "Transformations complete: {} applied, {} skipped, shape {:?} -> {:?}",
            report.applied.len(),
            report.skipped.len(),
            report.shape_before,
            report.shape_after
        );
        self.report_progress(ProgressUpdate::complete("Transformations complete"));

        Ok(TransformOutcome::Transformed(TransformResult { data, report }))
    }

    /// Apply transformations given by their stable identifiers.
    ///
    /// An unrecognized identifier fails the whole request with
    /// [`PreprocessingError::InvalidRequestKind`] before any work happens.
    pub fn apply_named<S, C>(
        &self,
        df: &DataFrame,
        request: &[S],
        columns: &[C],
    ) -> Result<TransformOutcome>
    where
        S: AsRef<str>,
        C: AsRef<str>,
    {
        let kinds = TransformationKind::parse_request(request)?;
        let subset = ColumnSubset::new(columns.iter().map(|c| c.as_ref().to_string()));
        self.apply(df, &kinds, &subset)
    }

    fn run_step(
        &self,
        kind: TransformationKind,
        df: &mut DataFrame,
        columns: &[String],
        report: &mut TransformReport,
    ) -> Result<()> {
        match kind {
            TransformationKind::Standardize => transforms::standardize(df, columns, report),
            TransformationKind::Normalize => transforms::normalize(df, columns, report),
            TransformationKind::OneHotEncode => transforms::one_hot_encode(
                df,
                columns,
                self.config.drop_encoded_source,
                report,
            ),
            TransformationKind::LabelEncode => transforms::label_encode(df, columns, report),
            TransformationKind::LogTransform => {
                transforms::log_transform(df, columns, self.config.log_skew_threshold, report)
            }
            TransformationKind::PowerTransform => {
                transforms::power_transform(df, columns, self.config.power_skew_threshold, report)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Builder for creating a [`TransformationPipeline`] instance.
#[derive(Default)]
pub struct TransformationPipelineBuilder {
    config: Option<TransformConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(TransformationPipelineBuilder: Send);

impl TransformationPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: TransformConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<TransformationPipeline> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| PreprocessingError::InvalidConfig(e.to_string()))?;

        Ok(TransformationPipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
