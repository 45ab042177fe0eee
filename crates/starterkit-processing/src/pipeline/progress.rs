//! Progress reporting for the transformation pipeline.
//!
//! The pipeline emits one update per executed transformation plus a final
//! completion update. Reporting never changes results.
//!
//! # Example
//!
//! ```rust,ignore
//! use starterkit_processing::TransformationPipeline;
//!
//! let pipeline = TransformationPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//! ```

use crate::types::TransformationKind;
use serde::{Deserialize, Serialize};

/// Stages of a pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformStage {
    /// Standardization or normalization
    Scaling,
    /// One-hot or label encoding
    Encoding,
    /// Skew-gated log or polynomial transformation
    Distribution,
    Complete,
}

impl TransformStage {
    pub fn for_kind(kind: TransformationKind) -> Self {
        match kind {
            TransformationKind::Standardize | TransformationKind::Normalize => Self::Scaling,
            TransformationKind::OneHotEncode | TransformationKind::LabelEncode => Self::Encoding,
            TransformationKind::LogTransform | TransformationKind::PowerTransform => {
                Self::Distribution
            }
        }
    }

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Scaling => "Scaling",
            Self::Encoding => "Encoding",
            Self::Distribution => "Reshaping Distributions",
            Self::Complete => "Complete",
        }
    }
}

/// A single progress update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: TransformStage,

    /// The transformation being run, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransformationKind>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Update for the `step`-th (0-based) of `total` planned transformations.
    pub fn step(kind: TransformationKind, step: usize, total: usize) -> Self {
        let progress = if total > 0 {
            step as f32 / total as f32
        } else {
            0.0
        };
        Self {
            stage: TransformStage::for_kind(kind),
            kind: Some(kind),
            progress: progress.clamp(0.0, 1.0),
            message: format!("Applying {} ({}/{})", kind, step + 1, total),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: TransformStage::Complete,
            kind: None,
            progress: 1.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during a pipeline run.
///
/// Implementations must be `Send + Sync` so a pipeline can be moved into a
/// background producer.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
