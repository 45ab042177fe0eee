//! Pipeline module.
//!
//! This module provides the transformation pipeline and related components.

mod builder;
pub mod plan;
pub mod progress;

pub use builder::{TransformationPipeline, TransformationPipelineBuilder};
pub use plan::TransformPlan;
pub use progress::{ClosureProgressReporter, ProgressReporter, ProgressUpdate, TransformStage};
