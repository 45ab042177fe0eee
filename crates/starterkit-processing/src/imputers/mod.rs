//! Missing value handling.

pub mod statistical;

pub use statistical::{ImputationSummary, MissingValueStrategy, StatisticalImputer};
