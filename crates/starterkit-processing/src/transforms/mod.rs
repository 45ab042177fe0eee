//! Column-wise transformations.
//!
//! Every transform works in place on a frame the pipeline owns, walks the
//! resolved column list in order and records each column it touches or skips
//! in the [`TransformReport`]. Per-column problems never fail the call.

pub mod distribution;
pub mod encoding;
pub mod scaling;

pub use distribution::{log_transform, power_transform};
pub use encoding::{label_encode, one_hot_encode};
pub use scaling::{normalize, standardize};

use crate::types::{ColumnKind, SkipReason, TransformReport, TransformationKind};
use crate::utils::series_kind;
use polars::prelude::*;
use tracing::{debug, warn};

/// Record a skipped column and log it at the level its reason deserves.
pub(crate) fn record_skip(
    report: &mut TransformReport,
    kind: TransformationKind,
    column: &str,
    reason: SkipReason,
) {
    match &reason {
        SkipReason::UnknownColumn => {
            warn!("{}: column '{}' not found, skipping", kind, column)
        }
        SkipReason::NumericDomain => {
            warn!("{}: column '{}' would produce non-finite values, skipping", kind, column)
        }
        SkipReason::NameCollision { name } => {
            warn!("{}: column '{}' already exists, skipping '{}'", kind, name, column)
        }
        SkipReason::TypeMismatch { column_kind } => {
            debug!("{}: '{}' is {}, skipping", kind, column, column_kind)
        }
        SkipReason::SkewOutOfRange { skewness } => {
            debug!("{}: '{}' skewness {:?} outside range, skipping", kind, column, skewness)
        }
    }
    report.record_skipped(kind, column, reason);
}

/// Look up `column` and check it has the kind `kind` operates on.
///
/// Returns `None` (after recording the skip) for unknown columns and kind
/// mismatches.
pub(crate) fn eligible_series(
    df: &DataFrame,
    column: &str,
    kind: TransformationKind,
    expected: ColumnKind,
    report: &mut TransformReport,
) -> Option<Series> {
    let Ok(col) = df.column(column) else {
        record_skip(report, kind, column, SkipReason::UnknownColumn);
        return None;
    };
    let series = col.as_materialized_series();
    let column_kind = series_kind(series);
    if column_kind != expected {
        record_skip(report, kind, column, SkipReason::TypeMismatch { column_kind });
        return None;
    }
    Some(series.clone())
}

/// Whether every non-null value of a Float64 transform output is finite.
pub(crate) fn all_finite(series: &Series) -> PolarsResult<bool> {
    Ok(series.f64()?.into_iter().flatten().all(f64::is_finite))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_series_records_unknown_and_mismatch() {
        let df = df!["a" => [1.0, 2.0], "b" => ["x", "y"]].unwrap();
        let mut report = TransformReport::default();
        let kind = TransformationKind::Standardize;

        assert!(eligible_series(&df, "a", kind, ColumnKind::Numeric, &mut report).is_some());
        assert!(eligible_series(&df, "b", kind, ColumnKind::Numeric, &mut report).is_none());
        assert!(eligible_series(&df, "zzz", kind, ColumnKind::Numeric, &mut report).is_none());

        assert_eq!(report.skipped.len(), 2);
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::TypeMismatch {
                column_kind: ColumnKind::Categorical
            }
        );
        assert_eq!(report.skipped[1].reason, SkipReason::UnknownColumn);
    }

    #[test]
    fn test_all_finite_ignores_nulls() {
        let ok = Series::new("x".into(), &[Some(1.0), None, Some(-2.0)]);
        let bad = Series::new("x".into(), &[Some(1.0), Some(f64::INFINITY)]);
        assert!(all_finite(&ok).unwrap());
        assert!(!all_finite(&bad).unwrap());
    }
}
