//! Skew-gated distribution transforms.
//!
//! A column is only transformed when its skewness lies strictly beyond the
//! configured threshold. Columns with fewer than three values have no defined
//! skewness and are left alone.

use super::{all_finite, eligible_series, record_skip};
use crate::error::Result;
use crate::profiler::statistics::{min_max, skewness};
use crate::types::{ColumnKind, SkipReason, TransformReport, TransformationKind};
use crate::utils::{map_numeric, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Shift right-skewed columns to a minimum of 0 and apply `ln(1 + x)`.
///
/// Applies when skewness is strictly greater than `threshold`.
pub fn log_transform(
    df: &mut DataFrame,
    columns: &[String],
    threshold: f64,
    report: &mut TransformReport,
) -> Result<()> {
    let kind = TransformationKind::LogTransform;
    for name in columns {
        let Some((series, values, skew)) = gated_column(df, name, kind, report, |s| s > threshold)?
        else {
            continue;
        };
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let Some((min, _)) = min_max(&present) else {
            continue;
        };

        let transformed = map_numeric(series.name().clone(), &values, |v| (v - min).ln_1p());
        if !all_finite(&transformed)? {
            record_skip(report, kind, name, SkipReason::NumericDomain);
            continue;
        }

        df.replace(name, transformed)?;
        debug!("Log transformed '{}' (skew={:.4}, shift={:.4})", name, skew, -min);
        report.record_applied(kind, name, format!("skew={skew:.4}, shift={:.4}", -min));
    }
    Ok(())
}

/// Square left-skewed columns.
///
/// Applies when skewness is strictly less than `threshold`.
pub fn power_transform(
    df: &mut DataFrame,
    columns: &[String],
    threshold: f64,
    report: &mut TransformReport,
) -> Result<()> {
    let kind = TransformationKind::PowerTransform;
    for name in columns {
        let Some((series, values, skew)) = gated_column(df, name, kind, report, |s| s < threshold)?
        else {
            continue;
        };

        let transformed = map_numeric(series.name().clone(), &values, |v| v * v);
        if !all_finite(&transformed)? {
            record_skip(report, kind, name, SkipReason::NumericDomain);
            continue;
        }

        df.replace(name, transformed)?;
        debug!("Squared '{}' (skew={:.4})", name, skew);
        report.record_applied(kind, name, format!("skew={skew:.4}"));
    }
    Ok(())
}

/// Resolve a numeric column and check its skewness against `passes`.
///
/// Returns the column, its values and its skewness, or `None` after recording
/// why it was skipped.
fn gated_column(
    df: &DataFrame,
    name: &str,
    kind: TransformationKind,
    report: &mut TransformReport,
    passes: impl Fn(f64) -> bool,
) -> Result<Option<(Series, Vec<Option<f64>>, f64)>> {
    let Some(series) = eligible_series(df, name, kind, ColumnKind::Numeric, report) else {
        return Ok(None);
    };
    let values = numeric_values(&series)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.iter().any(|v| !v.is_finite()) {
        record_skip(report, kind, name, SkipReason::NumericDomain);
        return Ok(None);
    }

    match skewness(&present) {
        Some(skew) if passes(skew) => Ok(Some((series, values, skew))),
        skew => {
            record_skip(report, kind, name, SkipReason::SkewOutOfRange { skewness: skew });
            Ok(None)
        }
    }
}
