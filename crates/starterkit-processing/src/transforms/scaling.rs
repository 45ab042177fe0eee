//! Scale-class transforms: standardization and min-max normalization.
//!
//! Parameters are fit per column on its non-null values, per call. Outputs are
//! Float64 and nulls are preserved.

use super::{all_finite, eligible_series, record_skip};
use crate::error::Result;
use crate::profiler::statistics::{mean, min_max, population_std};
use crate::types::{ColumnKind, SkipReason, TransformReport, TransformationKind};
use crate::utils::{map_numeric, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Rescale numeric columns to zero mean and unit (population) variance.
///
/// A constant column uses a scale of 1 and becomes all zeros.
pub fn standardize(
    df: &mut DataFrame,
    columns: &[String],
    report: &mut TransformReport,
) -> Result<()> {
    let kind = TransformationKind::Standardize;
    for name in columns {
        let Some(series) = eligible_series(df, name, kind, ColumnKind::Numeric, report) else {
            continue;
        };
        let values = numeric_values(&series)?;
        let Some(present) = finite_values(&values) else {
            record_skip(report, kind, name, SkipReason::NumericDomain);
            continue;
        };

        let (Some(center), Some(std)) = (mean(&present), population_std(&present)) else {
            record_skip(report, kind, name, SkipReason::NumericDomain);
            continue;
        };
        let scale = if std == 0.0 { 1.0 } else { std };

        let transformed = map_numeric(series.name().clone(), &values, |v| {
            let z = (v - center) / scale;
            if z.is_finite() { z } else { v / scale - center / scale }
        });
        if !all_finite(&transformed)? {
            record_skip(report, kind, name, SkipReason::NumericDomain);
            continue;
        }

        df.replace(name, transformed)?;
        debug!("Standardized '{}' (mean={:.4}, std={:.4})", name, center, std);
        report.record_applied(kind, name, format!("mean={center:.4}, std={std:.4}"));
    }
    Ok(())
}

/// Rescale numeric columns to the [0, 1] range.
///
/// A constant column uses a range of 1 and becomes all zeros.
pub fn normalize(
    df: &mut DataFrame,
    columns: &[String],
    report: &mut TransformReport,
) -> Result<()> {
    let kind = TransformationKind::Normalize;
    for name in columns {
        let Some(series) = eligible_series(df, name, kind, ColumnKind::Numeric, report) else {
            continue;
        };
        let values = numeric_values(&series)?;
        let Some((min, max)) = finite_values(&values).and_then(|present| min_max(&present)) else {
            record_skip(report, kind, name, SkipReason::NumericDomain);
            continue;
        };
        let transformed = if (max - min).is_finite() {
            let range = if max == min { 1.0 } else { max - min };
            map_numeric(series.name().clone(), &values, |v| (v - min) / range)
        } else {
            // the span exceeds f64::MAX, so work on halved values
            let half_range = max / 2.0 - min / 2.0;
            map_numeric(series.name().clone(), &values, |v| (v / 2.0 - min / 2.0) / half_range)
        };
        if !all_finite(&transformed)? {
            record_skip(report, kind, name, SkipReason::NumericDomain);
            continue;
        }

        df.replace(name, transformed)?;
        debug!("Normalized '{}' (min={:.4}, max={:.4})", name, min, max);
        report.record_applied(kind, name, format!("min={min:.4}, max={max:.4}"));
    }
    Ok(())
}

/// Non-null values, or `None` when there are none or any is non-finite.
fn finite_values(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    (!present.is_empty() && present.iter().all(|v| v.is_finite())).then_some(present)
}
