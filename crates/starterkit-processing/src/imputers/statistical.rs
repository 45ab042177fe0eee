//! Statistical imputation methods.
//!
//! Provides mean, median and mode imputation plus row removal.

use crate::error::{PreprocessingError, Result};
use crate::types::ColumnKind;
use crate::utils::{non_null_numeric_values, numeric_values, series_kind, string_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Strategy for handling missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingValueStrategy {
    /// Fill numeric columns with their mean.
    Mean,
    /// Fill numeric columns with their median.
    #[default]
    Median,
    /// Fill numeric and categorical columns with their most frequent value.
    Mode,
    /// Drop rows with a missing value in any selected column.
    Remove,
}

/// What an imputation pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImputationSummary {
    /// Null cells replaced by a statistic.
    pub values_filled: usize,
    pub rows_removed: usize,
    /// Nulls left in the selected columns afterwards.
    pub remaining_nulls: usize,
    pub processing_steps: Vec<String>,
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Handle missing values in `subset` (all columns when empty).
    pub fn handle_missing_values(
        df: &DataFrame,
        strategy: MissingValueStrategy,
        subset: &[String],
    ) -> Result<(DataFrame, ImputationSummary)> {
        let columns: Vec<String> = if subset.is_empty() {
            crate::utils::column_names(df)
        } else {
            subset.to_vec()
        };
        if let Some(missing) = columns.iter().find(|name| df.column(name.as_str()).is_err()) {
            return Err(PreprocessingError::ColumnNotFound(missing.clone()));
        }

        let mut df = df.clone();
        let mut summary = ImputationSummary::default();

        match strategy {
            MissingValueStrategy::Remove => {
                let before = df.height();
                df = Self::drop_null_rows(&df, &columns)?;
                summary.rows_removed = before - df.height();
                summary.processing_steps.push(format!(
                    "Removed {} rows with missing values",
                    summary.rows_removed
                ));
            }
            MissingValueStrategy::Mean | MissingValueStrategy::Median => {
                for name in &columns {
                    Self::fill_numeric_statistic(&mut df, name, strategy, &mut summary)?;
                }
            }
            MissingValueStrategy::Mode => {
                for name in &columns {
                    Self::fill_mode(&mut df, name, &mut summary)?;
                }
            }
        }

        summary.remaining_nulls = columns
            .iter()
            .filter_map(|name| df.column(name.as_str()).ok())
            .map(|col| col.null_count())
            .sum();

        info!(
            "Missing values ({:?}): filled {}, removed {} rows, {} remaining",
            strategy, summary.values_filled, summary.rows_removed, summary.remaining_nulls
        );

        Ok((df, summary))
    }

    fn fill_numeric_statistic(
        df: &mut DataFrame,
        name: &str,
        strategy: MissingValueStrategy,
        summary: &mut ImputationSummary,
    ) -> Result<()> {
        let series = df.column(name)?.as_materialized_series().clone();
        let missing = series.null_count();
        if missing == 0 || series_kind(&series) != ColumnKind::Numeric {
            return Ok(());
        }

        let (fill_value, method) = match strategy {
            MissingValueStrategy::Mean => (series.mean(), "mean"),
            _ => (series.median(), "median"),
        };
        let Some(fill_value) = fill_value else {
            debug!("No valid values in '{}', leaving nulls in place", name);
            return Ok(());
        };

        let filled = fill_numeric_nulls(&series, fill_value)?;
        df.replace(name, filled)?;

        summary.values_filled += missing;
        summary.processing_steps.push(format!(
            "Filled '{}' with {}: {:.2}",
            name, method, fill_value
        ));
        Ok(())
    }

    fn fill_mode(df: &mut DataFrame, name: &str, summary: &mut ImputationSummary) -> Result<()> {
        let series = df.column(name)?.as_materialized_series().clone();
        let missing = series.null_count();
        if missing == 0 {
            return Ok(());
        }

        match series_kind(&series) {
            ColumnKind::Numeric => {
                let Some(mode_val) = numeric_mode(&non_null_numeric_values(&series)?) else {
                    return Ok(());
                };
                // the mode is an observed value, so casting back is lossless
                let filled = fill_numeric_nulls(&series, mode_val)?.cast(series.dtype())?;
                df.replace(name, filled)?;
                summary.processing_steps.push(format!(
                    "Filled '{}' with mode: {}",
                    name, mode_val
                ));
            }
            ColumnKind::Categorical => {
                let Some(mode_val) = string_mode(&series)? else {
                    return Ok(());
                };
                let filled = fill_string_nulls(&series, &mode_val)?;
                df.replace(name, filled)?;
                summary.processing_steps.push(format!(
                    "Filled '{}' with mode: '{}'",
                    name, mode_val
                ));
            }
            ColumnKind::Other => {
                debug!("Mode imputation not supported for '{}', skipping", name);
                return Ok(());
            }
        }

        summary.values_filled += missing;
        Ok(())
    }

    fn drop_null_rows(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        let mut mask = BooleanChunked::full("mask".into(), true, df.height());
        for name in columns {
            let not_null = df.column(name.as_str())?.as_materialized_series().is_not_null();
            mask = &mask & &not_null;
        }
        Ok(df.filter(&mask)?)
    }
}

/// Most frequent value; ties resolve to the smallest value.
fn numeric_mode(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let run = sorted[i..].iter().take_while(|v| **v == value).count().max(1);
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        i += run;
    }
    best.map(|(value, _)| value)
}

/// Most frequent string; ties resolve to the lexicographically smallest value.
fn string_mode(series: &Series) -> Result<Option<String>> {
    let mut value_counts: BTreeMap<String, usize> = BTreeMap::new();
    for val in string_values(series)?.into_iter().flatten() {
        *value_counts.entry(val).or_insert(0) += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for (val, count) in value_counts {
        if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
            best = Some((val, count));
        }
    }
    Ok(best.map(|(val, _)| val))
}

/// Fill null values in a numeric Series with a specific value (result is Float64).
fn fill_numeric_nulls(series: &Series, fill_value: f64) -> Result<Series> {
    let values: Vec<Option<f64>> = numeric_values(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a categorical Series with a specific value.
fn fill_string_nulls(series: &Series, fill_value: &str) -> Result<Series> {
    let values: Vec<Option<String>> = string_values(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or_else(|| fill_value.to_string())))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}
