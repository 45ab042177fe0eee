//! Data cleaning module.
//!
//! Removes duplicate rows, optionally judging duplicates on a subset of
//! columns only. The first occurrence of every row is kept and row order is
//! preserved.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for duplicate handling.
pub struct DataCleaner;

impl DataCleaner {
    /// Remove rows that repeat an earlier row on `subset` (all columns when empty).
    ///
    /// Returns the deduplicated frame and the number of rows removed.
    pub fn remove_duplicates(df: &DataFrame, subset: &[String]) -> Result<(DataFrame, usize)> {
        Self::check_columns(df, subset)?;

        let before = df.height();
        let deduplicated = df.unique_stable(
            (!subset.is_empty()).then_some(subset),
            UniqueKeepStrategy::First,
            None,
        )?;
        let removed = before - deduplicated.height();

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            info!("Removed {} duplicate rows ({:.1}%)", removed, pct);
        } else {
            debug!("No duplicate rows found");
        }

        Ok((deduplicated, removed))
    }

    /// Count rows that repeat an earlier row on `subset` (all columns when empty).
    pub fn count_duplicates(df: &DataFrame, subset: &[String]) -> Result<usize> {
        Self::check_columns(df, subset)?;
        if df.height() == 0 {
            return Ok(0);
        }
        let unique = df.unique_stable(
            (!subset.is_empty()).then_some(subset),
            UniqueKeepStrategy::First,
            None,
        )?;
        Ok(df.height() - unique.height())
    }

    fn check_columns(df: &DataFrame, subset: &[String]) -> Result<()> {
        match subset.iter().find(|name| df.column(name.as_str()).is_err()) {
            Some(missing) => Err(PreprocessingError::ColumnNotFound(missing.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "id" => [1, 2, 2, 3, 1],
            "city" => ["a", "b", "b", "c", "z"],
        ]
        .unwrap()
    }

    #[test]
    fn test_remove_duplicates_all_columns() {
        let (deduplicated, removed) = DataCleaner::remove_duplicates(&sample(), &[]).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(deduplicated.height(), 4);
    }

    #[test]
    fn test_remove_duplicates_subset_keeps_first_in_order() {
        let subset = vec!["id".to_string()];
        let (deduplicated, removed) = DataCleaner::remove_duplicates(&sample(), &subset).unwrap();
        assert_eq!(removed, 2);

        let cities: Vec<Option<&str>> = deduplicated
            .column("city")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(cities, vec![Some("a"), Some("b"), Some("c")]);
    }

    #[test]
    fn test_remove_duplicates_unknown_column() {
        let subset = vec!["nope".to_string()];
        let err = DataCleaner::remove_duplicates(&sample(), &subset).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_count_duplicates_does_not_modify() {
        let df = sample();
        assert_eq!(DataCleaner::count_duplicates(&df, &[]).unwrap(), 1);
        assert_eq!(df.height(), 5);
    }
}
