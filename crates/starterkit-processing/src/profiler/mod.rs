//! Dataset inspection.
//!
//! Produces the per-column overview a caller shows right after loading a
//! file: dtype, column kind, missing values, cardinality and, for numeric
//! columns, descriptive statistics including skewness.

pub mod statistics;

pub use statistics::NumericSummary;

use crate::cleaner::DataCleaner;
use crate::error::Result;
use crate::types::ColumnKind;
use crate::utils::series_kind;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Overview of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    /// Polars data type as string ("Int64", "Float64", "String").
    pub dtype: String,
    pub kind: ColumnKind,
    pub null_count: usize,
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

/// Overview of a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub shape: (usize, usize),
    pub columns: Vec<ColumnOverview>,
    /// Rows that repeat an earlier row across all columns.
    pub duplicate_rows: usize,
    pub total_nulls: usize,
}

impl DatasetOverview {
    pub fn column(&self, name: &str) -> Option<&ColumnOverview> {
        self.columns.iter().find(|col| col.name == name)
    }
}

/// Builds [`DatasetOverview`]s.
pub struct DataProfiler;

impl DataProfiler {
    /// Inspect every column of a dataset.
    pub fn overview(df: &DataFrame) -> Result<DatasetOverview> {
        let mut columns = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let kind = series_kind(series);
            let numeric = match kind {
                ColumnKind::Numeric => NumericSummary::from_series(series)?,
                _ => None,
            };

            columns.push(ColumnOverview {
                name: series.name().to_string(),
                dtype: series.dtype().to_string(),
                kind,
                null_count: series.null_count(),
                unique_count: series.n_unique()?,
                numeric,
            });
        }

        let duplicate_rows = DataCleaner::count_duplicates(df, &[])?;
        let total_nulls = columns.iter().map(|col| col.null_count).sum();

        debug!(
            "Profiled {} columns, {} duplicate rows, {} nulls",
            columns.len(),
            duplicate_rows,
            total_nulls
        );

        Ok(DatasetOverview {
            shape: df.shape(),
            columns,
            duplicate_rows,
            total_nulls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_classifies_columns() {
        let df = df![
            "age" => [Some(20i64), None, Some(40)],
            "city" => ["a", "b", "a"],
            "flag" => [true, false, true],
        ]
        .unwrap();

        let overview = DataProfiler::overview(&df).unwrap();
        assert_eq!(overview.shape, (3, 3));

        let age = overview.column("age").unwrap();
        assert_eq!(age.kind, ColumnKind::Numeric);
        assert_eq!(age.null_count, 1);
        let age_stats = age.numeric.as_ref().unwrap();
        assert_eq!(age_stats.mean, 30.0);
        assert_eq!(age_stats.median, 30.0);
        assert_eq!((age_stats.q25, age_stats.q75), (25.0, 35.0));

        let city = overview.column("city").unwrap();
        assert_eq!(city.kind, ColumnKind::Categorical);
        assert_eq!(city.unique_count, 2);
        assert!(city.numeric.is_none());

        assert_eq!(overview.column("flag").unwrap().kind, ColumnKind::Other);
        assert_eq!(overview.total_nulls, 1);
    }

    #[test]
    fn test_overview_counts_duplicate_rows() {
        let df = df![
            "a" => [1, 1, 2, 1],
            "b" => ["x", "x", "y", "x"],
        ]
        .unwrap();

        let overview = DataProfiler::overview(&df).unwrap();
        assert_eq!(overview.duplicate_rows, 2);
    }
}
