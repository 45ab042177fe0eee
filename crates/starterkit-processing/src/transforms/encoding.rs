//! Categorical encodings.
//!
//! Distinct values are collected in ordered collections so indicator order and
//! label codes only depend on the data.

use super::{eligible_series, record_skip};
use crate::error::Result;
use crate::types::{ColumnKind, SkipReason, TransformReport, TransformationKind};
use crate::utils::string_values;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Append one Boolean indicator column per distinct value of each categorical
/// column, named `<column>_<value>` and ordered by value.
///
/// Null rows are `false` in every indicator. When `drop_source` is false the
/// encoded column stays in place.
pub fn one_hot_encode(
    df: &mut DataFrame,
    columns: &[String],
    drop_source: bool,
    report: &mut TransformReport,
) -> Result<()> {
    let kind = TransformationKind::OneHotEncode;
    for name in columns {
        let Some(series) = eligible_series(df, name, kind, ColumnKind::Categorical, report) else {
            continue;
        };
        let values = string_values(&series)?;
        let categories: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();

        let indicator_names: Vec<String> = categories
            .iter()
            .map(|category| format!("{name}_{category}"))
            .collect();
        if let Some(taken) = indicator_names
            .iter()
            .find(|indicator| df.column(indicator.as_str()).is_ok())
        {
            record_skip(
                report,
                kind,
                name,
                SkipReason::NameCollision {
                    name: taken.clone(),
                },
            );
            continue;
        }

        for (category, indicator) in categories.iter().zip(&indicator_names) {
            let flags: Vec<bool> = values
                .iter()
                .map(|v| v.as_deref() == Some(*category))
                .collect();
            df.with_column(Series::new(indicator.as_str().into(), flags))?;
        }
        if drop_source {
            df.drop_in_place(name)?;
        }

        debug!("One-hot encoded '{}' into {} columns", name, indicator_names.len());
        report.record_applied(kind, name, indicator_names.join(", "));
    }
    Ok(())
}

/// Replace each categorical column by dense Int64 codes `0..k` assigned in
/// sorted value order. Nulls stay null.
pub fn label_encode(
    df: &mut DataFrame,
    columns: &[String],
    report: &mut TransformReport,
) -> Result<()> {
    let kind = TransformationKind::LabelEncode;
    for name in columns {
        let Some(series) = eligible_series(df, name, kind, ColumnKind::Categorical, report) else {
            continue;
        };
        let values = string_values(&series)?;
        let categories: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();
        let codes: BTreeMap<&str, i64> = categories.into_iter().zip(0..).collect();

        let encoded: Vec<Option<i64>> = values
            .iter()
            .map(|v| v.as_deref().and_then(|v| codes.get(v).copied()))
            .collect();
        df.replace(name, Series::new(series.name().clone(), encoded))?;

        debug!("Label encoded '{}' ({} classes)", name, codes.len());
        report.record_applied(kind, name, format!("{} classes", codes.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bools(df: &DataFrame, name: &str) -> Vec<Option<bool>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .bool()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn codes(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_one_hot_appends_sorted_indicators_and_keeps_source() {
        let mut df = df![
            "id" => [1, 2, 3, 4],
            "color" => [Some("red"), Some("blue"), None, Some("red")],
        ]
        .unwrap();
        let mut report = TransformReport::default();

        one_hot_encode(&mut df, &["color".to_string()], false, &mut report).unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["id", "color", "color_blue", "color_red"]);
        assert_eq!(
            bools(&df, "color_blue"),
            vec![Some(false), Some(true), Some(false), Some(false)]
        );
        assert_eq!(
            bools(&df, "color_red"),
            vec![Some(true), Some(false), Some(false), Some(true)]
        );
    }

    #[test]
    fn test_one_hot_can_drop_source() {
        let mut df = df!["c" => ["x", "y"]].unwrap();
        let mut report = TransformReport::default();

        one_hot_encode(&mut df, &["c".to_string()], true, &mut report).unwrap();

        assert!(df.column("c").is_err());
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_one_hot_name_collision_skips_column() {
        let mut df = df![
            "c" => ["x", "y"],
            "c_x" => [1, 2],
        ]
        .unwrap();
        let mut report = TransformReport::default();

        one_hot_encode(&mut df, &["c".to_string()], false, &mut report).unwrap();

        assert_eq!(df.width(), 2);
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::NameCollision {
                name: "c_x".to_string()
            }
        );
    }

    #[test]
    fn test_one_hot_skips_numeric() {
        let mut df = df!["n" => [1.0, 2.0]].unwrap();
        let mut report = TransformReport::default();

        one_hot_encode(&mut df, &["n".to_string()], false, &mut report).unwrap();

        assert_eq!(df.width(), 1);
        assert!(report.was_skipped(TransformationKind::OneHotEncode, "n"));
    }

    #[test]
    fn test_label_encode_sorted_codes() {
        let mut df = df!["city" => [Some("paris"), Some("berlin"), None, Some("paris"), Some("athens")]]
            .unwrap();
        let mut report = TransformReport::default();

        label_encode(&mut df, &["city".to_string()], &mut report).unwrap();

        assert_eq!(df.column("city").unwrap().dtype(), &DataType::Int64);
        assert_eq!(
            codes(&df, "city"),
            vec![Some(2), Some(1), None, Some(2), Some(0)]
        );
    }

    #[test]
    fn test_label_encode_is_deterministic() {
        let df = df!["c" => ["b", "a", "c", "a"]].unwrap();

        let mut first = df.clone();
        let mut second = df.clone();
        label_encode(&mut first, &["c".to_string()], &mut TransformReport::default()).unwrap();
        label_encode(&mut second, &["c".to_string()], &mut TransformReport::default()).unwrap();

        assert!(first.equals_missing(&second));
    }
}
