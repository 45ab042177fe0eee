//! Column statistics used to fit and gate transformations.
//!
//! All functions work on the non-null values of a column. Sums fall back to
//! values scaled by the largest magnitude when the plain sum overflows, so
//! columns near the `f64` limits still get finite statistics.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        return Some(sum / n);
    }
    let scale = max_abs(values);
    if !scale.is_finite() {
        return Some(sum / n);
    }
    Some(values.iter().map(|v| v / scale).sum::<f64>() / n * scale)
}

/// Population standard deviation (ddof = 0).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let center = mean(values)?;
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - center).powi(2)).sum::<f64>() / n;
    if variance.is_finite() {
        return Some(variance.sqrt());
    }
    let scale = max_abs(values);
    if !scale.is_finite() {
        return Some(variance.sqrt());
    }
    let scaled: Vec<f64> = values.iter().map(|v| v / scale).collect();
    population_std(&scaled).map(|std| std * scale)
}

/// Smallest and largest value.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Sample skewness (adjusted Fisher-Pearson standardized moment coefficient).
///
/// `G1 = sqrt(n(n-1)) / (n-2) * m3 / m2^1.5` with population central moments.
/// Undefined (`None`) below three values; zero for a constant column.
///
/// Moments are taken on values divided by their largest magnitude (skewness
/// is scale invariant), and moments at the level of rounding noise in the
/// mean are treated as zero.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let (lo, hi) = min_max(values)?;
    if lo == hi {
        return Some(0.0);
    }
    let scale = max_abs(values);
    if !scale.is_finite() {
        return Some(f64::NAN);
    }

    let n_f = n as f64;
    let scaled: Vec<f64> = values.iter().map(|v| v / scale).collect();
    let center = mean(&scaled)?;

    let (m2, m3) = scaled.iter().fold((0.0, 0.0), |(m2, m3), &v| {
        let d = v - center;
        (m2 + d * d, m3 + d * d * d)
    });
    let m2 = m2 / n_f;
    let m3 = m3 / n_f;

    // deviations below this are indistinguishable from error in the mean
    let noise = n_f * f64::EPSILON;
    if m2 <= noise * noise {
        return Some(0.0);
    }
    let m3 = if m3.abs() <= noise * noise * noise { 0.0 } else { m3 };

    let g1 = m3 / m2.powf(1.5);
    Some((n_f * (n_f - 1.0)).sqrt() / (n_f - 2.0) * g1)
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

/// Descriptive statistics of a numeric column.
///
/// `std` is the sample standard deviation (ddof = 1) and quartiles use
/// linear interpolation, the conventions of a typical `describe` view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skewness: Option<f64>,
}

impl NumericSummary {
    /// Summarize a numeric Series, `None` when it has no non-null values.
    pub fn from_series(series: &Series) -> PolarsResult<Option<Self>> {
        let floats = series.cast(&DataType::Float64)?;
        let ca = floats.f64()?;
        let count = ca.len() - ca.null_count();
        let quartile = |q: f64| ca.quantile(q, QuantileMethod::Linear);

        let (Some(mean), Some(min), Some(max), Some(q25), Some(median), Some(q75)) = (
            ca.mean(),
            ca.min(),
            ca.max(),
            quartile(0.25)?,
            quartile(0.5)?,
            quartile(0.75)?,
        ) else {
            return Ok(None);
        };

        let present: Vec<f64> = ca.into_iter().flatten().collect();
        Ok(Some(Self {
            count,
            mean,
            std: if count > 1 { ca.std(1) } else { None },
            min,
            q25,
            median,
            q75,
            max,
            skewness: skewness(&present),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== mean / std tests ====================

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_population_std_basic() {
        // Values: 1..5, mean 3, population variance = 10 / 5 = 2
        let std = population_std(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((std - 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_population_std_identical_values() {
        assert_eq!(population_std(&[5.0, 5.0, 5.0]), Some(0.0));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[3.0, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(min_max(&[]), None);
    }

    // ==================== skewness tests ====================

    #[test]
    fn test_skewness_symmetric() {
        let skew = skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(skew.abs() < 1e-12);
    }

    #[test]
    fn test_skewness_right_tail() {
        // sqrt(5) for four equal values and one far above them
        let skew = skewness(&[1.0, 1.0, 1.0, 1.0, 100.0]).unwrap();
        assert!((skew - 5.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_skewness_left_tail() {
        let skew = skewness(&[100.0, 100.0, 100.0, 100.0, 1.0]).unwrap();
        assert!((skew + 5.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_skewness_zero_variance() {
        assert_eq!(skewness(&[5.0, 5.0, 5.0, 5.0]), Some(0.0));
    }

    #[test]
    fn test_skewness_undefined_below_three_values() {
        assert_eq!(skewness(&[1.0, 100.0]), None);
    }

    #[test]
    fn test_skewness_constant_column_with_rounding_noise() {
        // 0.1 is not exact in binary, so a naive mean leaves a tiny m2
        assert_eq!(skewness(&[0.1; 7]), Some(0.0));
        assert_eq!(skewness(&[0.1; 3]), Some(0.0));
        assert_eq!(skewness(&[0.7; 3]), Some(0.0));
    }

    #[test]
    fn test_skewness_near_constant_column_is_still_measured() {
        let skew = skewness(&[0.1, 0.1, 0.1, 0.1, 0.1 + 1e-9]).unwrap();
        assert!((skew - 5.0f64.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_skewness_extreme_magnitudes() {
        let skew = skewness(&[1e308, 1e308, 1e308, 1e308, -1e308]).unwrap();
        assert!((skew + 5.0f64.sqrt()).abs() < 1e-9);
    }

    // ==================== summary tests ====================

    #[test]
    fn test_numeric_summary() {
        let series = Series::new("x".into(), &[Some(1i64), Some(2), None, Some(3), Some(4)]);
        let summary = NumericSummary::from_series(&series).unwrap().unwrap();

        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.q25, 1.75);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.q75, 3.25);
        // sample variance = 5 / 3
        assert!((summary.std.unwrap() - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_numeric_summary_single_and_empty() {
        let single = Series::new("x".into(), &[7.0f64]);
        let summary = NumericSummary::from_series(&single).unwrap().unwrap();
        assert_eq!(summary.std, None);
        assert_eq!(summary.median, 7.0);

        let empty = Series::new("x".into(), &[None::<f64>, None]);
        assert!(NumericSummary::from_series(&empty).unwrap().is_none());
    }

    // ==================== overflow tests ====================

    #[test]
    fn test_mean_and_std_of_extreme_values() {
        // the plain sum of these overflows to infinity
        let mean = mean(&[1e308, 1e308, -1e308]).unwrap();
        assert!((mean / 1e308 - 1.0 / 3.0).abs() < 1e-12);

        let std = population_std(&[1e308, -1e308, 0.0]).unwrap();
        assert!((std / 1e308 - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }
}
