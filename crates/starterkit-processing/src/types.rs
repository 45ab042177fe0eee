use crate::error::{PreprocessingError, Result};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Transformation kinds
// ============================================================================

/// The closed set of column-wise transformations the pipeline understands.
///
/// Each kind has a stable, case-sensitive identifier (see [`Self::identifier`])
/// which is what callers such as a UI checkbox list pass in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransformationKind {
    /// Zero mean, unit variance per numeric column.
    #[serde(rename = "Standardization")]
    Standardize,
    /// Min-max rescale to [0, 1] per numeric column.
    #[serde(rename = "Normalization")]
    Normalize,
    /// One indicator column per distinct categorical value.
    #[serde(rename = "One-Hot Encoding")]
    OneHotEncode,
    /// Dense integer codes for categorical values.
    #[serde(rename = "Label Encoding")]
    LabelEncode,
    /// `ln(1 + x - min)` on right-skewed numeric columns.
    #[serde(rename = "Log Transformation")]
    LogTransform,
    /// `x^2` on left-skewed numeric columns.
    #[serde(rename = "Polynomial Transformation")]
    PowerTransform,
}

impl TransformationKind {
    /// Every kind, in declaration order.
    pub const ALL: [TransformationKind; 6] = [
        Self::Standardize,
        Self::Normalize,
        Self::OneHotEncode,
        Self::LabelEncode,
        Self::LogTransform,
        Self::PowerTransform,
    ];

    /// Stable identifier used by callers.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Standardize => "Standardization",
            Self::Normalize => "Normalization",
            Self::OneHotEncode => "One-Hot Encoding",
            Self::LabelEncode => "Label Encoding",
            Self::LogTransform => "Log Transformation",
            Self::PowerTransform => "Polynomial Transformation",
        }
    }

    /// Whether this kind belongs to the mutually exclusive scale phase.
    pub fn is_scale(&self) -> bool {
        matches!(self, Self::Standardize | Self::Normalize)
    }

    /// Parse a list of identifiers, failing on the first unknown one.
    pub fn parse_request<S: AsRef<str>>(names: &[S]) -> Result<Vec<TransformationKind>> {
        names.iter().map(|name| name.as_ref().parse()).collect()
    }
}

impl FromStr for TransformationKind {
    type Err = PreprocessingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.identifier() == s)
            .ok_or_else(|| PreprocessingError::InvalidRequestKind(s.to_string()))
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

// ============================================================================
// Column classification
// ============================================================================

/// How a column participates in transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or float values.
    Numeric,
    /// Text or categorical values.
    Categorical,
    /// Anything else (boolean, temporal, nested); never transformed.
    Other,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// The columns a request is restricted to. Empty means every column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSubset(Vec<String>);

impl ColumnSubset {
    /// Subset covering every column of whatever dataset it is resolved against.
    pub fn all() -> Self {
        Self(Vec::new())
    }

    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Resolve against a dataset: the subset itself when non-empty (first
    /// occurrence of each name kept), otherwise every column in dataset order.
    pub fn resolve(&self, df: &DataFrame) -> Vec<String> {
        if self.is_all() {
            return crate::utils::column_names(df);
        }

        let mut resolved: Vec<String> = Vec::with_capacity(self.0.len());
        for name in &self.0 {
            if !resolved.contains(name) {
                resolved.push(name.clone());
            }
        }
        resolved
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnSubset {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

// ============================================================================
// Transformation results
// ============================================================================

/// Why a column was left untouched by a transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The subset named a column the dataset does not have.
    UnknownColumn,
    /// The column kind does not fit the transformation.
    TypeMismatch { column_kind: ColumnKind },
    /// The transformation would produce non-finite values.
    NumericDomain,
    /// Skewness did not pass the gate (or is undefined for fewer than 3 values).
    SkewOutOfRange { skewness: Option<f64> },
    /// An indicator column name is already taken.
    NameCollision { name: String },
}

/// One column a transformation modified or produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedStep {
    pub kind: TransformationKind,
    pub column: String,
    /// Human-readable description, e.g. the fitted parameters.
    pub detail: String,
}

/// One column a transformation skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedColumn {
    pub kind: TransformationKind,
    pub column: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Summary of a single pipeline invocation, for UI display or logs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformReport {
    /// Kinds in the order they actually ran.
    pub executed: Vec<TransformationKind>,
    pub applied: Vec<AppliedStep>,
    pub skipped: Vec<SkippedColumn>,
    pub shape_before: (usize, usize),
    pub shape_after: (usize, usize),
    pub duration_ms: u64,
}

impl TransformReport {
    pub fn record_applied(
        &mut self,
        kind: TransformationKind,
        column: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.applied.push(AppliedStep {
            kind,
            column: column.into(),
            detail: detail.into(),
        });
    }

    pub fn record_skipped(
        &mut self,
        kind: TransformationKind,
        column: impl Into<String>,
        reason: SkipReason,
    ) {
        self.skipped.push(SkippedColumn {
            kind,
            column: column.into(),
            reason,
        });
    }

    /// Columns touched by `kind`, in the order they were processed.
    pub fn applied_columns(&self, kind: TransformationKind) -> Vec<&str> {
        self.applied
            .iter()
            .filter(|step| step.kind == kind)
            .map(|step| step.column.as_str())
            .collect()
    }

    /// Whether `column` was skipped by `kind`.
    pub fn was_skipped(&self, kind: TransformationKind, column: &str) -> bool {
        self.skipped
            .iter()
            .any(|skip| skip.kind == kind && skip.column == column)
    }
}

/// A transformed dataset together with what happened to it.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub data: DataFrame,
    pub report: TransformReport,
}

/// Result of [`TransformationPipeline::apply`](crate::TransformationPipeline::apply).
#[derive(Debug, Clone)]
pub enum TransformOutcome {
    /// No transformation was requested; the input is unchanged.
    NoOp,
    Transformed(TransformResult),
}

impl TransformOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// The transformed result, if any transformation ran.
    pub fn into_result(self) -> Option<TransformResult> {
        match self {
            Self::NoOp => None,
            Self::Transformed(result) => Some(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_identifiers_round_trip() {
        for kind in TransformationKind::ALL {
            assert_eq!(kind.identifier().parse::<TransformationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let err = "standardization".parse::<TransformationKind>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_REQUEST_KIND");
    }

    #[test]
    fn test_parse_request_fails_on_unknown() {
        let result = TransformationKind::parse_request(&["Normalization", "Box-Cox"]);
        assert!(matches!(
            result,
            Err(PreprocessingError::InvalidRequestKind(name)) if name == "Box-Cox"
        ));
    }

    #[test]
    fn test_kind_serializes_as_identifier() {
        let json = serde_json::to_string(&TransformationKind::OneHotEncode).unwrap();
        assert_eq!(json, "\"One-Hot Encoding\"");
    }

    #[test]
    fn test_subset_resolve_all_uses_dataset_order() {
        let df = df!["b" => [1, 2], "a" => ["x", "y"]].unwrap();
        assert_eq!(ColumnSubset::all().resolve(&df), vec!["b", "a"]);
    }

    #[test]
    fn test_subset_resolve_collapses_duplicates() {
        let df = df!["a" => [1, 2]].unwrap();
        let subset = ColumnSubset::new(["a", "missing", "a"]);
        assert_eq!(subset.resolve(&df), vec!["a", "missing"]);
    }

    #[test]
    fn test_skip_reason_serialization() {
        let skip = SkippedColumn {
            kind: TransformationKind::LogTransform,
            column: "price".to_string(),
            reason: SkipReason::NumericDomain,
        };
        let json = serde_json::to_string(&skip).unwrap();
        assert!(json.contains("\"reason\":\"numeric_domain\""));
        assert!(json.contains("Log Transformation"));
    }
}
