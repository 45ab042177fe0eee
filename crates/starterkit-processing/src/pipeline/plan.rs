//! Execution order of a transformation request.

use crate::types::TransformationKind;
use serde::{Deserialize, Serialize};

/// The resolved order in which requested transformations run.
///
/// At most one scale-class kind runs, always first; `Standardize` wins when
/// both scale kinds are requested. Every other kind follows in the order it
/// was first requested, and a kind listed twice runs once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformPlan {
    pub scale: Option<TransformationKind>,
    pub steps: Vec<TransformationKind>,
}

impl TransformPlan {
    pub fn from_request(request: &[TransformationKind]) -> Self {
        let scale = [TransformationKind::Standardize, TransformationKind::Normalize]
            .into_iter()
            .find(|kind| request.contains(kind));

        let mut steps: Vec<TransformationKind> = Vec::new();
        for kind in request.iter().filter(|kind| !kind.is_scale()) {
            if !steps.contains(kind) {
                steps.push(*kind);
            }
        }

        Self { scale, steps }
    }

    pub fn is_empty(&self) -> bool {
        self.scale.is_none() && self.steps.is_empty()
    }

    /// Kinds in execution order.
    pub fn kinds(&self) -> impl Iterator<Item = TransformationKind> + '_ {
        self.scale.into_iter().chain(self.steps.iter().copied())
    }

    pub fn len(&self) -> usize {
        usize::from(self.scale.is_some()) + self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use TransformationKind::*;

    #[test]
    fn test_scale_runs_first() {
        let plan = TransformPlan::from_request(&[OneHotEncode, LogTransform, Normalize]);
        assert_eq!(
            plan.kinds().collect::<Vec<_>>(),
            vec![Normalize, OneHotEncode, LogTransform]
        );
    }

    #[test]
    fn test_standardize_wins_over_normalize() {
        let plan = TransformPlan::from_request(&[Normalize, Standardize]);
        assert_eq!(plan.scale, Some(Standardize));
        assert!(plan.steps.is_empty());
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_duplicates_run_once_at_first_position() {
        let plan =
            TransformPlan::from_request(&[LabelEncode, PowerTransform, LabelEncode, Standardize]);
        assert_eq!(plan.steps, vec![LabelEncode, PowerTransform]);
    }

    #[test]
    fn test_empty_request() {
        let plan = TransformPlan::from_request(&[]);
        assert!(plan.is_empty());
        assert_eq!(plan.kinds().count(), 0);
    }
}
