//! Top-k selection over a classification score distribution.

use std::sync::Arc;

use crate::core::errors::{InferenceError, SimpleError};
use crate::core::predictions::Prediction;

/// Selects the top-k predictions from a model's output distribution.
///
/// The selector owns the label set; the index of each label is its class ID.
/// Scores are read as-is from the provider's output: no smoothing,
/// calibration, or thresholding.
#[derive(Debug, Clone)]
pub struct Topk {
    class_names: Vec<Arc<str>>,
}

impl Topk {
    /// Creates a selector with class names from an iterator.
    ///
    /// The iteration order defines the class IDs.
    pub fn from_class_names<I, S>(class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            class_names: class_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of classes in the label set.
    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Looks up a class name by ID.
    pub fn class_name(&self, id: usize) -> Option<&Arc<str>> {
        self.class_names.get(id)
    }

    /// Selects the top `k` predictions from one score distribution.
    ///
    /// Returns exactly `min(k, num_classes)` predictions sorted by
    /// descending score. Ties keep the provider's output order: the sort is
    /// stable over class IDs.
    ///
    /// # Arguments
    ///
    /// * `scores` - One score per class, indexed by class ID.
    /// * `k` - Number of top predictions to select.
    ///
    /// # Returns
    ///
    /// The ranked predictions, or an [`InferenceError`] if the score vector
    /// does not match the label set.
    pub fn select(&self, scores: &[f32], k: usize) -> Result<Vec<Prediction>, InferenceError> {
        if scores.len() != self.class_names.len() {
            return Err(InferenceError::runtime(
                "score vector does not match label set",
                SimpleError::new(format!(
                    "{} scores for {} classes",
                    scores.len(),
                    self.class_names.len()
                )),
            ));
        }

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(order
            .into_iter()
            .take(k)
            .map(|id| Prediction::new(self.class_names[id].clone(), scores[id]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> Topk {
        Topk::from_class_names(["tabby cat", "tiger cat", "Egyptian cat", "lynx"])
    }

    #[test]
    fn test_select_orders_by_descending_score() {
        let result = selector().select(&[0.04, 0.82, 0.09, 0.05], 3).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(&*result[0].label, "tiger cat");
        assert_eq!(result[0].confidence, 0.82);
        assert_eq!(&*result[1].label, "Egyptian cat");
        assert_eq!(&*result[2].label, "lynx");
    }

    #[test]
    fn test_select_caps_k_at_class_count() {
        let result = selector().select(&[0.1, 0.2, 0.3, 0.4], 10).unwrap();
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_ties_keep_class_id_order() {
        let result = selector().select(&[0.25, 0.25, 0.25, 0.25], 4).unwrap();
        let labels: Vec<&str> = result.iter().map(|p| &*p.label).collect();
        assert_eq!(labels, ["tabby cat", "tiger cat", "Egyptian cat", "lynx"]);
    }

    #[test]
    fn test_score_length_mismatch_is_runtime_failure() {
        let result = selector().select(&[0.5, 0.5], 3);
        assert!(matches!(
            result,
            Err(InferenceError::RuntimeFailure { .. })
        ));
    }

    #[test]
    fn test_zero_k_yields_empty() {
        let result = selector().select(&[0.1, 0.2, 0.3, 0.4], 0).unwrap();
        assert!(result.is_empty());
    }
}
