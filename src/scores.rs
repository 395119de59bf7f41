//! Ranked predictions: thresholding and ordering of output activations.

use serde::{Deserialize, Serialize};

/// One category that cleared the confidence threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub category: String,
    /// Raw sigmoid activation of the category's output unit, in [0, 1].
    pub confidence: f64,
}

/// Keep every category whose activation is strictly above `threshold` and
/// sort descending by confidence.
///
/// Outputs are independent sigmoids, so confidences need not sum to 1.
/// Equal confidences keep category-index order.
pub fn rank(activations: &[f64], categories: &[String], threshold: f64) -> Vec<Prediction> {
    let mut predictions: Vec<Prediction> = activations
        .iter()
        .zip(categories)
        .filter(|&(&a, _)| a > threshold)
        .map(|(&confidence, category)| Prediction {
            category: category.clone(),
            confidence,
        })
        .collect();
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    predictions
}
