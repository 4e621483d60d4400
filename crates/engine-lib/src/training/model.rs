//! Trained model artifact

use super::gbdt::GradientBoostingClassifier;
use crate::models::{FeatureRecord, PredictionResult, FEATURE_NAMES};

/// Fitted classifier bound to the feature order it was trained with
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    classifier: GradientBoostingClassifier,
    feature_names: Vec<String>,
}

impl TrainedModel {
    pub(crate) fn new(classifier: GradientBoostingClassifier) -> Self {
        Self {
            classifier,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Score one record; the label is ignored
    pub fn predict(&self, record: &FeatureRecord) -> PredictionResult {
        let features = record.to_features();
        let score = self.classifier.decision_function(&features);
        let probability = self.classifier.predict_proba(&features);
        PredictionResult {
            label: score > 0.0,
            probability,
            score,
        }
    }

    /// Feature names in positional order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_trees(&self) -> usize {
        self.classifier.n_trees()
    }
}
