//! Split, fit and evaluate
//!
//! The pipeline only returns the `(TrainedModel, ModelMetrics)` pair;
//! publishing it to the cache is the caller's job.

use super::evaluation::evaluate;
use super::gbdt::{GradientBoostingClassifier, GradientBoostingConfig};
use super::model::TrainedModel;
use crate::error::EngineError;
use crate::models::{FeatureRecord, ModelMetrics, PredictionResult, NUM_FEATURES};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Instant;
use tracing::{debug, info};

/// Fraction of the corpus held out for evaluation
pub const TEST_FRACTION: f64 = 0.2;

/// Default seed for the train/test split
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Trains and evaluates the maintenance classifier
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    config: GradientBoostingConfig,
    split_seed: u64,
}

impl Default for TrainingPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_SPLIT_SEED)
    }
}

impl TrainingPipeline {
    pub fn new(split_seed: u64) -> Self {
        Self {
            config: GradientBoostingConfig::default(),
            split_seed,
        }
    }

    pub fn with_config(split_seed: u64, config: GradientBoostingConfig) -> Self {
        Self { config, split_seed }
    }

    pub fn config(&self) -> &GradientBoostingConfig {
        &self.config
    }

    /// Random, unstratified split into (train, test) index sets
    pub fn split(&self, len: usize) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..len).collect();
        let mut rng = StdRng::seed_from_u64(self.split_seed);
        indices.shuffle(&mut rng);

        let test_len = (len as f64 * TEST_FRACTION).round() as usize;
        let train = indices.split_off(test_len);
        (train, indices)
    }

    pub fn train(
        &self,
        corpus: &[FeatureRecord],
    ) -> Result<(TrainedModel, ModelMetrics), EngineError> {
        let start = Instant::now();

        let (train_idx, test_idx) = self.split(corpus.len());
        if train_idx.is_empty() || test_idx.is_empty() {
            return Err(EngineError::InsufficientData {
                records: corpus.len(),
            });
        }

        debug!(
            train = train_idx.len(),
            test = test_idx.len(),
            n_trees = self.config.n_trees,
            max_leaves = self.config.max_leaves,
            "Fitting gradient-boosted trees"
        );

        let rows: Vec<[f64; NUM_FEATURES]> =
            train_idx.iter().map(|&i| corpus[i].to_features()).collect();
        let labels: Vec<bool> = train_idx
            .iter()
            .map(|&i| corpus[i].needs_maintenance)
            .collect();

        let classifier = GradientBoostingClassifier::fit(&rows, &labels, &self.config)?;
        let model = TrainedModel::new(classifier);

        let actual: Vec<bool> = test_idx
            .iter()
            .map(|&i| corpus[i].needs_maintenance)
            .collect();
        let predicted: Vec<PredictionResult> =
            test_idx.iter().map(|&i| model.predict(&corpus[i])).collect();
        let eval = evaluate(&actual, &predicted);

        let elapsed = start.elapsed();
        let metrics = ModelMetrics {
            accuracy: eval.accuracy,
            positive_precision: eval.positive_precision,
            positive_recall: eval.positive_recall,
            f1_score: eval.f1_score,
            auc: eval.auc,
            training_set_size: corpus.len(),
            test_set_size: test_idx.len(),
            trained_at: chrono::Utc::now(),
            training_duration_ms: elapsed.as_millis() as u64,
        };

        info!(
            records = corpus.len(),
            accuracy = metrics.accuracy,
            precision = metrics.positive_precision,
            recall = metrics.positive_recall,
            f1 = metrics.f1_score,
            auc = metrics.auc,
            elapsed_ms = metrics.training_duration_ms,
            "Model trained"
        );

        Ok((model, metrics))
    }
}
