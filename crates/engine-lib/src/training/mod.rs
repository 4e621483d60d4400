//! Model training
//!
//! - Gradient-boosted tree classifier
//! - Held-out evaluation metrics
//! - Split/fit/evaluate pipeline
//! - End-to-end retraining into the model cache

mod evaluation;
mod gbdt;
mod model;
mod pipeline;

pub use evaluation::{area_under_roc, evaluate, Evaluation};
pub use gbdt::{
    sigmoid, FitError, GradientBoostingClassifier, GradientBoostingConfig, RegressionTree,
    DEFAULT_LEARNING_RATE, DEFAULT_MAX_LEAVES, DEFAULT_MIN_SAMPLES_LEAF, DEFAULT_N_TREES,
};
pub use model::TrainedModel;
pub use pipeline::{TrainingPipeline, DEFAULT_SPLIT_SEED, TEST_FRACTION};

use crate::cache::ModelCache;
use crate::corpus::{CorpusConfig, SyntheticCorpusGenerator};
use crate::error::EngineError;
use crate::models::ModelMetrics;
use tracing::{info, warn};

/// Generate a corpus, train on it and publish the result to `cache`.
///
/// On failure the cache keeps whatever snapshot it held before.
pub fn retrain(
    cache: &ModelCache,
    corpus: CorpusConfig,
    pipeline: &TrainingPipeline,
) -> Result<ModelMetrics, EngineError> {
    info!(count = corpus.count, seed = corpus.seed, "Starting model training");

    let records = SyntheticCorpusGenerator::from(corpus).generate(corpus.count);
    match pipeline.train(&records) {
        Ok((model, metrics)) => {
            let generation = cache.set(model, metrics.clone());
            info!(generation, "Model published to cache");
            Ok(metrics)
        }
        Err(e) => {
            warn!(error = %e, ready = cache.is_ready(), "Training failed, cache left unchanged");
            Err(e)
        }
    }
}
