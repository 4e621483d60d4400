//! Error taxonomy for training and inference

use crate::training::FitError;
use thiserror::Error;

/// Errors surfaced by the prediction engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Corpus is empty, or too small to yield both a train and a test split
    #[error("insufficient training data: {records} records")]
    InsufficientData { records: usize },

    #[error("model training failed: {0}")]
    TrainingFailed(#[source] FitError),

    /// Inference attempted before a model was published to the cache
    #[error("maintenance model is not trained yet")]
    ModelNotReady,

    #[error("vehicle lookup failed: {0}")]
    VehicleLookup(#[source] anyhow::Error),
}

impl EngineError {
    /// Whether the caller should retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::ModelNotReady)
    }
}

impl From<FitError> for EngineError {
    fn from(err: FitError) -> Self {
        EngineError::TrainingFailed(err)
    }
}
