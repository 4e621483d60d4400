//! Process-wide holder of the current trained model
//!
//! The model and its metrics live together in one immutable snapshot. `set`
//! swaps the snapshot pointer under a write lock, so a reader always sees a
//! model paired with the metrics from the same training run.

use crate::models::ModelMetrics;
use crate::training::TrainedModel;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// One training generation: model, metrics and a monotonically increasing id
#[derive(Debug)]
pub struct ModelSnapshot {
    pub model: Arc<TrainedModel>,
    pub metrics: ModelMetrics,
    pub generation: u64,
}

/// Shared cache of the latest trained model; construct once and pass around
/// as `Arc<ModelCache>`
#[derive(Debug, Default)]
pub struct ModelCache {
    current: RwLock<Option<Arc<ModelSnapshot>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace model and metrics together; returns the new generation
    pub fn set(&self, model: TrainedModel, metrics: ModelMetrics) -> u64 {
        let model = Arc::new(model);
        // The guarded value is only ever replaced whole, so a poisoned lock
        // still holds a consistent snapshot
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let generation = current.as_ref().map_or(0, |s| s.generation) + 1;
        *current = Some(Arc::new(ModelSnapshot {
            model,
            metrics,
            generation,
        }));
        debug!(generation, "Model snapshot replaced");
        generation
    }

    /// Current snapshot, if a model has been published
    pub fn snapshot(&self) -> Option<Arc<ModelSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_model(&self) -> Option<Arc<TrainedModel>> {
        self.snapshot().map(|s| Arc::clone(&s.model))
    }

    pub fn get_metrics(&self) -> Option<ModelMetrics> {
        self.snapshot().map(|s| s.metrics.clone())
    }

    pub fn is_ready(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Generation of the current snapshot, 0 when empty
    pub fn generation(&self) -> u64 {
        self.snapshot().map_or(0, |s| s.generation)
    }
}
