//! Prediction orchestration
//!
//! Checks cache readiness, looks the vehicle up, extracts features, runs the
//! cached model and attaches the derived fields.

use super::assessment::Assessment;
use super::features::FeatureExtractor;
use crate::cache::ModelCache;
use crate::error::EngineError;
use crate::fleet::VehicleLookup;
use crate::models::{FeaturesUsed, MaintenanceForecast};
use crate::observability::{EngineMetrics, StructuredLogger};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Serves maintenance predictions from the cached model
#[derive(Clone)]
pub struct PredictionService {
    cache: Arc<ModelCache>,
    vehicles: Arc<dyn VehicleLookup>,
    extractor: FeatureExtractor,
    metrics: EngineMetrics,
    logger: StructuredLogger,
}

impl PredictionService {
    pub fn new(
        cache: Arc<ModelCache>,
        vehicles: Arc<dyn VehicleLookup>,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            cache,
            vehicles,
            extractor: FeatureExtractor::new(),
            metrics: EngineMetrics::new(),
            logger,
        }
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    pub fn is_ready(&self) -> bool {
        self.cache.is_ready()
    }

    /// Predict maintenance need for one vehicle.
    ///
    /// Returns `Ok(None)` when the vehicle does not exist and
    /// `EngineError::ModelNotReady` before a model has been cached.
    pub async fn predict(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Option<MaintenanceForecast>, EngineError> {
        let start = Instant::now();

        let Some(snapshot) = self.cache.snapshot() else {
            warn!(vehicle_id = %vehicle_id, "Prediction requested before model is ready");
            return Err(EngineError::ModelNotReady);
        };

        let vehicle = match self.vehicles.find_vehicle(vehicle_id).await {
            Ok(Some(vehicle)) => vehicle,
            Ok(None) => {
                self.metrics.inc_vehicles_not_found();
                self.logger.log_vehicle_not_found(vehicle_id);
                return Ok(None);
            }
            Err(e) => {
                self.metrics.inc_prediction_errors();
                warn!(vehicle_id = %vehicle_id, error = %e, "Vehicle lookup failed");
                return Err(EngineError::VehicleLookup(e));
            }
        };

        let features = self
            .extractor
            .extract(vehicle.registered_at, vehicle.active, Utc::now());
        debug!(
            vehicle_id = %vehicle_id,
            age_months = features.age_months,
            movement_count = features.movement_count,
            days_since_maintenance = features.days_since_maintenance,
            avg_dwell_hours = features.avg_dwell_hours,
            "Features extracted"
        );

        let prediction = snapshot.model.predict(&features);
        let assessment = Assessment::from_prediction(&prediction, &features);

        let forecast = MaintenanceForecast {
            vehicle_id,
            needs_maintenance: prediction.label,
            probability_pct: assessment.probability_pct,
            score: prediction.score,
            confidence: assessment.confidence,
            estimated_days: assessment.estimated_days,
            recommendation: assessment.recommendation.to_string(),
            features_used: FeaturesUsed::from(&features),
            model_generation: snapshot.generation,
        };

        self.metrics
            .observe_prediction_latency(start.elapsed().as_secs_f64());
        self.metrics.inc_predictions_generated();
        self.logger.log_prediction(&forecast);

        Ok(Some(forecast))
    }
}
