//! Observability infrastructure for the prediction engine
//!
//! Provides:
//! - Prometheus metrics (training duration, prediction latency, model quality)
//! - Structured JSON logging with tracing

use crate::models::{MaintenanceForecast, ModelMetrics};
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_gauge, GaugeVec,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Histogram buckets for whole training runs (in seconds)
const TRAINING_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct EngineMetricsInner {
    training_duration_seconds: Histogram,
    prediction_latency_seconds: Histogram,
    model_ready: IntGauge,
    model_generation: IntGauge,
    model_quality: GaugeVec,
    training_failures: IntCounter,
    predictions_generated: IntCounter,
    vehicles_not_found: IntCounter,
    prediction_errors: IntCounter,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            training_duration_seconds: register_histogram!(
                "maintenance_engine_training_duration_seconds",
                "Time spent generating the corpus and training the model",
                TRAINING_BUCKETS.to_vec()
            )
            .expect("Failed to register training_duration_seconds"),

            prediction_latency_seconds: register_histogram!(
                "maintenance_engine_prediction_latency_seconds",
                "Time spent serving a maintenance prediction",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            model_ready: register_int_gauge!(
                "maintenance_engine_model_ready",
                "1 when a trained model is available for predictions"
            )
            .expect("Failed to register model_ready"),

            model_generation: register_int_gauge!(
                "maintenance_engine_model_generation",
                "Generation number of the model currently in the cache"
            )
            .expect("Failed to register model_generation"),

            model_quality: register_gauge_vec!(
                "maintenance_engine_model_quality",
                "Held-out evaluation metrics of the current model",
                &["metric"]
            )
            .expect("Failed to register model_quality"),

            training_failures: register_int_counter!(
                "maintenance_engine_training_failures_total",
                "Total number of failed training runs"
            )
            .expect("Failed to register training_failures"),

            predictions_generated: register_int_counter!(
                "maintenance_engine_predictions_generated_total",
                "Total number of predictions generated"
            )
            .expect("Failed to register predictions_generated"),

            vehicles_not_found: register_int_counter!(
                "maintenance_engine_vehicles_not_found_total",
                "Total number of predictions requested for unknown vehicles"
            )
            .expect("Failed to register vehicles_not_found"),

            prediction_errors: register_int_counter!(
                "maintenance_engine_prediction_errors_total",
                "Total number of prediction errors"
            )
            .expect("Failed to register prediction_errors"),
        }
    }
}

/// Engine metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new)
    }

    pub fn observe_training_duration(&self, duration_secs: f64) {
        self.inner().training_duration_seconds.observe(duration_secs);
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    /// Publish quality gauges and readiness for a freshly cached model
    pub fn set_model(&self, generation: u64, metrics: &ModelMetrics) {
        let inner = self.inner();
        inner.model_ready.set(1);
        inner.model_generation.set(generation as i64);
        for (name, value) in [
            ("accuracy", metrics.accuracy),
            ("precision", metrics.positive_precision),
            ("recall", metrics.positive_recall),
            ("f1", metrics.f1_score),
            ("auc", metrics.auc),
        ] {
            inner.model_quality.with_label_values(&[name]).set(value);
        }
    }

    pub fn inc_training_failures(&self) {
        self.inner().training_failures.inc();
    }

    pub fn inc_predictions_generated(&self) {
        self.inner().predictions_generated.inc();
    }

    pub fn inc_vehicles_not_found(&self) {
        self.inner().vehicles_not_found.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors.inc();
    }
}

/// Structured logger for engine events
///
/// Provides consistent JSON-formatted logging for training runs,
/// predictions, and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Log a successful training run
    pub fn log_model_trained(&self, generation: u64, metrics: &ModelMetrics) {
        info!(
            event = "model_trained",
            instance = %self.instance,
            generation = generation,
            records = metrics.training_set_size,
            test_records = metrics.test_set_size,
            accuracy = metrics.accuracy,
            positive_precision = metrics.positive_precision,
            positive_recall = metrics.positive_recall,
            f1_score = metrics.f1_score,
            auc = metrics.auc,
            duration_ms = metrics.training_duration_ms,
            "Maintenance model trained"
        );
    }

    /// Log a failed training run
    pub fn log_training_failed(&self, error: &str, previous_model_kept: bool) {
        warn!(
            event = "model_training_failed",
            instance = %self.instance,
            error = %error,
            previous_model_kept = previous_model_kept,
            "Maintenance model training failed"
        );
    }

    /// Log a prediction
    pub fn log_prediction(&self, forecast: &MaintenanceForecast) {
        info!(
            event = "prediction_generated",
            instance = %self.instance,
            vehicle_id = %forecast.vehicle_id,
            needs_maintenance = forecast.needs_maintenance,
            probability_pct = forecast.probability_pct,
            confidence = forecast.confidence.as_str(),
            estimated_days = forecast.estimated_days,
            model_generation = forecast.model_generation,
            "Generated maintenance prediction"
        );
    }

    /// Log a prediction request for an unknown vehicle
    pub fn log_vehicle_not_found(&self, vehicle_id: Uuid) {
        info!(
            event = "vehicle_not_found",
            instance = %self.instance,
            vehicle_id = %vehicle_id,
            "Prediction requested for unknown vehicle"
        );
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str) {
        info!(
            event = "engine_started",
            instance = %self.instance,
            version = %version,
            "Maintenance prediction service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "engine_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Maintenance prediction service shutting down"
        );
    }
}
