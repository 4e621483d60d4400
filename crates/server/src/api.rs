//! HTTP API: predictions, model metrics, retraining, health and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use engine_lib::{
    corpus::{CorpusConfig, MAX_CORPUS_SIZE},
    health::{components, ComponentStatus, HealthRegistry},
    observability::{EngineMetrics, StructuredLogger},
    training::{self, TrainingPipeline},
    EngineError, ModelCache, ModelMetrics, PredictionService,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

/// Shared application state
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: EngineMetrics,
    pub logger: StructuredLogger,
    pub predictions: PredictionService,
    pub corpus: CorpusConfig,
    pub pipeline: TrainingPipeline,
    retrain_lock: Mutex<()>,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        logger: StructuredLogger,
        predictions: PredictionService,
        corpus: CorpusConfig,
        pipeline: TrainingPipeline,
    ) -> Self {
        Self {
            health_registry,
            metrics: EngineMetrics::new(),
            logger,
            predictions,
            corpus,
            pipeline,
            retrain_lock: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        self.predictions.cache()
    }

    /// Train on a fresh corpus off the async runtime and publish the result.
    ///
    /// Concurrent calls are serialized. Health, readiness and the model
    /// gauges are updated either way.
    pub async fn train_and_publish(&self, corpus: CorpusConfig) -> Result<ModelMetrics, ApiError> {
        let _guard = self.retrain_lock.lock().await;
        let start = Instant::now();

        let cache = Arc::clone(self.cache());
        let pipeline = self.pipeline.clone();
        let outcome = tokio::task::spawn_blocking(move || training::retrain(&cache, corpus, &pipeline))
            .await
            .map_err(|e| ApiError::Internal(format!("training task failed: {}", e)))?;

        self.metrics
            .observe_training_duration(start.elapsed().as_secs_f64());

        match outcome {
            Ok(metrics) => {
                let generation = self.cache().generation();
                self.metrics.set_model(generation, &metrics);
                self.logger.log_model_trained(generation, &metrics);
                self.health_registry.set_healthy(components::TRAINER).await;
                self.health_registry.set_healthy(components::PREDICTOR).await;
                self.health_registry.set_ready(true).await;
                Ok(metrics)
            }
            Err(e) => {
                let previous_model_kept = self.cache().is_ready();
                self.metrics.inc_training_failures();
                self.logger
                    .log_training_failed(&e.to_string(), previous_model_kept);
                self.health_registry
                    .set_degraded(components::TRAINER, e.to_string())
                    .await;
                if !previous_model_kept {
                    self.health_registry
                        .set_degraded(components::PREDICTOR, "no trained model available")
                        .await;
                }
                Err(ApiError::Engine(e))
            }
        }
    }
}

/// Errors returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    VehicleNotFound(Uuid),
    Engine(EngineError),
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::VehicleNotFound(id) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("vehicle {} not found", id) }),
            ),
            ApiError::Engine(err @ EngineError::ModelNotReady) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "status": "model_not_ready", "error": err.to_string() }),
            ),
            ApiError::Engine(err @ EngineError::InsufficientData { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": err.to_string() }),
            ),
            ApiError::Engine(err) => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.to_string() }),
                )
            }
            ApiError::Internal(message) => {
                error!(error = %message, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub vehicle_id: String,
}

/// Optional overrides for a manual retrain
#[derive(Debug, Default, Deserialize)]
pub struct RetrainRequest {
    pub seed: Option<u64>,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ModelMetricsResponse {
    pub generation: u64,
    #[serde(flatten)]
    pub metrics: ModelMetrics,
}

async fn predict_maintenance(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let vehicle_id = Uuid::parse_str(request.vehicle_id.trim())
        .map_err(|e| ApiError::BadRequest(format!("invalid vehicle_id: {}", e)))?;

    match state.predictions.predict(vehicle_id).await? {
        Some(forecast) => Ok(Json(forecast)),
        None => Err(ApiError::VehicleNotFound(vehicle_id)),
    }
}

async fn model_metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.cache().snapshot().ok_or(EngineError::ModelNotReady)?;
    Ok(Json(ModelMetricsResponse {
        generation: snapshot.generation,
        metrics: snapshot.metrics.clone(),
    }))
}

async fn retrain(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RetrainRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        // No body at all means "retrain with the configured corpus"
        Err(JsonRejection::MissingJsonContentType(_)) => RetrainRequest::default(),
        Err(e) => return Err(ApiError::BadRequest(e.body_text())),
    };

    let corpus = CorpusConfig {
        count: request.count.unwrap_or(state.corpus.count),
        seed: request.seed.unwrap_or(state.corpus.seed),
    };
    if !corpus.is_within_limits() {
        return Err(ApiError::BadRequest(format!(
            "count must be between 1 and {}, got {}",
            MAX_CORPUS_SIZE, corpus.count
        )));
    }
    info!(count = corpus.count, seed = corpus.seed, "Manual retrain requested");

    let metrics = state.train_and_publish(corpus).await?;
    Ok(Json(ModelMetricsResponse {
        generation: state.cache().generation(),
        metrics,
    }))
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 once a model is serving
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| ApiError::Internal(format!("failed to encode metrics: {}", e)))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v2/ml/predict-maintenance", post(predict_maintenance))
        .route("/api/v2/ml/model-metrics", get(model_metrics))
        .route("/api/v2/ml/retrain", post(retrain))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
