//! Integration tests for the maintenance API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use engine_lib::{
    corpus::{CorpusConfig, MAX_CORPUS_SIZE},
    health::{components, HealthRegistry},
    observability::StructuredLogger,
    InMemoryVehicleStore, ModelCache, PredictionService, TrainingPipeline, VehicleRecord,
};
use maintenance_server::api::{create_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

async fn setup_test_app(vehicles: Vec<VehicleRecord>) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::TRAINER).await;
    health_registry.register(components::PREDICTOR).await;
    health_registry.register(components::VEHICLE_STORE).await;

    let logger = StructuredLogger::new("test");
    let predictions = PredictionService::new(
        Arc::new(ModelCache::new()),
        Arc::new(InMemoryVehicleStore::from_records(vehicles)),
        logger.clone(),
    );
    let state = Arc::new(AppState::new(
        health_registry,
        logger,
        predictions,
        CorpusConfig::default(),
        TrainingPipeline::default(),
    ));
    let router = create_router(state.clone());

    (router, state)
}

async fn trained_app(vehicles: Vec<VehicleRecord>) -> (Router, Arc<AppState>) {
    let (router, state) = setup_test_app(vehicles).await;
    state
        .train_and_publish(CorpusConfig::default())
        .await
        .unwrap();
    (router, state)
}

fn vehicle(days_old: i64) -> VehicleRecord {
    VehicleRecord {
        id: Uuid::new_v4(),
        registered_at: Utc::now() - Duration::days(days_old),
        active: true,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_predict_returns_forecast() {
    let record = vehicle(400);
    let (app, _state) = trained_app(vec![record.clone()]).await;

    let response = app
        .oneshot(post_json(
            "/api/v2/ml/predict-maintenance",
            serde_json::json!({ "vehicle_id": record.id.to_string() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let forecast = json_body(response).await;
    assert_eq!(forecast["vehicle_id"], record.id.to_string());
    assert!(forecast["needs_maintenance"].is_boolean());
    let pct = forecast["probability_pct"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&pct));
    assert!(["high", "medium", "low"].contains(&forecast["confidence"].as_str().unwrap()));
    assert!(forecast["estimated_days"].as_u64().unwrap() >= 7);
    assert!(!forecast["recommendation"].as_str().unwrap().is_empty());
    assert!(forecast["features_used"]["age_months"].as_f64().unwrap() > 13.0);
}

#[tokio::test]
async fn test_predict_unknown_vehicle_returns_404() {
    let (app, _state) = trained_app(vec![vehicle(10)]).await;

    let response = app
        .oneshot(post_json(
            "/api/v2/ml/predict-maintenance",
            serde_json::json!({ "vehicle_id": Uuid::new_v4().to_string() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_predict_before_training_returns_503() {
    let record = vehicle(10);
    let (app, _state) = setup_test_app(vec![record.clone()]).await;

    let response = app
        .oneshot(post_json(
            "/api/v2/ml/predict-maintenance",
            serde_json::json!({ "vehicle_id": record.id.to_string() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["status"], "model_not_ready");
}

#[tokio::test]
async fn test_predict_rejects_invalid_vehicle_id() {
    let (app, _state) = trained_app(vec![]).await;

    let response = app
        .oneshot(post_json(
            "/api/v2/ml/predict-maintenance",
            serde_json::json!({ "vehicle_id": "not-a-uuid" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_rejects_malformed_body() {
    let (app, _state) = trained_app(vec![]).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v2/ml/predict-maintenance")
        .header("content-type", "application/json")
        .body(Body::from("{\"vehicle\":"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_model_metrics_unavailable_before_training() {
    let (app, _state) = setup_test_app(vec![]).await;

    let response = app.oneshot(get("/api/v2/ml/model-metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_model_metrics_after_training() {
    let (app, _state) = trained_app(vec![]).await;

    let response = app.oneshot(get("/api/v2/ml/model-metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let metrics = json_body(response).await;
    assert_eq!(metrics["generation"], 1);
    assert_eq!(metrics["training_set_size"], 150);
    assert_eq!(metrics["test_set_size"], 30);
    let auc = metrics["auc"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&auc));
}

#[tokio::test]
async fn test_retrain_without_body_uses_configured_corpus() {
    let (app, state) = trained_app(vec![]).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v2/ml/retrain")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let metrics = json_body(response).await;
    assert_eq!(metrics["generation"], 2);
    assert_eq!(metrics["training_set_size"], 150);
    assert_eq!(state.cache().generation(), 2);
}

#[tokio::test]
async fn test_retrain_with_overrides() {
    let (app, _state) = setup_test_app(vec![]).await;

    let response = app
        .oneshot(post_json(
            "/api/v2/ml/retrain",
            serde_json::json!({ "seed": 7, "count": 200 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let metrics = json_body(response).await;
    assert_eq!(metrics["training_set_size"], 200);
    assert_eq!(metrics["test_set_size"], 40);
}

#[tokio::test]
async fn test_retrain_insufficient_data_keeps_model() {
    let (app, state) = trained_app(vec![]).await;
    let before = state.cache().get_metrics();

    let response = app
        .oneshot(post_json(
            "/api/v2/ml/retrain",
            serde_json::json!({ "count": 2 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(state.cache().get_metrics(), before);
    assert_eq!(state.cache().generation(), 1);

    // A failed retrain degrades the trainer but keeps serving
    let readiness = state.health_registry.readiness().await;
    assert!(readiness.ready);
    let trainer = state
        .health_registry
        .component(components::TRAINER)
        .await
        .unwrap();
    assert_eq!(trainer.status, engine_lib::ComponentStatus::Degraded);
}

#[tokio::test]
async fn test_retrain_rejects_out_of_range_count() {
    let (app, state) = trained_app(vec![]).await;

    for count in [0u64, MAX_CORPUS_SIZE as u64 + 1, 1_099_511_627_776] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v2/ml/retrain",
                serde_json::json!({ "count": count }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "count {}", count);
    }
    assert_eq!(state.cache().generation(), 1);
}

#[tokio::test]
async fn test_readyz_returns_503_until_trained() {
    let (app, state) = setup_test_app(vec![]).await;

    let response = app.clone().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["ready"], false);

    state
        .train_and_publish(CorpusConfig::default())
        .await
        .unwrap();

    let response = app.oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["ready"], true);
}

#[tokio::test]
async fn test_healthz_returns_ok_when_degraded() {
    let (app, state) = setup_test_app(vec![]).await;

    state
        .health_registry
        .set_degraded(components::VEHICLE_STORE, "vehicle file missing")
        .await;

    let response = app.oneshot(get("/healthz")).await.unwrap();

    // Degraded still returns 200 (operational)
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "degraded");
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state) = setup_test_app(vec![]).await;

    state
        .health_registry
        .set_unhealthy(components::PREDICTOR, "model unusable")
        .await;

    let response = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let health = json_body(response).await;
    assert_eq!(health["status"], "unhealthy");
    assert!(health["components"]["trainer"].is_object());
    assert!(health["components"]["vehicle_store"].is_object());
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let record = vehicle(90);
    let (app, _state) = trained_app(vec![record.clone()]).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v2/ml/predict-maintenance",
            serde_json::json!({ "vehicle_id": record.id.to_string() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("maintenance_engine_training_duration_seconds_bucket"));
    assert!(metrics_text.contains("maintenance_engine_prediction_latency_seconds_count"));
    assert!(metrics_text.contains("maintenance_engine_predictions_generated_total"));
    assert!(metrics_text.contains("maintenance_engine_model_ready 1"));
    assert!(metrics_text.contains("maintenance_engine_model_quality{metric=\"auc\"}"));
}
