//! Engine library for fleet maintenance prediction
//!
//! This crate provides the core functionality for:
//! - Synthetic training corpus generation
//! - Gradient-boosted model training and evaluation
//! - A shared cache of the current model
//! - Per-vehicle maintenance predictions
//! - Health checks and observability

pub mod cache;
pub mod corpus;
pub mod error;
pub mod fleet;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod training;

pub use cache::{ModelCache, ModelSnapshot};
pub use error::EngineError;
pub use fleet::{InMemoryVehicleStore, VehicleLookup};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{EngineMetrics, StructuredLogger};
pub use predictor::PredictionService;
pub use training::{retrain, TrainingPipeline};
