//! Core data models for the maintenance prediction engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of input features expected by the model
pub const NUM_FEATURES: usize = 4;

/// Positional feature contract shared by training and inference.
///
/// `FeatureRecord::to_features` emits values in exactly this order and a
/// `TrainedModel` remembers the list it was fit with.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "age_months",
    "movement_count",
    "days_since_maintenance",
    "avg_dwell_hours",
];

/// Feature/label tuple consumed by training and inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub age_months: f64,
    pub movement_count: f64,
    pub days_since_maintenance: f64,
    pub avg_dwell_hours: f64,
    /// Training label, always `false` for inference inputs
    pub needs_maintenance: bool,
}

impl FeatureRecord {
    pub fn to_features(&self) -> [f64; NUM_FEATURES] {
        [
            self.age_months,
            self.movement_count,
            self.days_since_maintenance,
            self.avg_dwell_hours,
        ]
    }

    /// True when every feature is finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.to_features().iter().all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Feature values reported back to callers alongside a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeaturesUsed {
    pub age_months: f64,
    pub movement_count: f64,
    pub days_since_maintenance: f64,
    pub avg_dwell_hours: f64,
}

impl From<&FeatureRecord> for FeaturesUsed {
    fn from(record: &FeatureRecord) -> Self {
        Self {
            age_months: record.age_months,
            movement_count: record.movement_count,
            days_since_maintenance: record.days_since_maintenance,
            avg_dwell_hours: record.avg_dwell_hours,
        }
    }
}

/// Evaluation metrics for a trained model, measured on the held-out split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub positive_precision: f64,
    pub positive_recall: f64,
    pub f1_score: f64,
    pub auc: f64,
    /// Size of the corpus handed to the training pipeline
    pub training_set_size: usize,
    pub test_set_size: usize,
    pub trained_at: DateTime<Utc>,
    pub training_duration_ms: u64,
}

/// Raw classifier output for a single feature record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: bool,
    /// Probability of the positive class, in [0, 1]
    pub probability: f64,
    /// Unbounded margin before the logistic link
    pub score: f64,
}

/// Three-level ordinal describing how far a probability sits from 0.5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Prediction enriched with the derived fields returned to API callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceForecast {
    pub vehicle_id: Uuid,
    pub needs_maintenance: bool,
    /// Probability of needing maintenance, scaled to 0-100
    pub probability_pct: f64,
    pub score: f64,
    pub confidence: Confidence,
    pub estimated_days: u32,
    pub recommendation: String,
    pub features_used: FeaturesUsed,
    pub model_generation: u64,
}

/// Registration metadata the engine reads from the vehicle repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: Uuid,
    pub registered_at: DateTime<Utc>,
    pub active: bool,
}
