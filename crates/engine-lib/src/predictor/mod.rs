//! Maintenance prediction
//!
//! Feature approximation from vehicle metadata, post-processing of raw model
//! output, and the service that ties them to the model cache.

mod assessment;
mod features;
mod service;

pub use assessment::{
    confidence_level, estimated_days, recommendation, Assessment, HIGH_CONFIDENCE_LOWER,
    HIGH_CONFIDENCE_UPPER, LIKELY_PROBABILITY, LONG_GAP_DAYS, MAINTENANCE_INTERVAL_DAYS,
    MEDIUM_CONFIDENCE_LOWER, MEDIUM_CONFIDENCE_UPPER, MIN_ESTIMATED_DAYS, OLD_VEHICLE_MONTHS,
    RECOMMEND_AGING, RECOMMEND_HEALTHY, RECOMMEND_OVERDUE, RECOMMEND_PREVENTIVE, RECOMMEND_SOON,
    RECOMMEND_URGENT, SOON_DAYS, URGENT_DAYS, URGENT_PROBABILITY,
};
pub use features::{age_in_months, FeatureExtractor, DAYS_PER_MONTH};
pub use service::PredictionService;
