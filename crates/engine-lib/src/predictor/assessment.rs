//! Post-processing of raw predictions
//!
//! Turns a `PredictionResult` plus the features it was computed from into the
//! caller-facing confidence level, days-to-maintenance estimate and
//! recommendation text. Everything here is a pure function of its inputs.

use crate::models::{Confidence, FeatureRecord, PredictionResult};

/// Probability at or beyond which (either side) confidence is high
pub const HIGH_CONFIDENCE_UPPER: f64 = 0.75;
pub const HIGH_CONFIDENCE_LOWER: f64 = 0.25;

/// Probability at or beyond which (either side) confidence is medium
pub const MEDIUM_CONFIDENCE_UPPER: f64 = 0.60;
pub const MEDIUM_CONFIDENCE_LOWER: f64 = 0.40;

/// Probability at which a positive prediction is treated as urgent
pub const URGENT_PROBABILITY: f64 = 0.80;

/// Probability at which a positive prediction is treated as likely
pub const LIKELY_PROBABILITY: f64 = 0.65;

/// Days until maintenance for urgent and non-urgent positives
pub const URGENT_DAYS: u32 = 7;
pub const SOON_DAYS: u32 = 30;

/// Nominal maintenance interval and the floor for negative predictions
pub const MAINTENANCE_INTERVAL_DAYS: f64 = 180.0;
pub const MIN_ESTIMATED_DAYS: f64 = 60.0;

/// Age above which a healthy vehicle still gets the aging-fleet advice
pub const OLD_VEHICLE_MONTHS: f64 = 36.0;

/// Maintenance gap above which a healthy vehicle is nudged to schedule
pub const LONG_GAP_DAYS: f64 = 150.0;

pub const RECOMMEND_URGENT: &str = "URGENT: The vehicle needs immediate maintenance. Schedule a full service as soon as possible.";
pub const RECOMMEND_SOON: &str = "ATTENTION: The vehicle will probably need maintenance soon. We recommend scheduling a service within the next few weeks.";
pub const RECOMMEND_PREVENTIVE: &str = "The vehicle may need preventive maintenance. Consider scheduling an inspection within the next few weeks.";
pub const RECOMMEND_AGING: &str = "The vehicle is in good condition, but because of its age we recommend regular preventive maintenance.";
pub const RECOMMEND_OVERDUE: &str = "The vehicle does not need urgent maintenance, but it has been a long time since the last one. Consider scheduling it soon.";
pub const RECOMMEND_HEALTHY: &str = "The vehicle is in good operating condition. Continue with regular preventive maintenance.";

/// Derived, caller-facing view of a prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub confidence: Confidence,
    pub estimated_days: u32,
    pub recommendation: &'static str,
    pub probability_pct: f64,
}

impl Assessment {
    pub fn from_prediction(prediction: &PredictionResult, features: &FeatureRecord) -> Self {
        Self {
            confidence: confidence_level(prediction.probability),
            estimated_days: estimated_days(
                prediction.label,
                prediction.probability,
                features.days_since_maintenance,
            ),
            recommendation: recommendation(prediction.label, prediction.probability, features),
            probability_pct: prediction.probability * 100.0,
        }
    }
}

/// High band is checked first, then medium; everything else is low
pub fn confidence_level(probability: f64) -> Confidence {
    if probability >= HIGH_CONFIDENCE_UPPER || probability <= HIGH_CONFIDENCE_LOWER {
        Confidence::High
    } else if probability >= MEDIUM_CONFIDENCE_UPPER || probability <= MEDIUM_CONFIDENCE_LOWER {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub fn estimated_days(needs_maintenance: bool, probability: f64, days_since_maintenance: f64) -> u32 {
    if needs_maintenance {
        if probability >= URGENT_PROBABILITY {
            URGENT_DAYS
        } else {
            SOON_DAYS
        }
    } else {
        (MAINTENANCE_INTERVAL_DAYS - days_since_maintenance)
            .round()
            .max(MIN_ESTIMATED_DAYS) as u32
    }
}

pub fn recommendation(
    needs_maintenance: bool,
    probability: f64,
    features: &FeatureRecord,
) -> &'static str {
    if needs_maintenance {
        if probability >= URGENT_PROBABILITY {
            RECOMMEND_URGENT
        } else if probability >= LIKELY_PROBABILITY {
            RECOMMEND_SOON
        } else {
            RECOMMEND_PREVENTIVE
        }
    } else if features.age_months > OLD_VEHICLE_MONTHS {
        RECOMMEND_AGING
    } else if features.days_since_maintenance > LONG_GAP_DAYS {
        RECOMMEND_OVERDUE
    } else {
        RECOMMEND_HEALTHY
    }
}
