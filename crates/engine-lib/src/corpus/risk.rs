//! Heuristic risk score used to bias synthetic labels
//!
//! Not used at inference time. Each feature is normalized to [0, 1] against a
//! fleet-typical ceiling and combined with fixed weights.

/// Age at which the age component saturates (months)
pub const MAX_AGE_MONTHS: f64 = 72.0;

/// Movement count at which the movement component saturates
pub const MAX_MOVEMENTS: f64 = 600.0;

/// Days without maintenance at which that component saturates
pub const MAX_DAYS_SINCE_MAINTENANCE: f64 = 180.0;

/// Dwell time at or above which the dwell component is zero (hours)
pub const DWELL_CEILING_HOURS: f64 = 60.0;

pub const AGE_WEIGHT: f64 = 0.30;
pub const MOVEMENT_WEIGHT: f64 = 0.25;
pub const MAINTENANCE_WEIGHT: f64 = 0.35;
pub const DWELL_WEIGHT: f64 = 0.10;

/// Weighted risk in [0, 1] for non-negative inputs
pub fn risk_score(
    age_months: f64,
    movement_count: f64,
    days_since_maintenance: f64,
    avg_dwell_hours: f64,
) -> f64 {
    let age_risk = (age_months / MAX_AGE_MONTHS).min(1.0);
    let movement_risk = (movement_count / MAX_MOVEMENTS).min(1.0);
    let maintenance_risk = (days_since_maintenance / MAX_DAYS_SINCE_MAINTENANCE).min(1.0);
    // Short dwell means heavy use
    let dwell_risk = ((DWELL_CEILING_HOURS - avg_dwell_hours) / DWELL_CEILING_HOURS).max(0.0);

    age_risk * AGE_WEIGHT
        + movement_risk * MOVEMENT_WEIGHT
        + maintenance_risk * MAINTENANCE_WEIGHT
        + dwell_risk * DWELL_WEIGHT
}
