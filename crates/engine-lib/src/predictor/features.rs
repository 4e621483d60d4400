//! Feature extraction for ML inference
//!
//! No movement or maintenance history is stored per vehicle, so features are
//! approximated from registration age and the activity flag, with uniform
//! noise standing in for per-vehicle variation.

use crate::models::FeatureRecord;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Days per month used for age conversion
pub const DAYS_PER_MONTH: f64 = 30.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Derives inference features from vehicle registration metadata
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    movements_per_month: f64,
    movement_noise: f64,
    maintenance_days_per_month: f64,
    maintenance_noise: f64,
    active_dwell_hours: (f64, f64),
    inactive_dwell_hours: (f64, f64),
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            movements_per_month: 8.0,
            movement_noise: 20.0,
            maintenance_days_per_month: 4.0,
            maintenance_noise: 30.0,
            active_dwell_hours: (15.0, 45.0),
            inactive_dwell_hours: (40.0, 80.0),
        }
    }

    /// Extract features using the calling thread's unseeded RNG
    pub fn extract(
        &self,
        registered_at: DateTime<Utc>,
        active: bool,
        now: DateTime<Utc>,
    ) -> FeatureRecord {
        self.extract_with_rng(registered_at, active, now, &mut rand::rng())
    }

    pub fn extract_with_rng<R: Rng + ?Sized>(
        &self,
        registered_at: DateTime<Utc>,
        active: bool,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> FeatureRecord {
        let age_months = age_in_months(registered_at, now);

        let movement_count =
            age_months * self.movements_per_month + rng.random::<f64>() * self.movement_noise;
        let days_since_maintenance = age_months * self.maintenance_days_per_month
            + rng.random::<f64>() * self.maintenance_noise;

        // Active vehicles spend less time parked between movements
        let (low, high) = if active {
            self.active_dwell_hours
        } else {
            self.inactive_dwell_hours
        };
        let avg_dwell_hours = low + rng.random::<f64>() * (high - low);

        FeatureRecord {
            age_months,
            movement_count,
            days_since_maintenance,
            avg_dwell_hours,
            needs_maintenance: false,
        }
    }
}

/// Fractional months between registration and `now`, never negative
pub fn age_in_months(registered_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(registered_at);
    let days = elapsed.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY;
    days.max(0.0) / DAYS_PER_MONTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_age_in_months() {
        let now = Utc::now();
        assert!((age_in_months(now - Duration::days(90), now) - 3.0).abs() < 1e-9);
        assert!((age_in_months(now - Duration::hours(36), now) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_future_registration_clamped_to_zero() {
        let now = Utc::now();
        assert_eq!(age_in_months(now + Duration::days(10), now), 0.0);
    }

    #[test]
    fn test_feature_ranges() {
        let extractor = FeatureExtractor::new();
        let now = Utc::now();
        let registered = now - Duration::days(300); // 10 months

        for _ in 0..200 {
            let f = extractor.extract(registered, true, now);
            assert!((f.age_months - 10.0).abs() < 1e-9);
            assert!((80.0..100.0).contains(&f.movement_count), "{:?}", f);
            assert!((40.0..70.0).contains(&f.days_since_maintenance), "{:?}", f);
            assert!((15.0..45.0).contains(&f.avg_dwell_hours), "{:?}", f);
            assert!(!f.needs_maintenance);
        }
    }

    #[test]
    fn test_inactive_vehicles_dwell_longer() {
        let extractor = FeatureExtractor::new();
        let now = Utc::now();
        for _ in 0..200 {
            let f = extractor.extract(now - Duration::days(30), false, now);
            assert!((40.0..80.0).contains(&f.avg_dwell_hours), "{:?}", f);
        }
    }

    #[test]
    fn test_features_non_negative() {
        let extractor = FeatureExtractor::new();
        let now = Utc::now();
        for days in [-100, 0, 1, 365, 3650] {
            for active in [true, false] {
                let f = extractor.extract(now - Duration::days(days), active, now);
                assert!(f.is_valid(), "{:?}", f);
            }
        }
    }

    #[test]
    fn test_seeded_rng_pins_output() {
        let extractor = FeatureExtractor::new();
        let now = Utc::now();
        let registered = now - Duration::days(400);
        let a = extractor.extract_with_rng(registered, true, now, &mut StdRng::seed_from_u64(5));
        let b = extractor.extract_with_rng(registered, true, now, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
