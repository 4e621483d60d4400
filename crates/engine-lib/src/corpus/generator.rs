//! Synthetic training corpus built from three vehicle-age archetypes
//!
//! The fleet has no real maintenance history, so the training set is drawn
//! from age bands whose usage and maintenance patterns follow fleet heuristics.
//! All draws come from one seeded sequence, which makes a corpus fully
//! reproducible from `(seed, count)`.

use super::risk::risk_score;
use crate::models::FeatureRecord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default corpus size
pub const DEFAULT_CORPUS_SIZE: usize = 150;

/// Default seed for corpus generation
pub const DEFAULT_CORPUS_SEED: u64 = 42;

/// Largest corpus a caller may request
pub const MAX_CORPUS_SIZE: usize = 100_000;

const NEW_SHARE: f64 = 0.30;
const USED_SHARE: f64 = 0.40;

/// Vehicle-age band used to bias synthetic labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    /// 0-12 months
    New,
    /// 12-36 months
    Used,
    /// 36-72 months
    Old,
}

/// Half-open uniform range `[low, high)`
#[derive(Debug, Clone, Copy)]
struct Band {
    low: f64,
    high: f64,
}

impl Band {
    const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.low + rng.random::<f64>() * (self.high - self.low)
    }
}

/// Sampling parameters for one archetype
#[derive(Debug, Clone, Copy)]
struct ArchetypeProfile {
    age: Band,
    /// Movement noise, added to `age * movements_per_month`
    movements: Band,
    movements_per_month: f64,
    /// Maintenance-gap noise, added to `age * maintenance_days_per_month`
    maintenance_days: Band,
    maintenance_days_per_month: f64,
    dwell_hours: Band,
    base_probability: f64,
    risk_threshold: f64,
    /// Replacement maintenance gap for positive examples
    positive_maintenance_days: Band,
    /// Extra movements added to positive examples
    positive_extra_movements: Option<Band>,
}

impl Archetype {
    fn profile(self) -> ArchetypeProfile {
        match self {
            Archetype::New => ArchetypeProfile {
                age: Band::new(0.0, 12.0),
                movements: Band::new(0.0, 50.0),
                movements_per_month: 3.0,
                maintenance_days: Band::new(0.0, 30.0),
                maintenance_days_per_month: 2.0,
                dwell_hours: Band::new(20.0, 40.0),
                base_probability: 0.15,
                risk_threshold: 0.7,
                positive_maintenance_days: Band::new(60.0, 100.0),
                positive_extra_movements: None,
            },
            Archetype::Used => ArchetypeProfile {
                age: Band::new(12.0, 36.0),
                movements: Band::new(0.0, 150.0),
                movements_per_month: 5.0,
                maintenance_days: Band::new(0.0, 60.0),
                maintenance_days_per_month: 1.5,
                dwell_hours: Band::new(15.0, 45.0),
                base_probability: 0.35,
                risk_threshold: 0.6,
                positive_maintenance_days: Band::new(90.0, 150.0),
                positive_extra_movements: Some(Band::new(0.0, 100.0)),
            },
            Archetype::Old => ArchetypeProfile {
                age: Band::new(36.0, 72.0),
                movements: Band::new(0.0, 300.0),
                movements_per_month: 8.0,
                maintenance_days: Band::new(0.0, 120.0),
                maintenance_days_per_month: 2.0,
                dwell_hours: Band::new(10.0, 60.0),
                base_probability: 0.65,
                risk_threshold: 0.5,
                positive_maintenance_days: Band::new(120.0, 210.0),
                positive_extra_movements: Some(Band::new(0.0, 200.0)),
            },
        }
    }

    /// Base probability that a record of this archetype is labeled positive
    pub fn base_probability(self) -> f64 {
        self.profile().base_probability
    }

    /// Risk score above which a record is always labeled positive
    pub fn risk_threshold(self) -> f64 {
        self.profile().risk_threshold
    }

    /// Draw one labeled record
    fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> FeatureRecord {
        let p = self.profile();

        let age_months = p.age.sample(rng);
        let mut movement_count = p.movements.sample(rng) + age_months * p.movements_per_month;
        let mut days_since_maintenance =
            p.maintenance_days.sample(rng) + age_months * p.maintenance_days_per_month;
        let avg_dwell_hours = p.dwell_hours.sample(rng);

        let risk = risk_score(age_months, movement_count, days_since_maintenance, avg_dwell_hours);

        // The base draw is always consumed so the sequence does not depend on risk
        let base_fired = rng.random::<f64>() < p.base_probability;
        let needs_maintenance = base_fired || risk > p.risk_threshold;

        if needs_maintenance {
            days_since_maintenance = p.positive_maintenance_days.sample(rng);
            if let Some(extra) = p.positive_extra_movements {
                movement_count += extra.sample(rng);
            }
        }

        FeatureRecord {
            age_months,
            movement_count,
            days_since_maintenance,
            avg_dwell_hours,
            needs_maintenance,
        }
    }
}

/// Number of records per archetype for a given corpus size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSizes {
    pub new: usize,
    pub used: usize,
    pub old: usize,
}

impl BucketSizes {
    /// Truncate the 30/40 shares and give the remainder to the old bucket
    pub fn for_count(count: usize) -> Self {
        let new = (count as f64 * NEW_SHARE) as usize;
        let used = (count as f64 * USED_SHARE) as usize;
        let old = count - new - used;
        Self { new, used, old }
    }

    pub fn total(&self) -> usize {
        self.new + self.used + self.old
    }

    fn iter(&self) -> impl Iterator<Item = (Archetype, usize)> {
        [
            (Archetype::New, self.new),
            (Archetype::Used, self.used),
            (Archetype::Old, self.old),
        ]
        .into_iter()
    }
}

/// Corpus generation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub count: usize,
    pub seed: u64,
}

impl CorpusConfig {
    /// Whether `count` is between 1 and `MAX_CORPUS_SIZE`
    pub fn is_within_limits(&self) -> bool {
        (1..=MAX_CORPUS_SIZE).contains(&self.count)
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_CORPUS_SIZE,
            seed: DEFAULT_CORPUS_SEED,
        }
    }
}

/// Deterministic generator of labeled training records
#[derive(Debug, Clone)]
pub struct SyntheticCorpusGenerator {
    seed: u64,
}

impl SyntheticCorpusGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate `count` records: new, used and old buckets in that order,
    /// followed by a single seeded shuffle over the whole list.
    pub fn generate(&self, count: usize) -> Vec<FeatureRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let buckets = BucketSizes::for_count(count);

        debug!(count, seed = self.seed, "Generating synthetic corpus");

        let mut records = Vec::with_capacity(count);
        for (archetype, size) in buckets.iter() {
            records.extend((0..size).map(|_| archetype.sample(&mut rng)));
        }
        records.shuffle(&mut rng);

        let positives = records.iter().filter(|r| r.needs_maintenance).count();
        info!(
            count,
            new = buckets.new,
            used = buckets.used,
            old = buckets.old,
            positives,
            "Synthetic corpus generated"
        );

        records
    }
}

impl Default for SyntheticCorpusGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CORPUS_SEED)
    }
}

impl From<CorpusConfig> for SyntheticCorpusGenerator {
    fn from(config: CorpusConfig) -> Self {
        Self::new(config.seed)
    }
}
