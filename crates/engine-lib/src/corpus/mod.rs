//! Synthetic training data
//!
//! - Risk scoring heuristics used to bias labels
//! - Seeded, archetype-based corpus generation

mod generator;
mod risk;

pub use generator::{
    Archetype, BucketSizes, CorpusConfig, SyntheticCorpusGenerator, DEFAULT_CORPUS_SEED,
    DEFAULT_CORPUS_SIZE, MAX_CORPUS_SIZE,
};
pub use risk::risk_score;
