//! Server configuration

use anyhow::{ensure, Result};
use engine_lib::corpus::{CorpusConfig, DEFAULT_CORPUS_SEED, DEFAULT_CORPUS_SIZE, MAX_CORPUS_SIZE};
use engine_lib::training::DEFAULT_SPLIT_SEED;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration, read from `MAINTENANCE_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name attached to structured log records
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Port for the prediction API, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Number of synthetic records to train on
    #[serde(default = "default_corpus_size")]
    pub corpus_size: usize,

    #[serde(default = "default_corpus_seed")]
    pub corpus_seed: u64,

    /// Seed for the train/test shuffle
    #[serde(default = "default_split_seed")]
    pub split_seed: u64,

    /// JSON array of vehicle records; the store starts empty when unset
    #[serde(default)]
    pub vehicles_path: Option<PathBuf>,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_corpus_size() -> usize {
    DEFAULT_CORPUS_SIZE
}

fn default_corpus_seed() -> u64 {
    DEFAULT_CORPUS_SEED
}

fn default_split_seed() -> u64 {
    DEFAULT_SPLIT_SEED
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            corpus_size: default_corpus_size(),
            corpus_seed: default_corpus_seed(),
            split_seed: default_split_seed(),
            vehicles_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MAINTENANCE").try_parsing(true))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.corpus().is_within_limits(),
            "corpus_size must be between 1 and {}, got {}",
            MAX_CORPUS_SIZE,
            self.corpus_size
        );
        Ok(())
    }

    pub fn corpus(&self) -> CorpusConfig {
        CorpusConfig {
            count: self.corpus_size,
            seed: self.corpus_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_constants() {
        let config = ServerConfig::default();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.corpus(), CorpusConfig::default());
        assert_eq!(config.split_seed, 42);
        assert!(config.vehicles_path.is_none());
    }

    #[test]
    fn test_corpus_size_is_bounded() {
        assert!(ServerConfig::default().validate().is_ok());

        let too_large = ServerConfig {
            corpus_size: MAX_CORPUS_SIZE + 1,
            ..Default::default()
        };
        assert!(too_large.validate().is_err());

        let empty = ServerConfig {
            corpus_size: 0,
            ..Default::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config: ServerConfig = config::Config::builder()
            .set_override("corpus_size", 60)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.corpus_size, 60);
        assert_eq!(config.corpus_seed, 42);
        assert_eq!(config.api_port, 8080);
    }
}
