//! Configuration management for the CLI
//!
//! Settings are layered: built-in defaults, then an optional TOML/JSON/YAML
//! file, then `RAC_`-prefixed environment variables with `__` separating
//! nested keys (e.g. `RAC_SCALING__MAX_INSTANCES=20`).

use allocator_lib::scaling::DEFAULT_HISTORY_CAPACITY;
use allocator_lib::{AssessorConfig, CacheConfig, PoolConfig, ScalingOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "RAC";

/// Controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Service or cluster name attached to log records
    pub scope: String,
    /// Maximum historical snapshots averaged per decision
    pub history_capacity: usize,
    pub scaling: ScalingOptions,
    pub assessor: AssessorConfig,
    pub pool: PoolSettings,
    pub cache: CacheSettings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            scope: "default".to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            scaling: ScalingOptions::default(),
            assessor: AssessorConfig::default(),
            pool: PoolSettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

/// Pool sizing inputs and tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub concurrent_users: u32,
    pub avg_queries_per_user: f64,
    pub sizing: PoolConfig,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            concurrent_users: 100,
            avg_queries_per_user: allocator_lib::advisor::DEFAULT_QUERIES_PER_USER,
            sizing: PoolConfig::default(),
        }
    }
}

/// Cache budgeting inputs and tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub total_memory_mb: f64,
    pub types: Vec<String>,
    pub allocation: CacheConfig,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let allocation = CacheConfig::default();
        Self {
            total_memory_mb: 1024.0,
            types: allocation.weights.keys().cloned().collect(),
            allocation,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from `path` (required when given), or from the
    /// default location if present, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(default_path) = Self::default_path() {
                    builder =
                        builder.add_source(config::File::from(default_path).required(false));
                }
            }
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// `~/.config/rac/config.toml`, when a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("rac").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(config.scaling, ScalingOptions::default());
        assert_eq!(config.cache.types.len(), 7);
        assert_eq!(config.pool.avg_queries_per_user, 3.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "scope = \"checkout\"\n\n[scaling]\nmax_instances = 4\n\n[pool]\nconcurrent_users = 50"
        )
        .unwrap();

        let config = ControllerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.scope, "checkout");
        assert_eq!(config.scaling.max_instances, 4);
        assert_eq!(config.scaling.min_instances, 1);
        assert_eq!(config.pool.concurrent_users, 50);
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(ControllerConfig::load(Some(&missing)).is_err());
    }
}
