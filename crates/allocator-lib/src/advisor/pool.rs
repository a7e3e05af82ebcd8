//! Database connection pool sizing
//!
//! Maps expected concurrency to a min/recommended/max pool envelope with a
//! spike buffer on top of the steady-state estimate.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::PoolSizeRecommendation;

/// Queries each concurrent user keeps in flight when not specified
pub const DEFAULT_QUERIES_PER_USER: f64 = 3.0;

/// Headroom added to the base estimate (20%)
pub const SPIKE_BUFFER_FRACTION: f64 = 0.20;

/// A pool is never sized below this many connections
pub const MIN_POOL_SIZE: u64 = 5;

/// Minimum pool as a fraction of the recommended size
pub const MIN_POOL_FRACTION: f64 = 0.25;

/// Maximum pool as a multiple of the recommended size
pub const MAX_POOL_FACTOR: f64 = 1.5;

/// Configuration for pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub spike_buffer_fraction: f64,
    pub min_pool_size: u64,
    pub min_pool_fraction: f64,
    pub max_pool_factor: f64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            spike_buffer_fraction: SPIKE_BUFFER_FRACTION,
            min_pool_size: MIN_POOL_SIZE,
            min_pool_fraction: MIN_POOL_FRACTION,
            max_pool_factor: MAX_POOL_FACTOR,
        }
    }
}

/// Sizes connection pools from expected concurrency
#[derive(Debug, Clone, Default)]
pub struct ConnectionPoolSizer {
    config: PoolConfig,
}

impl ConnectionPoolSizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self { config }
    }

    /// Size a pool for `concurrent_users` each issuing `avg_queries_per_user`.
    ///
    /// `recommended` and `max` are raised to the minimum floor so the
    /// envelope stays ordered even for tiny or zero demand; the unfloored
    /// estimate is kept in `demand`.
    pub fn size(&self, concurrent_users: u32, avg_queries_per_user: f64) -> PoolSizeRecommendation {
        let base = concurrent_users as f64 * avg_queries_per_user;
        let demand = ceil_to_u64(base * (1.0 + self.config.spike_buffer_fraction));

        let min = ceil_to_u64(demand as f64 * self.config.min_pool_fraction)
            .max(self.config.min_pool_size);
        let recommended = demand.max(min);
        let max = ceil_to_u64(demand as f64 * self.config.max_pool_factor).max(recommended);

        debug!(
            concurrent_users = concurrent_users,
            avg_queries_per_user = avg_queries_per_user,
            demand = demand,
            min = min,
            recommended = recommended,
            max = max,
            "Sized connection pool"
        );

        PoolSizeRecommendation {
            min,
            recommended,
            max,
            demand,
        }
    }

    /// Size a pool assuming three queries per user
    pub fn size_default(&self, concurrent_users: u32) -> PoolSizeRecommendation {
        self.size(concurrent_users, DEFAULT_QUERIES_PER_USER)
    }
}

/// Round up to a connection count; negative or NaN inputs become zero
fn ceil_to_u64(value: f64) -> u64 {
    value.ceil() as u64
}
