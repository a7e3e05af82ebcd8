//! Cache memory budgeting
//!
//! Reserves a share of the memory budget for the application and splits
//! the remainder across cache categories using a weight table. Names
//! missing from the table get the fallback category's weight, so a request
//! with several unknown names can hand out more than the available budget.
//! `allocate_normalized` avoids that by rescaling over the requested set.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ControllerError, ControllerResult};
use crate::models::CacheAllocationPlan;

/// Share of total memory kept for the application itself (30%)
pub const APP_RESERVE_FRACTION: f64 = 0.30;

/// Category whose weight applies to unrecognized names
pub const FALLBACK_CATEGORY: &str = "other";

/// Default category weights; they sum to 1.0
pub const DEFAULT_CACHE_WEIGHTS: &[(&str, f64)] = &[
    ("user_sessions", 0.15),
    ("feed_cache", 0.25),
    ("query_cache", 0.20),
    ("static_assets", 0.10),
    ("api_responses", 0.15),
    ("search_index", 0.10),
    ("other", 0.05),
];

/// Configuration for cache budgeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub app_reserve_fraction: f64,
    pub weights: BTreeMap<String, f64>,
    pub fallback_category: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            app_reserve_fraction: APP_RESERVE_FRACTION,
            weights: DEFAULT_CACHE_WEIGHTS
                .iter()
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect(),
            fallback_category: FALLBACK_CATEGORY.to_string(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> ControllerResult<()> {
        if !(0.0..1.0).contains(&self.app_reserve_fraction) {
            return Err(ControllerError::InvalidOptions(format!(
                "app_reserve_fraction must be in [0, 1), got {}",
                self.app_reserve_fraction
            )));
        }
        if let Some((name, weight)) = self
            .weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(ControllerError::InvalidOptions(format!(
                "cache weight for {} must be a non-negative number, got {}",
                name, weight
            )));
        }
        if !self.weights.contains_key(&self.fallback_category) {
            return Err(ControllerError::InvalidOptions(format!(
                "fallback category {} has no weight",
                self.fallback_category
            )));
        }
        Ok(())
    }
}

/// Partitions a memory budget across cache categories
#[derive(Debug, Clone, Default)]
pub struct CacheAllocator {
    config: CacheConfig,
}

impl CacheAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Memory left for caches after the application reserve
    pub fn available_mb(&self, total_memory_mb: f64) -> f64 {
        total_memory_mb * (1.0 - self.config.app_reserve_fraction)
    }

    /// Weight applied to `category`, falling back to the fallback category
    pub fn weight_for(&self, category: &str) -> f64 {
        self.config
            .weights
            .get(category)
            .or_else(|| self.config.weights.get(&self.config.fallback_category))
            .copied()
            .unwrap_or(0.0)
    }

    /// Allocate `available * weight` to each requested category.
    ///
    /// Duplicates collapse to one entry. Unknown names each receive the
    /// fallback weight, which can overcommit the budget; that case is logged.
    pub fn allocate<S: AsRef<str>>(
        &self,
        total_memory_mb: f64,
        cache_types: &[S],
    ) -> CacheAllocationPlan {
        let available = self.available_mb(total_memory_mb);
        let mut plan = CacheAllocationPlan::new();

        for category in cache_types {
            let category = category.as_ref();
            plan.insert(category, available * self.weight_for(category));
        }

        if plan.is_overcommitted(available) {
            warn!(
                total_memory_mb = total_memory_mb,
                available_mb = available,
                allocated_mb = plan.total_mb(),
                categories = plan.len(),
                "Cache plan exceeds available memory"
            );
        } else {
            debug!(
                total_memory_mb = total_memory_mb,
                available_mb = available,
                allocated_mb = plan.total_mb(),
                categories = plan.len(),
                "Cache plan computed"
            );
        }

        plan
    }

    /// Allocate with weights rescaled over the distinct requested categories,
    /// so the plan sums to the available budget.
    pub fn allocate_normalized<S: AsRef<str>>(
        &self,
        total_memory_mb: f64,
        cache_types: &[S],
    ) -> CacheAllocationPlan {
        let available = self.available_mb(total_memory_mb);

        let mut seen = HashSet::new();
        let requested: Vec<(&str, f64)> = cache_types
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| seen.insert(*name))
            .map(|name| (name, self.weight_for(name)))
            .collect();

        let weight_sum: f64 = requested.iter().map(|(_, w)| w).sum();
        let mut plan = CacheAllocationPlan::new();
        for (name, weight) in requested {
            let share = if weight_sum > 0.0 {
                weight / weight_sum
            } else {
                0.0
            };
            plan.insert(name, available * share);
        }

        debug!(
            available_mb = available,
            allocated_mb = plan.total_mb(),
            categories = plan.len(),
            "Normalized cache plan computed"
        );

        plan
    }

    /// Reject requests that cannot produce a meaningful plan: a non-positive
    /// or non-finite budget, blank names or duplicate names.
    pub fn validate_request<S: AsRef<str>>(
        &self,
        total_memory_mb: f64,
        cache_types: &[S],
    ) -> ControllerResult<()> {
        self.config.validate()?;

        if !total_memory_mb.is_finite() || total_memory_mb <= 0.0 {
            return Err(ControllerError::InvalidCacheRequest(format!(
                "total memory must be a positive number of megabytes, got {}",
                total_memory_mb
            )));
        }

        let mut seen = HashSet::new();
        for name in cache_types.iter().map(|name| name.as_ref()) {
            if name.trim().is_empty() {
                return Err(ControllerError::InvalidCacheRequest(
                    "cache category names cannot be blank".to_string(),
                ));
            }
            if !seen.insert(name) {
                return Err(ControllerError::InvalidCacheRequest(format!(
                    "duplicate cache category: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}
