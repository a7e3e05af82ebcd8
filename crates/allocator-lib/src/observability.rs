//! Observability helpers for callers of the controller
//!
//! Provides:
//! - Prometheus metrics (decisions by action, utilization level, pool and cache sizing)
//! - Structured logging of controller outputs with tracing
//!
//! The advisory operations never touch these; the caller records what it
//! received so that evaluation stays free of side effects.

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter_vec, register_int_gauge,
    register_int_gauge_vec, GaugeVec, Histogram, IntCounterVec, IntGauge, IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::models::{
    AllocationDecision, CacheAllocationPlan, PoolSizeRecommendation, Priority,
    UtilizationAssessment,
};

/// Histogram buckets for evaluation latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.000_001, 0.000_005, 0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ControllerMetricsInner> = OnceLock::new();

struct ControllerMetricsInner {
    decisions_total: IntCounterVec,
    evaluation_latency_seconds: Histogram,
    utilization_level: IntGauge,
    bottlenecks: IntGauge,
    history_samples: IntGauge,
    pool_connections: IntGaugeVec,
    cache_allocation_mb: GaugeVec,
}

impl ControllerMetricsInner {
    fn new() -> Self {
        Self {
            decisions_total: register_int_counter_vec!(
                "rac_decisions_total",
                "Allocation decisions produced, by action and priority",
                &["action", "priority"]
            )
            .expect("Failed to register decisions_total"),

            evaluation_latency_seconds: register_histogram!(
                "rac_evaluation_latency_seconds",
                "Time spent evaluating the scaling decision cascade",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register evaluation_latency_seconds"),

            utilization_level: register_int_gauge!(
                "rac_utilization_level",
                "Last assessed utilization level (0=low, 1=normal, 2=high, 3=critical)"
            )
            .expect("Failed to register utilization_level"),

            bottlenecks: register_int_gauge!(
                "rac_bottlenecks",
                "Bottlenecks found in the last assessed snapshot"
            )
            .expect("Failed to register bottlenecks"),

            history_samples: register_int_gauge!(
                "rac_history_samples",
                "Historical samples averaged for the last decision"
            )
            .expect("Failed to register history_samples"),

            pool_connections: register_int_gauge_vec!(
                "rac_pool_connections",
                "Recommended connection pool envelope",
                &["bound"]
            )
            .expect("Failed to register pool_connections"),

            cache_allocation_mb: register_gauge_vec!(
                "rac_cache_allocation_mb",
                "Cache memory budget per category in megabytes",
                &["category"]
            )
            .expect("Failed to register cache_allocation_mb"),
        }
    }
}

/// Controller metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance; clones share the
/// same underlying collectors in the default registry.
#[derive(Clone)]
pub struct ControllerMetrics {
    _private: (),
}

impl Default for ControllerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerMetrics {
    /// Create a new metrics handle (registers global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ControllerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ControllerMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record a decision and the assessment it carries
    pub fn record_decision(&self, decision: &AllocationDecision) {
        let inner = self.inner();
        inner
            .decisions_total
            .with_label_values(&[decision.action.as_str(), decision.priority.as_str()])
            .inc();
        inner.history_samples.set(decision.history_samples as i64);
        self.record_assessment(&decision.assessment);
    }

    pub fn record_assessment(&self, assessment: &UtilizationAssessment) {
        self.inner()
            .utilization_level
            .set(assessment.level.ordinal());
        self.inner()
            .bottlenecks
            .set(assessment.bottlenecks.len() as i64);
    }

    pub fn observe_evaluation_latency(&self, duration_secs: f64) {
        self.inner().evaluation_latency_seconds.observe(duration_secs);
    }

    pub fn record_pool_size(&self, pool: &PoolSizeRecommendation) {
        let gauge = &self.inner().pool_connections;
        gauge.with_label_values(&["min"]).set(pool.min as i64);
        gauge
            .with_label_values(&["recommended"])
            .set(pool.recommended as i64);
        gauge.with_label_values(&["max"]).set(pool.max as i64);
    }

    /// Replace the per-category cache gauges with `plan`
    pub fn record_cache_plan(&self, plan: &CacheAllocationPlan) {
        let gauge = &self.inner().cache_allocation_mb;
        gauge.reset();
        for (category, megabytes) in plan.iter() {
            gauge.with_label_values(&[category]).set(megabytes);
        }
    }

    /// Number of decisions recorded for an action/priority pair
    pub fn decisions_recorded(&self, action: &str, priority: &str) -> u64 {
        self.inner()
            .decisions_total
            .with_label_values(&[action, priority])
            .get()
    }
}

/// Structured logger for controller outputs
///
/// Emits consistent event-tagged records for decisions, assessments and
/// advisor results.
#[derive(Clone)]
pub struct StructuredLogger {
    scope: String,
}

impl StructuredLogger {
    /// `scope` names the service or cluster the evaluations belong to
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    pub fn log_decision(&self, decision: &AllocationDecision) {
        let bottlenecks = decision.assessment.bottleneck_messages().join("; ");
        if decision.priority >= Priority::High {
            warn!(
                event = "decision_made",
                scope = %self.scope,
                action = %decision.action,
                priority = %decision.priority,
                level = %decision.assessment.level,
                avg_cpu = decision.avg_cpu,
                avg_memory = decision.avg_memory,
                history_samples = decision.history_samples,
                bottlenecks = %bottlenecks,
                reason = %decision.reason,
                "Scaling action recommended"
            );
        } else {
            info!(
                event = "decision_made",
                scope = %self.scope,
                action = %decision.action,
                priority = %decision.priority,
                level = %decision.assessment.level,
                avg_cpu = decision.avg_cpu,
                avg_memory = decision.avg_memory,
                history_samples = decision.history_samples,
                reason = %decision.reason,
                "Allocation decision made"
            );
        }
    }

    pub fn log_assessment(&self, assessment: &UtilizationAssessment) {
        info!(
            event = "utilization_assessed",
            scope = %self.scope,
            level = %assessment.level,
            bottlenecks = %assessment.bottleneck_messages().join("; "),
            "Utilization assessed"
        );
    }

    pub fn log_pool_sizing(
        &self,
        concurrent_users: u32,
        avg_queries_per_user: f64,
        pool: &PoolSizeRecommendation,
    ) {
        info!(
            event = "pool_sized",
            scope = %self.scope,
            concurrent_users = concurrent_users,
            avg_queries_per_user = avg_queries_per_user,
            min = pool.min,
            recommended = pool.recommended,
            max = pool.max,
            "Connection pool sized"
        );
    }

    pub fn log_cache_plan(
        &self,
        total_memory_mb: f64,
        available_mb: f64,
        plan: &CacheAllocationPlan,
    ) {
        if plan.is_overcommitted(available_mb) {
            warn!(
                event = "cache_planned",
                scope = %self.scope,
                total_memory_mb = total_memory_mb,
                available_mb = available_mb,
                allocated_mb = plan.total_mb(),
                categories = plan.len(),
                overcommitted = true,
                "Cache plan overcommits available memory"
            );
        } else {
            info!(
                event = "cache_planned",
                scope = %self.scope,
                total_memory_mb = total_memory_mb,
                available_mb = available_mb,
                allocated_mb = plan.total_mb(),
                categories = plan.len(),
                overcommitted = false,
                "Cache plan computed"
            );
        }
    }

    /// Log input rejected by validation
    pub fn log_invalid_input(&self, source: &str, error: &dyn std::error::Error) {
        warn!(
            event = "invalid_input",
            scope = %self.scope,
            source = %source,
            error = %error,
            "Rejected invalid controller input"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceMetrics;
    use crate::scaling::ScalingDecisionEngine;

    #[test]
    fn test_controller_metrics_record_decision() {
        // Collectors live in the global registry, so compare deltas rather
        // than absolute values.
        let metrics = ControllerMetrics::new();
        let before = metrics.decisions_recorded("scale_up", "critical");

        let decision = ScalingDecisionEngine::new().decide(
            &ResourceMetrics {
                cpu: 95.0,
                memory: 50.0,
                disk_io: 0.0,
                network_io: 0.0,
                active_connections: 100,
                queue_length: 10,
            },
            std::iter::empty(),
        );
        metrics.record_decision(&decision);
        metrics.observe_evaluation_latency(0.00002);

        assert_eq!(metrics.decisions_recorded("scale_up", "critical"), before + 1);
    }

    #[test]
    fn test_controller_metrics_advisors() {
        let metrics = ControllerMetrics::new();
        metrics.record_pool_size(&PoolSizeRecommendation {
            min: 90,
            recommended: 360,
            max: 540,
            demand: 360,
        });

        let mut plan = CacheAllocationPlan::new();
        plan.insert("feed_cache", 175.0);
        metrics.record_cache_plan(&plan);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test-cluster");
        assert_eq!(logger.scope, "test-cluster");
    }
}
