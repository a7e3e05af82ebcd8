//! Core data models for the allocation controller

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, ControllerResult};

/// Infrastructure metrics snapshot supplied by the collection pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    /// CPU utilization percentage (0-100)
    pub cpu: f64,
    /// Memory utilization percentage (0-100)
    pub memory: f64,
    /// Disk operations per second
    #[serde(default, alias = "diskIO")]
    pub disk_io: f64,
    /// Network throughput in MB/s
    #[serde(default, alias = "networkIO")]
    pub network_io: f64,
    /// Live connections; unsigned, so a negative count fails to deserialize
    #[serde(default, alias = "activeConnections")]
    pub active_connections: u32,
    /// Requests awaiting service; unsigned like `active_connections`
    #[serde(default, alias = "queueLength")]
    pub queue_length: u32,
}

impl ResourceMetrics {
    /// Check that every field is finite and inside its documented domain.
    ///
    /// The assessor and engine never call this; out-of-range values are
    /// treated literally unless the caller opts into validation.
    pub fn validate(&self) -> ControllerResult<()> {
        check_percentage("cpu", self.cpu)?;
        check_percentage("memory", self.memory)?;
        check_rate("disk_io", self.disk_io)?;
        check_rate("network_io", self.network_io)?;
        Ok(())
    }
}

fn check_percentage(field: &'static str, value: f64) -> ControllerResult<()> {
    if !value.is_finite() {
        return Err(ControllerError::InvalidMetrics {
            field,
            value,
            reason: "not a finite number",
        });
    }
    if !(0.0..=100.0).contains(&value) {
        return Err(ControllerError::InvalidMetrics {
            field,
            value,
            reason: "percentage outside 0-100",
        });
    }
    Ok(())
}

fn check_rate(field: &'static str, value: f64) -> ControllerResult<()> {
    if !value.is_finite() {
        return Err(ControllerError::InvalidMetrics {
            field,
            value,
            reason: "not a finite number",
        });
    }
    if value < 0.0 {
        return Err(ControllerError::InvalidMetrics {
            field,
            value,
            reason: "rate cannot be negative",
        });
    }
    Ok(())
}

/// Severity classification of a single snapshot.
///
/// Variant order is the severity order, so `max` escalates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UtilizationLevel {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl UtilizationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UtilizationLevel::Low => "low",
            UtilizationLevel::Normal => "normal",
            UtilizationLevel::High => "high",
            UtilizationLevel::Critical => "critical",
        }
    }

    /// Numeric gauge value (0 = low .. 3 = critical)
    pub fn ordinal(&self) -> i64 {
        *self as i64
    }
}

impl fmt::Display for UtilizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource a bottleneck was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleneckKind {
    Cpu,
    Memory,
    Connections,
    Queue,
}

/// A single finding that contributed to an elevated utilization level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub kind: BottleneckKind,
    /// Level this finding alone implies
    pub level: UtilizationLevel,
    /// Observed value (percentage, or queue length for `Queue`)
    pub observed: f64,
    /// Threshold that was exceeded
    pub threshold: f64,
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let critical = self.level == UtilizationLevel::Critical;
        match (self.kind, critical) {
            (BottleneckKind::Cpu, true) => write!(f, "CPU at critical level"),
            (BottleneckKind::Cpu, false) => write!(f, "CPU utilization high"),
            (BottleneckKind::Memory, true) => write!(f, "Memory at critical level"),
            (BottleneckKind::Memory, false) => write!(f, "Memory utilization high"),
            (BottleneckKind::Connections, true) => write!(f, "Connection pool near capacity"),
            (BottleneckKind::Connections, false) => write!(f, "Connection utilization high"),
            (BottleneckKind::Queue, _) => write!(f, "Request queue backing up"),
        }
    }
}

/// Result of classifying one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilizationAssessment {
    pub level: UtilizationLevel,
    /// Findings in rule evaluation order
    pub bottlenecks: Vec<Bottleneck>,
}

impl UtilizationAssessment {
    /// Human-readable findings, in evaluation order
    pub fn bottleneck_messages(&self) -> Vec<String> {
        self.bottlenecks.iter().map(|b| b.to_string()).collect()
    }

    pub fn has_bottleneck(&self, message: &str) -> bool {
        self.bottlenecks.iter().any(|b| b.to_string() == message)
    }
}

/// Recommended scaling action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingAction {
    ScaleUp,
    ScaleDown,
    Rebalance,
    Maintain,
}

impl ScalingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalingAction::ScaleUp => "scale_up",
            ScalingAction::ScaleDown => "scale_down",
            ScalingAction::Rebalance => "rebalance",
            ScalingAction::Maintain => "maintain",
        }
    }
}

impl fmt::Display for ScalingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The controller's advisory output for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub action: ScalingAction,
    pub priority: Priority,
    /// Single-sentence justification, never empty
    pub reason: String,
    /// Operational suggestions, at least one
    pub recommendations: Vec<String>,
    /// Assessment of the current snapshot
    pub assessment: UtilizationAssessment,
    /// Mean CPU over the history (current CPU on cold start)
    pub avg_cpu: f64,
    /// Mean memory over the history (current memory on cold start)
    pub avg_memory: f64,
    /// Number of historical samples averaged
    pub history_samples: usize,
}

impl AllocationDecision {
    /// Display urgency: critical scale-up (4) > scale-up (3) > rebalance (2)
    /// > scale-down (1) > maintain (0)
    pub fn urgency(&self) -> u8 {
        match (self.action, self.priority) {
            (ScalingAction::ScaleUp, Priority::Critical) => 4,
            (ScalingAction::ScaleUp, _) => 3,
            (ScalingAction::Rebalance, _) => 2,
            (ScalingAction::ScaleDown, _) => 1,
            (ScalingAction::Maintain, _) => 0,
        }
    }
}

/// Connection pool size envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSizeRecommendation {
    pub min: u64,
    pub recommended: u64,
    pub max: u64,
    /// Spike-buffered demand before the minimum floor is applied
    pub demand: u64,
}

/// Memory budget per cache category, in megabytes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheAllocationPlan {
    entries: BTreeMap<String, f64>,
}

impl CacheAllocationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the budget for a category, replacing any earlier entry
    pub fn insert(&mut self, category: impl Into<String>, megabytes: f64) {
        self.entries.insert(category.into(), megabytes);
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.entries.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all category budgets
    pub fn total_mb(&self) -> f64 {
        self.entries.values().sum()
    }

    /// True if the plan hands out more than `available_mb`
    pub fn is_overcommitted(&self, available_mb: f64) -> bool {
        self.total_mb() > available_mb + 1e-9 * available_mb.abs().max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(cpu: f64, memory: f64) -> ResourceMetrics {
        ResourceMetrics {
            cpu,
            memory,
            disk_io: 100.0,
            network_io: 10.0,
            active_connections: 10,
            queue_length: 0,
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(UtilizationLevel::Low < UtilizationLevel::Normal);
        assert!(UtilizationLevel::Normal < UtilizationLevel::High);
        assert!(UtilizationLevel::High < UtilizationLevel::Critical);
        assert_eq!(UtilizationLevel::Low.max(UtilizationLevel::High), UtilizationLevel::High);
        assert_eq!(UtilizationLevel::Critical.ordinal(), 3);
    }

    #[test]
    fn test_validate_accepts_in_range() {
        assert!(metrics(0.0, 100.0).validate().is_ok());
        assert!(metrics(55.5, 20.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan_and_out_of_range() {
        let err = metrics(f64::NAN, 10.0).validate().unwrap_err();
        assert!(matches!(err, ControllerError::InvalidMetrics { field: "cpu", .. }));

        let err = metrics(10.0, 120.0).validate().unwrap_err();
        assert!(matches!(err, ControllerError::InvalidMetrics { field: "memory", .. }));

        let mut m = metrics(10.0, 10.0);
        m.disk_io = -1.0;
        let err = m.validate().unwrap_err();
        assert!(matches!(err, ControllerError::InvalidMetrics { field: "disk_io", .. }));
    }

    #[test]
    fn test_metrics_accepts_camel_case_aliases() {
        let json = r#"{"cpu": 40, "memory": 40, "diskIO": 12.5, "networkIO": 3,
                       "activeConnections": 200, "queueLength": 150}"#;
        let m: ResourceMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(m.active_connections, 200);
        assert_eq!(m.queue_length, 150);
        assert_eq!(m.disk_io, 12.5);
    }

    #[test]
    fn test_metrics_rejects_negative_counts() {
        let negative_connections = r#"{"cpu": 40, "memory": 40, "activeConnections": -1}"#;
        assert!(serde_json::from_str::<ResourceMetrics>(negative_connections).is_err());

        let negative_queue = r#"{"cpu": 40, "memory": 40, "queueLength": -5}"#;
        assert!(serde_json::from_str::<ResourceMetrics>(negative_queue).is_err());

        // Negative percentages and rates are still taken literally
        let m: ResourceMetrics =
            serde_json::from_str(r#"{"cpu": -3, "memory": 40, "diskIO": -1}"#).unwrap();
        assert_eq!(m.cpu, -3.0);
        assert_eq!(m.disk_io, -1.0);
    }

    #[test]
    fn test_bottleneck_display() {
        let b = Bottleneck {
            kind: BottleneckKind::Cpu,
            level: UtilizationLevel::Critical,
            observed: 95.0,
            threshold: 90.0,
        };
        assert_eq!(b.to_string(), "CPU at critical level");

        let q = Bottleneck {
            kind: BottleneckKind::Queue,
            level: UtilizationLevel::High,
            observed: 600.0,
            threshold: 500.0,
        };
        assert_eq!(q.to_string(), "Request queue backing up");
    }

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&ScalingAction::ScaleUp).unwrap();
        assert_eq!(json, "\"scale_up\"");
        let json = serde_json::to_string(&Priority::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn test_cache_plan_overcommit() {
        let mut plan = CacheAllocationPlan::new();
        plan.insert("a", 60.0);
        plan.insert("b", 50.0);
        assert!(plan.is_overcommitted(100.0));
        assert!(!plan.is_overcommitted(110.0));

        plan.insert("b", 10.0);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.total_mb(), 70.0);
    }
}
