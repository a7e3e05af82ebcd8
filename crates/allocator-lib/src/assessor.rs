//! Utilization assessment
//!
//! Classifies a single metrics snapshot into a severity level and the list
//! of bottlenecks that produced it. Rules run in a fixed order (CPU, memory,
//! connections, queue) and may only raise the level, with the exception of
//! the CPU-low rule, which is the sole source of `Low` and runs first.
//! All thresholds are exclusive: a value exactly at a threshold does not fire.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ControllerError, ControllerResult};
use crate::models::{
    Bottleneck, BottleneckKind, ResourceMetrics, UtilizationAssessment, UtilizationLevel,
};

/// Nominal connection capacity used to turn a connection count into a percentage
pub const DEFAULT_CONNECTION_CAPACITY: u32 = 1000;

pub const CPU_CRITICAL_PERCENT: f64 = 90.0;
pub const CPU_HIGH_PERCENT: f64 = 75.0;
pub const CPU_LOW_PERCENT: f64 = 20.0;

pub const MEMORY_CRITICAL_PERCENT: f64 = 90.0;
pub const MEMORY_HIGH_PERCENT: f64 = 80.0;

pub const CONNECTIONS_CRITICAL_PERCENT: f64 = 90.0;
pub const CONNECTIONS_HIGH_PERCENT: f64 = 75.0;

/// Queue length above which requests are considered backed up
pub const QUEUE_BACKLOG_LENGTH: u32 = 500;

/// Configuration for the assessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessorConfig {
    /// Connections the service can hold at 100% utilization
    pub connection_capacity: u32,
}

impl Default for AssessorConfig {
    fn default() -> Self {
        Self {
            connection_capacity: DEFAULT_CONNECTION_CAPACITY,
        }
    }
}

impl AssessorConfig {
    pub fn validate(&self) -> ControllerResult<()> {
        if self.connection_capacity == 0 {
            return Err(ControllerError::InvalidOptions(
                "connection_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Classifies snapshots into utilization levels
#[derive(Debug, Clone, Default)]
pub struct UtilizationAssessor {
    config: AssessorConfig,
}

impl UtilizationAssessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AssessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssessorConfig {
        &self.config
    }

    /// Connection count as a percentage of the configured capacity
    pub fn connection_utilization(&self, metrics: &ResourceMetrics) -> f64 {
        metrics.active_connections as f64 / self.config.connection_capacity as f64 * 100.0
    }

    /// Classify a snapshot. Total and deterministic; never fails.
    pub fn assess(&self, metrics: &ResourceMetrics) -> UtilizationAssessment {
        let mut findings = Findings::default();

        if metrics.cpu > CPU_CRITICAL_PERCENT {
            findings.flag(
                BottleneckKind::Cpu,
                UtilizationLevel::Critical,
                metrics.cpu,
                CPU_CRITICAL_PERCENT,
            );
        } else if metrics.cpu > CPU_HIGH_PERCENT {
            findings.flag(
                BottleneckKind::Cpu,
                UtilizationLevel::High,
                metrics.cpu,
                CPU_HIGH_PERCENT,
            );
        } else if metrics.cpu < CPU_LOW_PERCENT {
            findings.level = UtilizationLevel::Low;
        }

        if metrics.memory > MEMORY_CRITICAL_PERCENT {
            findings.flag(
                BottleneckKind::Memory,
                UtilizationLevel::Critical,
                metrics.memory,
                MEMORY_CRITICAL_PERCENT,
            );
        } else if metrics.memory > MEMORY_HIGH_PERCENT {
            findings.flag(
                BottleneckKind::Memory,
                UtilizationLevel::High,
                metrics.memory,
                MEMORY_HIGH_PERCENT,
            );
        }

        let connections = self.connection_utilization(metrics);
        if connections > CONNECTIONS_CRITICAL_PERCENT {
            findings.flag(
                BottleneckKind::Connections,
                UtilizationLevel::Critical,
                connections,
                CONNECTIONS_CRITICAL_PERCENT,
            );
        } else if connections > CONNECTIONS_HIGH_PERCENT {
            findings.flag(
                BottleneckKind::Connections,
                UtilizationLevel::High,
                connections,
                CONNECTIONS_HIGH_PERCENT,
            );
        }

        if metrics.queue_length > QUEUE_BACKLOG_LENGTH {
            findings.flag(
                BottleneckKind::Queue,
                UtilizationLevel::High,
                metrics.queue_length as f64,
                QUEUE_BACKLOG_LENGTH as f64,
            );
        }

        debug!(
            level = %findings.level,
            bottlenecks = findings.bottlenecks.len(),
            cpu = metrics.cpu,
            memory = metrics.memory,
            connection_utilization = connections,
            queue_length = metrics.queue_length,
            "Assessed utilization"
        );

        UtilizationAssessment {
            level: findings.level,
            bottlenecks: findings.bottlenecks,
        }
    }
}

#[derive(Default)]
struct Findings {
    level: UtilizationLevel,
    bottlenecks: Vec<Bottleneck>,
}

impl Findings {
    /// Record a bottleneck and raise the level to at least `level`
    fn flag(
        &mut self,
        kind: BottleneckKind,
        level: UtilizationLevel,
        observed: f64,
        threshold: f64,
    ) {
        self.bottlenecks.push(Bottleneck {
            kind,
            level,
            observed,
            threshold,
        });
        self.level = self.level.max(level);
    }
}
