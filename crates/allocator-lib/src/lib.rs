//! Adaptive resource allocation controller
//!
//! This crate provides the advisory logic for:
//! - Utilization assessment of infrastructure metrics snapshots
//! - Horizontal scaling decisions over a rolling history window
//! - Connection pool sizing from expected concurrency
//! - Cache memory partitioning across named categories
//! - Observability helpers for callers
//!
//! All advisory operations are pure and synchronous. Executing scaling
//! actions, collecting metrics and persisting history are left to callers.

pub mod advisor;
pub mod assessor;
pub mod error;
pub mod models;
pub mod observability;
pub mod scaling;

pub use advisor::{CacheAllocator, CacheConfig, ConnectionPoolSizer, PoolConfig};
pub use assessor::{AssessorConfig, UtilizationAssessor};
pub use error::{ControllerError, ControllerResult};
pub use models::*;
pub use observability::{ControllerMetrics, StructuredLogger};
pub use scaling::{HistoricalAverages, MetricsWindow, ScalingDecisionEngine, ScalingOptions};
