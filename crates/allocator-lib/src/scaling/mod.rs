//! Horizontal scaling decisions
//!
//! This module provides:
//! - The decision cascade over the current snapshot and history averages
//! - Scaling thresholds and instance bounds
//! - A caller-owned rolling window of past snapshots

mod engine;
mod history;
mod options;


pub use engine::ScalingDecisionEngine;
pub use history::{HistoricalAverages, MetricsWindow, DEFAULT_HISTORY_CAPACITY};
pub use options::{
    ScalingOptions, DEFAULT_IMBALANCE_CPU_CEILING, DEFAULT_IMBALANCE_QUEUE_LENGTH,
    DEFAULT_SCALE_DOWN_MEMORY_CEILING, DEFAULT_SCALE_DOWN_THRESHOLD, DEFAULT_SCALE_UP_THRESHOLD,
};
