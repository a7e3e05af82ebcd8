//! Scaling thresholds and instance bounds

use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, ControllerResult};

/// Sustained average CPU above which the engine scales up
pub const DEFAULT_SCALE_UP_THRESHOLD: f64 = 75.0;

/// Sustained average CPU below which the engine may scale down
pub const DEFAULT_SCALE_DOWN_THRESHOLD: f64 = 25.0;

/// Average memory must also stay below this for a scale-down
pub const DEFAULT_SCALE_DOWN_MEMORY_CEILING: f64 = 40.0;

/// Queue length above which an idle-CPU service is considered imbalanced
pub const DEFAULT_IMBALANCE_QUEUE_LENGTH: u32 = 100;

/// CPU below which a queue buildup points at uneven distribution
pub const DEFAULT_IMBALANCE_CPU_CEILING: f64 = 60.0;

/// Options for the scaling decision engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingOptions {
    pub scale_up_threshold: f64,
    pub scale_down_threshold: f64,
    pub scale_down_memory_ceiling: f64,
    pub imbalance_queue_length: u32,
    pub imbalance_cpu_ceiling: f64,
    /// Floor enforced by `target_instances`
    pub min_instances: u32,
    /// Ceiling enforced by `target_instances`
    pub max_instances: u32,
    /// Instances added or removed per step (doubled for critical scale-ups)
    pub scale_step: u32,
}

impl Default for ScalingOptions {
    fn default() -> Self {
        Self {
            scale_up_threshold: DEFAULT_SCALE_UP_THRESHOLD,
            scale_down_threshold: DEFAULT_SCALE_DOWN_THRESHOLD,
            scale_down_memory_ceiling: DEFAULT_SCALE_DOWN_MEMORY_CEILING,
            imbalance_queue_length: DEFAULT_IMBALANCE_QUEUE_LENGTH,
            imbalance_cpu_ceiling: DEFAULT_IMBALANCE_CPU_CEILING,
            min_instances: 1,
            max_instances: 10,
            scale_step: 1,
        }
    }
}

impl ScalingOptions {
    pub fn validate(&self) -> ControllerResult<()> {
        for (name, value) in [
            ("scale_up_threshold", self.scale_up_threshold),
            ("scale_down_threshold", self.scale_down_threshold),
            ("scale_down_memory_ceiling", self.scale_down_memory_ceiling),
            ("imbalance_cpu_ceiling", self.imbalance_cpu_ceiling),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ControllerError::InvalidOptions(format!(
                    "{} must be a percentage between 0 and 100, got {}",
                    name, value
                )));
            }
        }

        if self.scale_down_threshold >= self.scale_up_threshold {
            return Err(ControllerError::InvalidOptions(
                "scale_down_threshold must be below scale_up_threshold".to_string(),
            ));
        }

        if self.min_instances == 0 {
            return Err(ControllerError::InvalidOptions(
                "min_instances must be at least 1".to_string(),
            ));
        }

        if self.max_instances < self.min_instances {
            return Err(ControllerError::InvalidOptions(
                "max_instances must be greater than or equal to min_instances".to_string(),
            ));
        }

        if self.scale_step == 0 {
            return Err(ControllerError::InvalidOptions(
                "scale_step must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Clamp an instance count into `[min_instances, max_instances]`
    pub fn clamp_instances(&self, instances: u32) -> u32 {
        instances.max(self.min_instances).min(self.max_instances)
    }
}
