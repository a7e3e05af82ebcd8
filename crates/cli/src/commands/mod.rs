//! Command implementations

pub mod advisors;
pub mod assess;
pub mod decide;

use allocator_lib::{ControllerMetrics, StructuredLogger};

use crate::config::ControllerConfig;
use crate::output::OutputFormat;

/// State shared by every command invocation
pub struct CommandContext {
    pub config: ControllerConfig,
    pub format: OutputFormat,
    pub logger: StructuredLogger,
    pub metrics: ControllerMetrics,
}

impl CommandContext {
    pub fn new(config: ControllerConfig, format: OutputFormat) -> Self {
        let logger = StructuredLogger::new(config.scope.clone());
        Self {
            config,
            format,
            logger,
            metrics: ControllerMetrics::new(),
        }
    }
}
