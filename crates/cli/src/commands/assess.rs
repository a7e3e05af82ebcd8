//! Utilization assessment command

use allocator_lib::{Bottleneck, BottleneckKind, ResourceMetrics, UtilizationAssessor};
use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use super::CommandContext;
use crate::input;
use crate::output::{self, OutputFormat};

/// Table row for a single finding
#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Finding")]
    finding: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Observed")]
    observed: String,
    #[tabled(rename = "Threshold")]
    threshold: String,
}

impl From<&Bottleneck> for FindingRow {
    fn from(bottleneck: &Bottleneck) -> Self {
        let format_value = |value: f64| match bottleneck.kind {
            BottleneckKind::Queue => format!("{:.0}", value),
            _ => output::format_percent(value),
        };
        Self {
            finding: bottleneck.to_string(),
            level: output::color_level(bottleneck.level),
            observed: format_value(bottleneck.observed),
            threshold: format_value(bottleneck.threshold),
        }
    }
}

#[derive(Serialize)]
struct AssessOutput<'a> {
    metrics: &'a ResourceMetrics,
    connection_utilization: f64,
    #[serde(flatten)]
    assessment: &'a allocator_lib::UtilizationAssessment,
}

/// Classify one snapshot read from `metrics_path`
pub fn run(ctx: &CommandContext, metrics_path: &str) -> Result<()> {
    let metrics = input::read_metrics(metrics_path)?;
    let assessor = UtilizationAssessor::with_config(ctx.config.assessor);

    let assessment = assessor.assess(&metrics);
    ctx.metrics.record_assessment(&assessment);
    ctx.logger.log_assessment(&assessment);

    let connection_utilization = assessor.connection_utilization(&metrics);

    match ctx.format {
        OutputFormat::Json => output::print_json(&AssessOutput {
            metrics: &metrics,
            connection_utilization,
            assessment: &assessment,
        })?,
        OutputFormat::Table => {
            output::print_info(&format!(
                "Utilization level: {}",
                output::color_level(assessment.level)
            ));
            println!(
                "  CPU {}  memory {}  connections {}  queue {}",
                output::format_percent(metrics.cpu),
                output::format_percent(metrics.memory),
                output::format_percent(connection_utilization),
                metrics.queue_length
            );
            println!();
            let rows: Vec<FindingRow> = assessment.bottlenecks.iter().map(Into::into).collect();
            output::print_table(&rows, "No bottlenecks found");
        }
    }

    Ok(())
}
