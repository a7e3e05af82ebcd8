//! Scaling decision command

use allocator_lib::{
    AllocationDecision, MetricsWindow, ScalingDecisionEngine, UtilizationAssessor,
};
use anyhow::Result;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

use super::CommandContext;
use crate::input;
use crate::output::{self, OutputFormat};

/// Arguments for a single decision
pub struct DecideArgs<'a> {
    pub metrics_path: &'a str,
    pub history_path: Option<&'a str>,
    pub current_instances: Option<u32>,
    pub strict: bool,
}

#[derive(Serialize)]
struct DecideOutput<'a> {
    #[serde(flatten)]
    decision: &'a AllocationDecision,
    urgency: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_instances: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_instances: Option<u32>,
}

/// Load the most recent `capacity` snapshots into a window
fn load_window(path: Option<&str>, capacity: usize) -> Result<MetricsWindow> {
    let mut window = MetricsWindow::with_capacity(capacity);
    let Some(path) = path else {
        return Ok(window);
    };

    let history = input::read_history(path)?;
    let total = history.len();
    window.extend(history);
    if total > window.len() {
        debug!(
            read = total,
            kept = window.len(),
            "Trimmed history to the configured window"
        );
    }
    Ok(window)
}

pub fn run(ctx: &CommandContext, args: DecideArgs<'_>) -> Result<()> {
    let current = input::read_metrics(args.metrics_path)?;
    let window = load_window(args.history_path, ctx.config.history_capacity)?;

    let engine = ScalingDecisionEngine::with_options(ctx.config.scaling.clone())
        .with_assessor(UtilizationAssessor::with_config(ctx.config.assessor));

    let started = Instant::now();
    let decision = if args.strict {
        engine.try_decide(&current, &window).map_err(|err| {
            ctx.logger.log_invalid_input(args.metrics_path, &err);
            err
        })?
    } else {
        engine.decide(&current, &window)
    };
    ctx.metrics
        .observe_evaluation_latency(started.elapsed().as_secs_f64());
    ctx.metrics.record_decision(&decision);
    ctx.logger.log_decision(&decision);

    let target_instances = args
        .current_instances
        .map(|instances| engine.target_instances(&decision, instances));

    match ctx.format {
        OutputFormat::Json => output::print_json(&DecideOutput {
            decision: &decision,
            urgency: decision.urgency(),
            current_instances: args.current_instances,
            target_instances,
        })?,
        OutputFormat::Table => print_decision(&decision, args.current_instances, target_instances),
    }

    Ok(())
}

fn print_decision(decision: &AllocationDecision, current: Option<u32>, target: Option<u32>) {
    println!(
        "Action:   {} ({} priority)",
        output::color_action(decision.action),
        output::color_priority(decision.priority)
    );
    println!("Level:    {}", output::color_level(decision.assessment.level));
    println!(
        "Averages: CPU {}, memory {} over {} sample(s)",
        output::format_percent(decision.avg_cpu),
        output::format_percent(decision.avg_memory),
        decision.history_samples
    );
    println!("Reason:   {}", decision.reason);

    if let (Some(current), Some(target)) = (current, target) {
        if target == current {
            output::print_info(&format!("Instances: stay at {}", current));
        } else {
            output::print_warning(&format!("Instances: {} -> {}", current, target));
        }
    }

    println!();
    println!("Recommendations:");
    for recommendation in &decision.recommendations {
        println!("  - {}", recommendation);
    }
}
