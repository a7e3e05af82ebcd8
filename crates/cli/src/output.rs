//! Output formatting utilities

use allocator_lib::{Priority, ScalingAction, UtilizationLevel};
use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a rounded table, or a notice when there are no rows
pub fn print_table<T: Tabled>(items: &[T], empty_message: &str) {
    if items.is_empty() {
        println!("{}", empty_message.yellow());
        return;
    }
    let table = Table::new(items).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a percentage
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Format megabytes, switching to gigabytes above 1024
pub fn format_mb(megabytes: f64) -> String {
    if megabytes >= 1024.0 {
        format!("{:.2}Gi", megabytes / 1024.0)
    } else {
        format!("{:.1}Mi", megabytes)
    }
}

/// Color a utilization level
pub fn color_level(level: UtilizationLevel) -> String {
    let text = level.as_str();
    match level {
        UtilizationLevel::Low => text.cyan().to_string(),
        UtilizationLevel::Normal => text.green().to_string(),
        UtilizationLevel::High => text.yellow().to_string(),
        UtilizationLevel::Critical => text.red().bold().to_string(),
    }
}

/// Color a scaling action
pub fn color_action(action: ScalingAction) -> String {
    let text = action.as_str();
    match action {
        ScalingAction::ScaleUp => text.red().bold().to_string(),
        ScalingAction::Rebalance => text.yellow().to_string(),
        ScalingAction::ScaleDown => text.cyan().to_string(),
        ScalingAction::Maintain => text.green().to_string(),
    }
}

/// Color a priority
pub fn color_priority(priority: Priority) -> String {
    let text = priority.as_str();
    match priority {
        Priority::Critical => text.red().bold().to_string(),
        Priority::High => text.red().to_string(),
        Priority::Medium => text.yellow().to_string(),
        Priority::Low => text.green().to_string(),
    }
}

/// Write every registered metric to `path` in the Prometheus text format.
///
/// The file is written next to its destination and renamed into place so a
/// textfile collector never reads a partial exposition.
pub fn write_textfile(path: &Path) -> Result<()> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;

    let staging = path.with_extension("prom.tmp");
    std::fs::write(&staging, &buffer)
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    std::fs::rename(&staging, path)
        .with_context(|| format!("Failed to move metrics into {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mb() {
        assert_eq!(format_mb(175.0), "175.0Mi");
        assert_eq!(format_mb(2048.0), "2.00Gi");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(75.04), "75.0%");
    }

    #[test]
    fn test_write_textfile() {
        allocator_lib::ControllerMetrics::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rac.prom");

        write_textfile(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("rac_utilization_level"));
        assert!(!dir.path().join("rac.prom.tmp").exists());
    }
}
