//! Reading metric snapshots from files or stdin

use allocator_lib::ResourceMetrics;
use anyhow::{Context, Result};
use std::io::Read;

/// Path that selects standard input
pub const STDIN_PATH: &str = "-";

fn read_source(path: &str) -> Result<String> {
    if path == STDIN_PATH {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read metrics from stdin")?;
        return Ok(content);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
}

/// Read a single snapshot encoded as a JSON object
pub fn read_metrics(path: &str) -> Result<ResourceMetrics> {
    let content = read_source(path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid metrics snapshot in {}", path))
}

/// Read history as a JSON array, or as JSON Lines with one snapshot per line
pub fn read_history(path: &str) -> Result<Vec<ResourceMetrics>> {
    let content = read_source(path)?;
    parse_history(&content).with_context(|| format!("Invalid metrics history in {}", path))
}

fn parse_history(content: &str) -> Result<Vec<ResourceMetrics>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}", number + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_history_array() {
        let history = parse_history(
            r#"[{"cpu": 10, "memory": 20}, {"cpu": 30, "memory": 40, "queueLength": 5}]"#,
        )
        .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].queue_length, 5);
    }

    #[test]
    fn test_parse_history_json_lines() {
        let history = parse_history(
            "{\"cpu\": 10, \"memory\": 20}\n\n{\"cpu\": 30, \"memory\": 40}\n",
        )
        .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].cpu, 10.0);
    }

    #[test]
    fn test_parse_history_reports_bad_line() {
        let err = parse_history("{\"cpu\": 10, \"memory\": 20}\nnot json\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_parse_history_counts_leading_blank_lines() {
        let err = parse_history("\n\n{\"cpu\": 10, \"memory\": 20}\nnot json\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 4"));
    }

    #[test]
    fn test_parse_empty_history() {
        assert!(parse_history("").unwrap().is_empty());
    }

    #[test]
    fn test_read_metrics_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        std::fs::write(
            &path,
            r#"{"cpu": 55.5, "memory": 60, "diskIO": 10, "networkIO": 5,
                "activeConnections": 120, "queueLength": 3}"#,
        )
        .unwrap();

        let metrics = read_metrics(path.to_str().unwrap()).unwrap();
        assert_eq!(metrics.cpu, 55.5);
        assert_eq!(metrics.active_connections, 120);
    }
}
