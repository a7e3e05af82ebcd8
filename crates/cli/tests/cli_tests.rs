//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI with an isolated home directory so no user config is read
fn rac(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rac"))
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("RAC_CONFIG")
        .output()
        .expect("Failed to execute command")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    let output = rac(home.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Adaptive Resource Allocation Controller"),
        "Should show app name"
    );
    for command in ["assess", "decide", "pool", "cache", "config"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let output = rac(home.path(), &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("rac"), "Should show binary name");
}

#[test]
fn test_assess_critical_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = write(
        dir.path(),
        "metrics.json",
        r#"{"cpu": 95, "memory": 85, "diskIO": 0, "networkIO": 0,
            "activeConnections": 950, "queueLength": 600}"#,
    );

    let value = json_stdout(&rac(
        dir.path(),
        &["--format", "json", "assess", "--metrics", &metrics],
    ));
    assert_eq!(value["level"], "critical");
    assert_eq!(value["bottlenecks"].as_array().unwrap().len(), 4);
}

#[test]
fn test_decide_critical_scale_up() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = write(
        dir.path(),
        "metrics.json",
        r#"{"cpu": 95, "memory": 50, "activeConnections": 100, "queueLength": 10}"#,
    );

    let value = json_stdout(&rac(
        dir.path(),
        &[
            "--format",
            "json",
            "decide",
            "--metrics",
            &metrics,
            "--current-instances",
            "3",
        ],
    ));
    assert_eq!(value["action"], "scale_up");
    assert_eq!(value["priority"], "critical");
    assert_eq!(value["urgency"], 4);
    assert_eq!(value["target_instances"], 5);
    assert!(value["reason"]
        .as_str()
        .unwrap()
        .contains("CPU at critical level"));
}

#[test]
fn test_decide_scale_down_with_history() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = write(
        dir.path(),
        "metrics.json",
        r#"{"cpu": 15, "memory": 30, "activeConnections": 50, "queueLength": 0}"#,
    );
    let history = write(
        dir.path(),
        "history.jsonl",
        "{\"cpu\": 18, \"memory\": 35}\n{\"cpu\": 20, \"memory\": 32}\n",
    );

    let value = json_stdout(&rac(
        dir.path(),
        &[
            "--format",
            "json",
            "decide",
            "--metrics",
            &metrics,
            "--history",
            &history,
            "--current-instances",
            "3",
        ],
    ));
    assert_eq!(value["action"], "scale_down");
    assert_eq!(value["priority"], "low");
    assert_eq!(value["history_samples"], 2);
    assert_eq!(value["target_instances"], 2);
}

#[test]
fn test_decide_rebalance() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = write(
        dir.path(),
        "metrics.json",
        r#"{"cpu": 35, "memory": 50, "activeConnections": 200, "queueLength": 150}"#,
    );

    let value = json_stdout(&rac(
        dir.path(),
        &["--format", "json", "decide", "--metrics", &metrics],
    ));
    assert_eq!(value["action"], "rebalance");
    assert_eq!(value["priority"], "medium");
}

#[test]
fn test_decide_strict_rejects_out_of_range_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = write(
        dir.path(),
        "metrics.json",
        r#"{"cpu": 150, "memory": 50, "activeConnections": 100, "queueLength": 10}"#,
    );

    let lenient = rac(dir.path(), &["--format", "json", "decide", "--metrics", &metrics]);
    assert_eq!(json_stdout(&lenient)["action"], "scale_up");

    let strict = rac(
        dir.path(),
        &["--format", "json", "decide", "--metrics", &metrics, "--strict"],
    );
    assert!(!strict.status.success());
    let stderr = String::from_utf8_lossy(&strict.stderr);
    assert!(stderr.contains("cpu"), "stderr: {}", stderr);
}

#[test]
fn test_decide_respects_configured_max_instances() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "rac.toml", "[scaling]\nmax_instances = 3\n");
    let metrics = write(
        dir.path(),
        "metrics.json",
        r#"{"cpu": 95, "memory": 50, "activeConnections": 100, "queueLength": 10}"#,
    );

    let value = json_stdout(&rac(
        dir.path(),
        &[
            "--config",
            &config,
            "--format",
            "json",
            "decide",
            "--metrics",
            &metrics,
            "--current-instances",
            "3",
        ],
    ));
    assert_eq!(value["target_instances"], 3);
}

#[test]
fn test_env_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_rac"))
        .args(["--format", "json", "config"])
        .env("HOME", dir.path())
        .env("RAC_SCALING__MAX_INSTANCES", "20")
        .output()
        .expect("Failed to execute command");

    let value = json_stdout(&output);
    assert_eq!(value["scaling"]["max_instances"], 20);
    assert_eq!(value["scaling"]["min_instances"], 1);
}

#[test]
fn test_pool_reference_sizing() {
    let home = tempfile::tempdir().unwrap();
    let value = json_stdout(&rac(
        home.path(),
        &[
            "--format",
            "json",
            "pool",
            "--users",
            "100",
            "--queries-per-user",
            "3",
        ],
    ));
    assert_eq!(value["recommended"], 360);
    assert_eq!(value["min"], 90);
    assert_eq!(value["max"], 540);
}

#[test]
fn test_cache_known_and_unknown_types() {
    let home = tempfile::tempdir().unwrap();
    let value = json_stdout(&rac(
        home.path(),
        &[
            "--format",
            "json",
            "cache",
            "--total-mb",
            "1000",
            "--types",
            "feed_cache,unknown_type",
        ],
    ));
    let feed = value["allocations"]["feed_cache"].as_f64().unwrap();
    let unknown = value["allocations"]["unknown_type"].as_f64().unwrap();
    assert!((feed - 175.0).abs() < 1e-9);
    assert!((unknown - 35.0).abs() < 1e-9);
    assert_eq!(value["overcommitted"], false);
}

#[test]
fn test_cache_table_output() {
    let home = tempfile::tempdir().unwrap();
    let output = rac(home.path(), &["cache", "--total-mb", "1000"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("feed_cache"));
    assert!(stdout.contains("Category"));
}

#[test]
fn test_textfile_export() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = write(
        dir.path(),
        "metrics.json",
        r#"{"cpu": 50, "memory": 50, "activeConnections": 100, "queueLength": 10}"#,
    );
    let textfile = dir.path().join("rac.prom");

    let output = rac(
        dir.path(),
        &[
            "decide",
            "--metrics",
            &metrics,
            "--textfile",
            textfile.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());

    let exposition = std::fs::read_to_string(&textfile).unwrap();
    assert!(exposition.contains("rac_decisions_total"));
    assert!(exposition.contains("action=\"maintain\""));
}

#[test]
fn test_missing_metrics_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = rac(dir.path(), &["assess", "--metrics", "does-not-exist.json"]);
    assert!(!output.status.success());
}
