//! CLI integration tests.
//!
//! These tests verify argument parsing, configuration loading and the
//! simulation the binary runs from them.

use std::ffi::OsString;
use std::io::Write;
use tempfile::NamedTempFile;

use scoped_store::cli::{parse_args_from, Args};
use scoped_store::config::Config;
use scoped_store::{run_simulation, SimulationConfig, SimulationError};

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("scoped-store")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.config.is_none());
    assert!(result.stores.is_none());
    assert!(result.sessions.is_none());
    assert!(result.fail_every.is_none());
    assert!(!result.json);
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-s",
        "3",
        "-n",
        "12",
        "--capacity",
        "128",
        "--fail-every",
        "4",
        "-l",
        "debug",
        "--json",
    ]))
    .unwrap();

    assert_eq!(result.stores, Some(3));
    assert_eq!(result.sessions, Some(12));
    assert_eq!(result.capacity, Some(128));
    assert_eq!(result.fail_every, Some(4));
    assert_eq!(result.log_level, Some("debug".to_string()));
    assert!(result.json);
}

#[test]
fn test_cli_config_file() {
    let result = parse_args_from(args(&["-c", "/etc/scoped-store.json"])).unwrap();

    assert_eq!(
        result.config.unwrap().to_str().unwrap(),
        "/etc/scoped-store.json"
    );
}

#[test]
fn test_cli_invalid_count() {
    let result = parse_args_from(args(&["-n", "not-a-number"]));
    assert!(result.is_err());
}

#[test]
fn test_cli_unknown_option() {
    let result = parse_args_from(args(&["--frobnicate"]));
    assert!(result.is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let json = r#"{
        "simulation": {
            "stores": 5,
            "sessions_per_store": 8,
            "table_capacity": 4,
            "fail_every": 3,
            "reset_every": 7
        },
        "logging": {
            "level": "debug"
        }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.simulation.stores, 5);
    assert_eq!(config.simulation.sessions_per_store, 8);
    assert_eq!(config.simulation.table_capacity, 4);
    assert_eq!(config.simulation.fail_every, 3);
    assert_eq!(config.simulation.reset_every, 7);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_config_priority_cli_over_file() {
    let json = r#"{
        "simulation": {
            "stores": 9,
            "sessions_per_store": 9
        }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    // CLI args should override file
    let args = Args {
        stores: Some(1),
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();

    // CLI value wins, file value survives where the CLI is silent
    assert_eq!(config.simulation.stores, 1);
    assert_eq!(config.simulation.sessions_per_store, 9);
}

#[test]
fn test_config_missing_file() {
    let args = Args {
        config: Some("/nonexistent/scoped-store.json".into()),
        ..Args::default()
    };

    assert!(Config::load(&args).is_err());
}

// ============================================================================
// Simulation Tests
// ============================================================================

#[test]
fn test_simulation_from_args() {
    let parsed = parse_args_from(args(&["-s", "3", "-n", "4", "--fail-every", "4"])).unwrap();
    let config = Config::load(&parsed).unwrap();
    let simulation = config.to_simulation_config().unwrap();

    let report = run_simulation(&simulation).unwrap();

    assert_eq!(report.stores.len(), 3);
    for store in &report.stores {
        assert_eq!(store.sessions, 4);
        assert_eq!(store.failed, 1);
        assert_eq!(store.generation, 5);
    }
}

#[test]
fn test_simulation_report_json() {
    let parsed = parse_args_from(args(&["-s", "1", "-n", "2"])).unwrap();
    let simulation = Config::load(&parsed)
        .unwrap()
        .to_simulation_config()
        .unwrap();

    let report = run_simulation(&simulation).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert!(json["registry"].as_str().unwrap().starts_with("reg-"));
    assert_eq!(json["stores"].as_array().unwrap().len(), 1);
    assert_eq!(json["stores"][0]["sessions"], 2);
}

#[test]
fn test_zero_stores_rejected_everywhere() {
    let parsed = parse_args_from(args(&["-s", "0"])).unwrap();
    let config = Config::load(&parsed).unwrap();
    assert!(config.to_simulation_config().is_err());

    let simulation = SimulationConfig {
        stores: 0,
        ..SimulationConfig::default()
    };
    assert!(matches!(
        run_simulation(&simulation),
        Err(SimulationError::NoStores)
    ));
}

// ============================================================================
// Configuration Serialization Tests
// ============================================================================

#[test]
fn test_config_partial_deserialization() {
    // Only specify some fields, others should use defaults
    let json = r#"{"simulation": {"stores": 7}}"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.simulation.stores, 7);
    assert_eq!(config.simulation.sessions_per_store, 3); // Default
    assert_eq!(config.logging.level, "info"); // Default
}
