use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use tariff_cli::commands::{config, demo, project, repair};
use tempfile::TempDir;

const SCENARIO_A: &str = r#"{
  "mtpl": 400,
  "limited_casco_basic_100": 800,
  "limited_casco_basic_200": 820,
  "limited_casco_basic_500": 850,
  "casco_basic_100": 780
}"#;

#[test]
fn repair_returns_fixed_table_and_issues_as_json() {
    with_env(&[], || {
        let (_dir, input) = write_input(SCENARIO_A);

        let result = repair::run(&input, true);
        assert_eq!(result.exit_code, 0, "expected successful repair");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "repair");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["changed"], 3);
        assert_eq!(payload["prices"]["limited_casco_basic_200"], 720.0);
        assert_eq!(payload["prices"]["limited_casco_basic_500"], 640.0);
        assert_eq!(payload["prices"]["casco_basic_100"], 880.0);

        let issues = payload["issues"].as_array().expect("issues array");
        assert_eq!(issues.len(), 3);
        assert!(issues[2].as_str().is_some_and(|issue| issue.starts_with("Adjusted casco_basic_100")));
    });
}

#[test]
fn repair_renders_human_output_by_default() {
    with_env(&[], || {
        let (_dir, input) = write_input(r#"{"mtpl": 400, "limited_casco_basic_100": 800}"#);

        let result = repair::run(&input, false);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.starts_with("repaired prices:"));
        assert!(result.output.contains("no issues"));
    });
}

#[test]
fn repair_rejects_unsupported_keys_with_key_format_class() {
    with_env(&[], || {
        let (_dir, input) = write_input(r#"{"mtpl": 400, "casco_gold_100": 900}"#);

        let result = repair::run(&input, true);
        assert_eq!(result.exit_code, 4, "expected key format failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "key_format");
        assert!(payload["message"].as_str().is_some_and(|message| message.contains("casco_gold_100")));
    });
}

#[test]
fn repair_reports_unreadable_input() {
    with_env(&[], || {
        let (dir, input) = write_input("[1, 2, 3]");

        let result = repair::run(&input, true);
        assert_eq!(result.exit_code, 3, "expected input failure code");
        assert_eq!(parse_payload(&result.output)["error_class"], "input");

        let missing = repair::run(&dir.path().join("absent.json"), true);
        assert_eq!(missing.exit_code, 3);
        assert_eq!(parse_payload(&missing.output)["error_class"], "input");
    });
}

#[test]
fn repair_returns_config_failure_for_invalid_config() {
    with_env(&[("TARIFF_GEO_REFERENCE_COUNTRY", "XX")], || {
        let (_dir, input) = write_input(SCENARIO_A);

        let result = repair::run(&input, true);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "repair");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn project_applies_country_and_city_factors() {
    with_env(&[], || {
        let (_dir, input) = write_input(SCENARIO_A);

        let result = project::run(&input, "RS", Some("Beograd"));
        assert_eq!(result.exit_code, 0, "expected successful projection");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "project");
        assert_eq!(payload["reference_country"], "ES");
        assert!(payload["country_factor"].as_f64().is_some_and(|factor| (factor - 0.465).abs() < 1e-9));
        assert!(payload["city_factor"].as_f64().is_some_and(|factor| (factor - 1.1678).abs() < 1e-4));
        assert_eq!(payload["prices"]["mtpl"], 215.0);
        assert_eq!(payload["prices"]["limited_casco_basic_100"], 430.0);
        assert_eq!(payload["issues"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn project_honours_configured_alpha() {
    with_env(&[("TARIFF_GEO_COUNTRY_ALPHA", "0.5")], || {
        let (_dir, input) = write_input(r#"{"mtpl": 400}"#);

        let result = project::run(&input, "RS", None);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let expected = 0.465_f64.sqrt();
        assert!(payload["country_factor"].as_f64().is_some_and(|factor| (factor - expected).abs() < 1e-9));
        assert_eq!(payload["city"], Value::Null);
        // 400 * 0.6819 = 272.8 -> 275
        assert_eq!(payload["prices"]["mtpl"], 275.0);
    });
}

#[test]
fn project_unknown_country_keeps_prices() {
    with_env(&[], || {
        let (_dir, input) = write_input(r#"{"mtpl": 400, "limited_casco_basic_100": 800}"#);

        let payload = parse_payload(&project::run(&input, "ZZ", Some("Atlantis")).output);
        assert_eq!(payload["country_factor"], 1.0);
        assert_eq!(payload["city_factor"], 1.0);
        assert_eq!(payload["prices"]["mtpl"], 400.0);
        assert_eq!(payload["prices"]["limited_casco_basic_100"], 800.0);
    });
}

#[test]
fn demo_walks_base_country_and_cities() {
    with_env(&[], || {
        let result = demo::run();
        assert_eq!(result.exit_code, 0, "expected demo success");

        assert!(result.output.starts_with("base prices (ES) after repair:"));
        assert!(result.output.contains("issues (10):"));
        assert!(result.output.contains("RS prices (factor 0.4650):"));
        assert!(result.output.contains("Beograd prices (city factor 1.1678):"));
        assert!(result.output.contains("Novi Sad prices (city factor 1.0440):"));
        assert_eq!(demo::base_prices().len(), 15);
    });
}

#[test]
fn config_reports_source_attribution() {
    with_env(&[("TARIFF_GEO_CITY_GAMMA", "0.3"), ("TARIFF_LOG_LEVEL", "warn")], || {
        let output = config::run();

        assert!(output.starts_with("effective config"));
        assert!(output.contains("- geo.city_gamma = 0.3 (source: env (TARIFF_GEO_CITY_GAMMA))"));
        assert!(output.contains("- logging.level = warn (source: env (TARIFF_LOG_LEVEL))"));
        assert!(output.contains("- geo.reference_country = ES (source: default)"));
    });
}

#[test]
fn config_reports_validation_failure() {
    with_env(&[("TARIFF_GEO_CITY_GAMMA", "-1")], || {
        let output = config::run();
        assert!(output.starts_with("config validation failed"));
        assert!(output.contains("geo.city_gamma"));
    });
}

fn write_input(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir should be created");
    let path = dir.path().join("prices.json");
    fs::write(&path, contents).expect("input should be written");
    (dir, path)
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid json")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "TARIFF_GEO_REFERENCE_COUNTRY",
        "TARIFF_GEO_COUNTRY_ALPHA",
        "TARIFF_GEO_CITY_MIN_FACTOR",
        "TARIFF_GEO_CITY_MAX_FACTOR",
        "TARIFF_GEO_CITY_GAMMA",
        "TARIFF_LOGGING_LEVEL",
        "TARIFF_LOGGING_FORMAT",
        "TARIFF_LOG_LEVEL",
        "TARIFF_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
