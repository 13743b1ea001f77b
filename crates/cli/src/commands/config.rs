use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tariff_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "geo.reference_country",
        &config.geo.reference_country,
        source("geo.reference_country", &["TARIFF_GEO_REFERENCE_COUNTRY"]),
    ));
    lines.push(render_line(
        "geo.country_alpha",
        &config.geo.country_alpha.to_string(),
        source("geo.country_alpha", &["TARIFF_GEO_COUNTRY_ALPHA"]),
    ));
    lines.push(render_line(
        "geo.city_min_factor",
        &config.geo.city_min_factor.to_string(),
        source("geo.city_min_factor", &["TARIFF_GEO_CITY_MIN_FACTOR"]),
    ));
    lines.push(render_line(
        "geo.city_max_factor",
        &config.geo.city_max_factor.to_string(),
        source("geo.city_max_factor", &["TARIFF_GEO_CITY_MAX_FACTOR"]),
    ));
    lines.push(render_line(
        "geo.city_gamma",
        &config.geo.city_gamma.to_string(),
        source("geo.city_gamma", &["TARIFF_GEO_CITY_GAMMA"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["TARIFF_LOGGING_LEVEL", "TARIFF_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &config.logging.format.to_string(),
        source("logging.format", &["TARIFF_LOGGING_FORMAT", "TARIFF_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let from_env = env_keys
        .iter()
        .find(|env_key| env::var(env_key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = from_env {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
