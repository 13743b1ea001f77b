use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::data::AVERAGE_NET_WAGE_EUR;
use crate::geo::CityFactorParams;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub geo: GeoConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeoConfig {
    pub reference_country: String,
    pub country_alpha: f64,
    pub city_min_factor: f64,
    pub city_max_factor: f64,
    pub city_gamma: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub reference_country: Option<String>,
    pub country_alpha: Option<f64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let city = CityFactorParams::default();
        Self {
            geo: GeoConfig {
                reference_country: "ES".to_string(),
                country_alpha: 1.0,
                city_min_factor: city.min_factor,
                city_max_factor: city.max_factor,
                city_gamma: city.gamma,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl GeoConfig {
    pub fn city_params(&self) -> CityFactorParams {
        CityFactorParams {
            min_factor: self.city_min_factor,
            max_factor: self.city_max_factor,
            gamma: self.city_gamma,
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        })
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("tariff.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(geo) = patch.geo {
            if let Some(reference_country) = geo.reference_country {
                self.geo.reference_country = reference_country;
            }
            if let Some(country_alpha) = geo.country_alpha {
                self.geo.country_alpha = country_alpha;
            }
            if let Some(city_min_factor) = geo.city_min_factor {
                self.geo.city_min_factor = city_min_factor;
            }
            if let Some(city_max_factor) = geo.city_max_factor {
                self.geo.city_max_factor = city_max_factor;
            }
            if let Some(city_gamma) = geo.city_gamma {
                self.geo.city_gamma = city_gamma;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TARIFF_GEO_REFERENCE_COUNTRY") {
            self.geo.reference_country = value;
        }
        if let Some(value) = read_env("TARIFF_GEO_COUNTRY_ALPHA") {
            self.geo.country_alpha = parse_f64("TARIFF_GEO_COUNTRY_ALPHA", &value)?;
        }
        if let Some(value) = read_env("TARIFF_GEO_CITY_MIN_FACTOR") {
            self.geo.city_min_factor = parse_f64("TARIFF_GEO_CITY_MIN_FACTOR", &value)?;
        }
        if let Some(value) = read_env("TARIFF_GEO_CITY_MAX_FACTOR") {
            self.geo.city_max_factor = parse_f64("TARIFF_GEO_CITY_MAX_FACTOR", &value)?;
        }
        if let Some(value) = read_env("TARIFF_GEO_CITY_GAMMA") {
            self.geo.city_gamma = parse_f64("TARIFF_GEO_CITY_GAMMA", &value)?;
        }

        let log_level = read_env("TARIFF_LOGGING_LEVEL").or_else(|| read_env("TARIFF_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("TARIFF_LOGGING_FORMAT").or_else(|| read_env("TARIFF_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(reference_country) = overrides.reference_country {
            self.geo.reference_country = reference_country;
        }
        if let Some(country_alpha) = overrides.country_alpha {
            self.geo.country_alpha = country_alpha;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_geo(&self.geo)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Config file candidates, in lookup order, when no explicit path is given.
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["tariff.toml", "config/tariff.toml"];

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    DEFAULT_CONFIG_PATHS.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_geo(geo: &GeoConfig) -> Result<(), ConfigError> {
    let known_country =
        AVERAGE_NET_WAGE_EUR.iter().any(|(country, _)| *country == geo.reference_country);
    if !known_country {
        let known: Vec<&str> = AVERAGE_NET_WAGE_EUR.iter().map(|(country, _)| *country).collect();
        return Err(ConfigError::Validation(format!(
            "geo.reference_country `{}` has no wage data (expected one of {})",
            geo.reference_country,
            known.join("|")
        )));
    }

    if !geo.country_alpha.is_finite() || geo.country_alpha <= 0.0 {
        return Err(ConfigError::Validation(
            "geo.country_alpha must be a positive number".to_string(),
        ));
    }

    if !geo.city_min_factor.is_finite() || geo.city_min_factor <= 0.0 {
        return Err(ConfigError::Validation(
            "geo.city_min_factor must be a positive number".to_string(),
        ));
    }

    if !geo.city_max_factor.is_finite() || geo.city_max_factor < geo.city_min_factor {
        return Err(ConfigError::Validation(
            "geo.city_max_factor must be at least geo.city_min_factor".to_string(),
        ));
    }

    if !geo.city_gamma.is_finite() || geo.city_gamma < 0.0 {
        return Err(ConfigError::Validation(
            "geo.city_gamma must be zero or a positive number".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    geo: Option<GeoPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GeoPatch {
    reference_country: Option<String>,
    country_alpha: Option<f64>,
    city_min_factor: Option<f64>,
    city_max_factor: Option<f64>,
    city_gamma: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
