pub mod config;
pub mod demo;
pub mod project;
pub mod repair;

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tariff_core::config::{AppConfig, LoadOptions};
use tariff_core::{ApplicationError, RawPriceTable};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Serializes a successful command payload, falling back to a failure outcome.
fn render_json<T: Serialize>(command: &str, payload: &T) -> CommandResult {
    match serde_json::to_string_pretty(payload) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure(command, "serialization", error.to_string(), 1),
    }
}

fn load_config() -> Result<AppConfig, ApplicationError> {
    Ok(AppConfig::load(LoadOptions::default())?)
}

fn load_price_table(path: &Path) -> Result<RawPriceTable, ApplicationError> {
    read_price_table(path).map_err(|error| ApplicationError::Input(format!("{error:#}")))
}

fn read_price_table(path: &Path) -> anyhow::Result<RawPriceTable> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read price table `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("`{}` is not a JSON object of prices", path.display()))
}

fn render_table(table: &RawPriceTable) -> Vec<String> {
    let width = table.keys().map(String::len).max().unwrap_or(0);
    table.iter().map(|(key, price)| format!("  {key:<width$}  {price:>9.2}")).collect()
}
