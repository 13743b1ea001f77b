use std::path::Path;

use serde::Serialize;
use tariff_core::{validate_and_fix_prices, ApplicationError, RawPriceTable};

use crate::commands::{load_config, load_price_table, render_json, render_table, CommandResult};

#[derive(Debug, Serialize)]
struct RepairOutput {
    command: &'static str,
    status: &'static str,
    changed: usize,
    prices: RawPriceTable,
    issues: Vec<String>,
}

pub fn run(input: &Path, json_output: bool) -> CommandResult {
    let (prices, issues) = match repair(input) {
        Ok(repaired) => repaired,
        Err(error) => return CommandResult::from_error("repair", &error),
    };

    if json_output {
        let output =
            RepairOutput { command: "repair", status: "ok", changed: issues.len(), prices, issues };
        return render_json("repair", &output);
    }

    CommandResult { exit_code: 0, output: render_human(&prices, &issues) }
}

fn repair(input: &Path) -> Result<(RawPriceTable, Vec<String>), ApplicationError> {
    load_config()?;
    let raw = load_price_table(input)?;
    Ok(validate_and_fix_prices(&raw)?)
}

fn render_human(prices: &RawPriceTable, issues: &[String]) -> String {
    let mut lines = vec!["repaired prices:".to_string()];
    lines.extend(render_table(prices));

    if issues.is_empty() {
        lines.push("no issues: table already satisfies every ordering rule".to_string());
    } else {
        lines.push(format!("issues ({}):", issues.len()));
        lines.extend(issues.iter().map(|issue| format!("- {issue}")));
    }

    lines.join("\n")
}
