pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tariff_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "tariff",
    about = "Motor tariff repair and geo projection CLI",
    long_about = "Repair motor insurance price tables against product, variant and deductible ordering rules, then project them to other countries and cities.",
    after_help = "Examples:\n  tariff repair prices.json --json\n  tariff project prices.json --country RS --city Beograd\n  tariff demo\n  tariff config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate and repair a JSON price table, listing every change")]
    Repair {
        #[arg(help = "Path to a JSON object mapping price keys to prices")]
        input: PathBuf,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Repair a price table, then project it to a country and optionally a city")]
    Project {
        #[arg(help = "Path to a JSON object mapping price keys to prices")]
        input: PathBuf,
        #[arg(long, help = "Target country code, e.g. RS")]
        country: String,
        #[arg(long, help = "Target city within the country, e.g. Beograd")]
        city: Option<String>,
    },
    #[command(about = "Repair the built-in base table and project it to Serbia and two cities")]
    Demo,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Logging follows the configuration when it loads; commands report a
    // broken configuration themselves.
    let logging_config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    init_logging(&logging_config);

    let result = match cli.command {
        Command::Repair { input, json } => commands::repair::run(&input, json),
        Command::Project { input, country, city } => {
            commands::project::run(&input, &country, city.as_deref())
        }
        Command::Demo => commands::demo::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber on stderr so stdout carries only command output.
///
/// Returns `false` when a subscriber was already installed; that one is kept.
pub fn init_logging(config: &AppConfig) -> bool {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(error) = installed {
        tracing::debug!(%error, "keeping the already installed subscriber");
        return false;
    }
    true
}
