use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sheetdoctor_core::{Package, Validator, ValidatorConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetdoctor")]
#[command(about = "Structural validator for OOXML spreadsheet packages", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the .xlsx/.xlsm package to check
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// List every cell with the way its value is stored instead of validating
    #[arg(long)]
    cell_types: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for CI/CD integration
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    ExitCode::from(exit_status(run(&cli)))
}

/// Package is structurally sound
const EXIT_SOUND: u8 = 0;
/// Validation found problems
const EXIT_PROBLEMS: u8 = 1;
/// The package or the configuration could not be loaded
const EXIT_FAILURE: u8 = 2;

fn exit_status(result: Result<u8>) -> u8 {
    match result {
        Ok(status) => status,
        Err(e) => {
            eprintln!("error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let config = load_config(cli.config.as_ref())?;
    config
        .validate_checks()
        .context("Invalid configuration")?;

    let package = Package::open(&cli.file)
        .with_context(|| format!("Failed to open package: {}", cli.file.display()))?;
    tracing::debug!(file = %cli.file.display(), parts = package.len(), "package loaded");

    let validator = Validator::with_config(config);

    if cli.cell_types {
        let reports = validator.describe_cell_types(&package);
        match cli.format {
            OutputFormat::Human => formatter::print_cell_types(&cli.file, &reports),
            OutputFormat::Json => formatter::print_cell_types_json(&cli.file, &reports)?,
        }
        return Ok(EXIT_SOUND);
    }

    let report = validator.validate_package(&package);

    match cli.format {
        OutputFormat::Human => formatter::print_human(&cli.file, &report)?,
        OutputFormat::Json => formatter::print_json(&cli.file, &report)?,
    }

    if report.is_structurally_sound() {
        Ok(EXIT_SOUND)
    } else {
        Ok(EXIT_PROBLEMS)
    }
}

fn load_config(explicit: Option<&PathBuf>) -> Result<ValidatorConfig> {
    if let Some(config_path) = explicit {
        return ValidatorConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    // Try to load default config from current directory if it exists
    let default_config_path = PathBuf::from("sheetdoctor.toml");
    if default_config_path.exists() {
        ValidatorConfig::from_file(&default_config_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                default_config_path.display()
            )
        })
    } else {
        Ok(ValidatorConfig::default())
    }
}
