//! orv - OCI runtime conformance validator
//!
//! This CLI lets runtime developers and packagers:
//! - Check a runtime binary against the lifecycle hook-ordering contract
//! - Browse the registered runtime-spec assertions and their references
//! - Inspect the effective validation settings

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
pub mod config;
mod error;
pub mod output;

use commands::{rules, validate};
use config::{CliConfig, Settings, SettingsArgs};
use output::OutputFormat;
pub use error::{CliError, CliResult};

/// orv CLI application
#[derive(Parser)]
#[command(name = "orv")]
#[command(about = "orv - OCI runtime conformance validator", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ORV_CONFIG", global = true)]
    config: Option<String>,

    /// Output format (text, json, yaml, tap)
    #[arg(short, long, global = true)]
    output: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Validate a runtime
    Validate {
        #[command(subcommand)]
        command: validate::ValidateCommands,
    },

    /// Browse registered assertions
    Rules {
        #[command(subcommand)]
        command: rules::RulesCommands,
    },

    /// Show the effective configuration
    Config {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Run using the current process arguments.
pub async fn run() -> CliResult<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Reports go to stdout; logs stay on stderr
    let filter = if cli.verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    let config = CliConfig::load(cli.config.as_deref())?;
    let format = cli.output.or(config.output).unwrap_or_default();

    match cli.command {
        Commands::Validate { command } => validate::execute(command, &config, format).await,
        Commands::Rules { command } => rules::execute(command, format),
        Commands::Config { settings } => {
            let settings = Settings::resolve(&config, &settings)?;
            match format {
                OutputFormat::Text | OutputFormat::Tap => {
                    println!("Config file: {}", cli.config.as_deref().unwrap_or("(default)"));
                    output::print_single(&settings, OutputFormat::Yaml)
                }
                _ => output::print_single(&settings, format),
            }
        }
    }
}
