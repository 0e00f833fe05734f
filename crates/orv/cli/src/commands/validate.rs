//! Validation commands

use crate::config::{CliConfig, Settings, SettingsArgs};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use clap::{Args, Subcommand};
use orv_conformance::ConformanceRunner;
use tracing::info;

/// Validation subcommands
#[derive(Subcommand)]
pub enum ValidateCommands {
    /// Check that the runtime calls lifecycle hooks in the configured order
    Hooks(HooksArgs),
}

/// Arguments for `validate hooks`
#[derive(Debug, Args)]
pub struct HooksArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Number of independent runs, each with a fresh container
    #[arg(long, default_value_t = 1)]
    pub runs: usize,
}

/// Execute a validation command
pub async fn execute(
    command: ValidateCommands,
    config: &CliConfig,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        ValidateCommands::Hooks(args) => {
            let settings = Settings::resolve(config, &args.settings)?;
            let runner = ConformanceRunner::new(settings.to_conformance_config(args.runs))?;
            info!(
                runtime = %settings.runtime.display(),
                runs = args.runs,
                "validating hook ordering"
            );

            let report = runner.run().await;
            output::print_report(&report, format)?;

            if report.is_conformant() {
                Ok(())
            } else {
                Err(CliError::NonConformant {
                    failed: report.failed_count(),
                    total: report.summary.total,
                })
            }
        }
    }
}
