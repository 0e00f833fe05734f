//! Output formatting utilities

use crate::error::CliResult;
use colored::*;
use orv_conformance::ConformanceReport;
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text and tables
    #[default]
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Test Anything Protocol, version 13
    Tap,
}

/// Print a vector of items in the specified format
pub fn print_output<T: Serialize + Tabled>(data: Vec<T>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text | OutputFormat::Tap => {
            if data.is_empty() {
                println!("{}", "No results".dimmed());
            } else {
                println!("{}", Table::new(data));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&data)?),
    }
    Ok(())
}

/// Print a single item in the specified format
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
        OutputFormat::Text | OutputFormat::Json | OutputFormat::Tap => {
            println!("{}", serde_json::to_string_pretty(data)?)
        }
    }
    Ok(())
}

/// Print a conformance report in the specified format
pub fn print_report(report: &ConformanceReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(report)?),
        OutputFormat::Tap => print!("{}", report.to_tap()?),
    }
    Ok(())
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}
