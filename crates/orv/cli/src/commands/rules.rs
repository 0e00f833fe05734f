//! Rule registry commands

use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use clap::Subcommand;
use serde::Serialize;
use specerror::{corpus, RegistryEntry, RegistryError, RequirementLevel, RuleRegistry, SPEC_VERSION};
use tabled::Tabled;

/// Rule subcommands
#[derive(Subcommand)]
pub enum RulesCommands {
    /// List registered assertions
    List {
        /// Only assertions at this level (e.g. MUST, "SHOULD NOT", must-not)
        #[arg(short, long)]
        level: Option<RequirementLevel>,

        /// Only assertions documented in this file (e.g. config-linux.md)
        #[arg(short, long)]
        document: Option<String>,
    },

    /// Show one assertion and its resolved reference
    Show {
        /// Verbatim assertion text
        assertion: String,

        /// Specification version the reference points at
        #[arg(long, default_value = SPEC_VERSION)]
        spec_version: String,
    },

    /// Count assertions per requirement level
    Count,
}

/// Table row for assertion listings
#[derive(Debug, Serialize, Tabled)]
struct RuleRow {
    /// Requirement level
    level: String,
    /// Source document
    document: String,
    /// Assertion text
    assertion: String,
}

impl From<&RegistryEntry> for RuleRow {
    fn from(entry: &RegistryEntry) -> Self {
        Self {
            level: entry.level.keyword().to_string(),
            document: entry.binding.document().unwrap_or("-").to_string(),
            assertion: entry.assertion.to_string(),
        }
    }
}

/// Table row for per-level counts
#[derive(Debug, Serialize, Tabled)]
struct LevelCountRow {
    /// Requirement level
    level: String,
    /// Registered assertions
    count: usize,
}

/// Full description of one assertion
#[derive(Debug, Serialize)]
struct RuleDetail {
    assertion: String,
    level: RequirementLevel,
    mandatory: bool,
    anchor: Option<String>,
    reference: String,
}

/// Execute a rules command
pub fn execute(command: RulesCommands, format: OutputFormat) -> CliResult<()> {
    let registry = RuleRegistry::standard()?;

    match command {
        RulesCommands::List { level, document } => {
            if let Some(doc) = document.as_deref() {
                if !corpus::DOCUMENTS.contains(&doc) {
                    return Err(CliError::InvalidInput(format!(
                        "unknown document {doc:?}; expected one of {}",
                        corpus::DOCUMENTS.join(", ")
                    )));
                }
            }

            let rows: Vec<RuleRow> = registry
                .entries()
                .filter(|entry| level.map_or(true, |l| entry.level == l))
                .filter(|entry| {
                    document
                        .as_deref()
                        .map_or(true, |d| entry.binding.document() == Some(d))
                })
                .map(RuleRow::from)
                .collect();
            output::print_output(rows, format)
        }

        RulesCommands::Show {
            assertion,
            spec_version,
        } => {
            let entry = registry.lookup(&assertion).map_err(|e| match e {
                RegistryError::UnknownAssertion(text) => CliError::NotFound(format!("assertion {text:?}")),
                other => other.into(),
            })?;
            let detail = RuleDetail {
                assertion: entry.assertion.to_string(),
                level: entry.level,
                mandatory: entry.level.is_mandatory(),
                anchor: entry.binding.anchor().map(str::to_string),
                reference: registry.reference(&assertion, &spec_version)?,
            };
            output::print_single(&detail, format)
        }

        RulesCommands::Count => {
            let rows: Vec<LevelCountRow> = RequirementLevel::ALL
                .iter()
                .map(|level| LevelCountRow {
                    level: level.keyword().to_string(),
                    count: registry.with_level(*level).count(),
                })
                .filter(|row| row.count > 0)
                .collect();
            match format {
                OutputFormat::Text | OutputFormat::Tap => {
                    output::print_output(rows, format)?;
                    println!("Total: {}", registry.len());
                    Ok(())
                }
                _ => output::print_output(rows, format),
            }
        }
    }
}
