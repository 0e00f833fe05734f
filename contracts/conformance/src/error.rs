//! Conformance error types

use orv_lifecycle::LifecycleError;
use specerror::RegistryError;
use thiserror::Error;

/// Errors that stop the conformance suite itself from running or reporting.
///
/// Runtime misbehavior is not an error here; it becomes a failed
/// [`TestResult`](crate::TestResult).
#[derive(Debug, Error)]
pub enum ConformanceError {
    /// The rule registry could not be built or consulted.
    #[error("rule registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("JSON report error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML report error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for conformance operations
pub type ConformanceResult<T> = Result<T, ConformanceError>;

/// Hook output did not match the expected sequence.
///
/// The cause carried by an ordering violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hook output does not match the expected order: {}", describe(.first_difference, .expected_lines, .actual_lines))]
pub struct OrderingMismatch {
    /// Zero-based index of the first differing line.
    pub first_difference: usize,
    pub expected_lines: usize,
    pub actual_lines: usize,
}

impl OrderingMismatch {
    /// Compare two artifact contents line by line; `None` when identical.
    pub fn compare(expected: &str, actual: &str) -> Option<Self> {
        if expected == actual {
            return None;
        }
        let expected_lines: Vec<&str> = expected.split_inclusive('\n').collect();
        let actual_lines: Vec<&str> = actual.split_inclusive('\n').collect();
        let first_difference = expected_lines
            .iter()
            .zip(&actual_lines)
            .position(|(e, a)| e != a)
            .unwrap_or_else(|| expected_lines.len().min(actual_lines.len()));

        Some(Self {
            first_difference,
            expected_lines: expected_lines.len(),
            actual_lines: actual_lines.len(),
        })
    }
}

fn describe(first: &usize, expected: &usize, actual: &usize) -> String {
    if *first >= *actual {
        format!("missing output from line {} (expected {expected} lines, got {actual})", first + 1)
    } else if *first >= *expected {
        format!("unexpected output from line {} (expected {expected} lines, got {actual})", first + 1)
    } else {
        format!("first difference at line {}", first + 1)
    }
}
