//! CLI error types

use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The runtime under test failed a mandatory check
    #[error("runtime is not conformant: {failed} of {total} checks failed")]
    NonConformant { failed: usize, total: usize },

    /// Rule registry error
    #[error("Registry error: {0}")]
    Registry(#[from] specerror::RegistryError),

    /// Conformance suite error
    #[error("Conformance error: {0}")]
    Conformance(#[from] orv_conformance::ConformanceError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Process exit code: 1 for a non-conformant runtime, 2 for anything
    /// that prevented validation.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NonConformant { .. } => 1,
            _ => 2,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::NonConformant { failed: 1, total: 1 }.exit_code(), 1);
        assert_eq!(CliError::Config("bad".into()).exit_code(), 2);
    }
}
