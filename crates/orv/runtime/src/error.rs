//! Runtime boundary error types.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Operations exposed by the runtime command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeAction {
    Create,
    Start,
    Kill,
    Delete,
    State,
}

impl RuntimeAction {
    /// Subcommand name understood by OCI runtimes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Start => "start",
            Self::Kill => "kill",
            Self::Delete => "delete",
            Self::State => "state",
        }
    }
}

impl fmt::Display for RuntimeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised at the runtime boundary.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime reported failure for an operation.
    #[error("runtime {action} failed for {id} ({}){}", exit_label(.code), stderr_suffix(.stderr))]
    ActionFailed {
        action: RuntimeAction,
        id: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The runtime binary could not be executed.
    #[error("failed to execute runtime {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `state` printed something that is not a state document.
    #[error("invalid state output for {id}: {source}")]
    InvalidState {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A hook was rejected by the config generator.
    #[error("invalid hook {path:?}: {reason}")]
    InvalidHook { path: String, reason: String },

    /// The bundle could not be prepared.
    #[error("bundle preparation failed at {path}: {source}")]
    Bundle {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuntimeError {
    /// Captured standard error of a failed runtime invocation.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ActionFailed { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Convenience result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_failed_display() {
        let err = RuntimeError::ActionFailed {
            action: RuntimeAction::Start,
            id: "c1".into(),
            code: Some(1),
            stderr: "container is not created".into(),
        };
        assert_eq!(
            err.to_string(),
            "runtime start failed for c1 (exit code 1): container is not created"
        );
        assert_eq!(err.stderr(), Some("container is not created"));
    }

    #[test]
    fn test_action_failed_without_stderr() {
        let err = RuntimeError::ActionFailed {
            action: RuntimeAction::Delete,
            id: "c1".into(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "runtime delete failed for c1 (terminated by signal)");
        assert!(err.stderr().is_none());
    }
}
