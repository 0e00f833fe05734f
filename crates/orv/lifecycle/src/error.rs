//! Lifecycle error types

use orv_runtime::{ContainerStatus, RuntimeAction, RuntimeError};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while driving a runtime instance through its lifecycle.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A mutating runtime operation reported failure; remaining actions are aborted.
    #[error("lifecycle action {action} failed: {source}")]
    OrchestrationActionFailed {
        action: RuntimeAction,
        #[source]
        source: RuntimeError,
    },

    /// The bounded status wait reached its deadline.
    #[error("timed out after {waited:?} waiting for status {target} (last observed {last_observed})")]
    StatusWaitTimeout {
        target: ContainerStatus,
        last_observed: ContainerStatus,
        waited: Duration,
    },

    /// The instance id was already issued by this process.
    #[error("instance id {0} was already used in this process")]
    DuplicateInstanceId(String),

    /// An action that addresses the instance ran before an id was assigned.
    #[error("instance id has not been assigned")]
    MissingInstanceId,

    /// Bundle preparation, config writing or a status query failed.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// A scenario callback failed.
    #[error("scenario error: {0}")]
    Scenario(String),
}

impl LifecycleError {
    pub(crate) fn action_failed(action: RuntimeAction, source: RuntimeError) -> Self {
        Self::OrchestrationActionFailed { action, source }
    }

    /// Standard error captured from the runtime, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::OrchestrationActionFailed { source, .. } | Self::Runtime(source) => {
                source.stderr()
            }
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::StatusWaitTimeout { .. })
    }
}

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_failed_keeps_stderr() {
        let err = LifecycleError::action_failed(
            RuntimeAction::Create,
            RuntimeError::ActionFailed {
                action: RuntimeAction::Create,
                id: "c1".into(),
                code: Some(1),
                stderr: "rootfs does not exist".into(),
            },
        );
        assert_eq!(err.stderr(), Some("rootfs does not exist"));
        assert!(err.to_string().starts_with("lifecycle action create failed"));
    }

    #[test]
    fn test_timeout_display() {
        let err = LifecycleError::StatusWaitTimeout {
            target: ContainerStatus::Stopped,
            last_observed: ContainerStatus::Running,
            waited: Duration::from_secs(10),
        };
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "timed out after 10s waiting for status stopped (last observed running)"
        );
    }
}
