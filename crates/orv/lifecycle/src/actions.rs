//! Requested lifecycle actions and the phases an instance moves through.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask of lifecycle actions a scenario asks the orchestrator to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LifecycleActions(u8);

impl LifecycleActions {
    pub const NONE: Self = Self(0);
    pub const CREATE: Self = Self(1);
    pub const START: Self = Self(1 << 1);
    pub const DELETE: Self = Self(1 << 2);
    pub const ALL: Self = Self(Self::CREATE.0 | Self::START.0 | Self::DELETE.0);

    /// True when every action in `other` is requested.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for LifecycleActions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LifecycleActions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for LifecycleActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::CREATE, "create"),
            (Self::START, "start"),
            (Self::DELETE, "delete"),
        ]
        .into_iter()
        .filter(|(action, _)| self.contains(*action))
        .map(|(_, name)| name)
        .collect();

        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// Where an instance is in the orchestrated lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    /// Bundle prepared, nothing sent to the runtime yet.
    Pending,
    Creating,
    Created,
    Starting,
    Running,
    /// The user process exited, as observed through `state`.
    Stopped,
    Deleting,
    Deleted,
    /// An action failed and the remaining sequence was aborted.
    Failed,
}

impl LifecyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Creating => "creating",
            Self::Created => "created",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Deleting => "deleting",
            Self::Deleted => "deleted",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deleted | Self::Failed)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_bitmask() {
        let actions = LifecycleActions::CREATE | LifecycleActions::DELETE;
        assert!(actions.contains(LifecycleActions::CREATE));
        assert!(actions.contains(LifecycleActions::DELETE));
        assert!(!actions.contains(LifecycleActions::START));
        assert!(!actions.contains(LifecycleActions::ALL));
        assert!(LifecycleActions::ALL.contains(actions));
        assert!(LifecycleActions::NONE.is_empty());
        assert_eq!(LifecycleActions::default(), LifecycleActions::NONE);
    }

    #[test]
    fn test_actions_display() {
        assert_eq!(LifecycleActions::ALL.to_string(), "create|start|delete");
        assert_eq!(LifecycleActions::START.to_string(), "start");
        assert_eq!(LifecycleActions::NONE.to_string(), "none");
    }

    #[test]
    fn test_phase_terminal() {
        assert!(LifecyclePhase::Deleted.is_terminal());
        assert!(LifecyclePhase::Failed.is_terminal());
        assert!(!LifecyclePhase::Stopped.is_terminal());
        assert_eq!(LifecyclePhase::Starting.to_string(), "starting");
    }
}
