//! Error types for the rule registry.

use crate::level::RequirementLevel;
use crate::reference::ReferenceError;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed underlying cause carried by a [`SpecError`].
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Registry failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The same assertion text was registered twice.
    #[error("assertion registered twice: {0:?}")]
    DuplicateAssertion(String),

    /// The assertion has no registry entry.
    #[error("unknown assertion: {0:?}")]
    UnknownAssertion(String),

    /// The documentation reference could not be composed.
    #[error("reference resolution failed for {assertion:?}: {source}")]
    ReferenceResolutionFailed {
        assertion: String,
        #[source]
        source: ReferenceError,
    },
}

/// Convenience result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// A violation of a registered assertion.
///
/// Carries the verbatim assertion text, its requirement level, the resolved
/// documentation reference and the underlying cause.
#[derive(Debug)]
pub struct SpecError {
    assertion: String,
    level: RequirementLevel,
    reference: String,
    cause: BoxedCause,
}

impl SpecError {
    pub(crate) fn new(
        assertion: impl Into<String>,
        level: RequirementLevel,
        reference: impl Into<String>,
        cause: BoxedCause,
    ) -> Self {
        Self {
            assertion: assertion.into(),
            level,
            reference: reference.into(),
            cause,
        }
    }

    /// The verbatim assertion text.
    pub fn assertion(&self) -> &str {
        &self.assertion
    }

    /// The assertion's requirement level.
    pub fn level(&self) -> RequirementLevel {
        self.level
    }

    /// The resolved documentation reference.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The wrapped cause.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Whether the violated assertion is mandatory.
    pub fn is_mandatory(&self) -> bool {
        self.level.is_mandatory()
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}\nRefer to: {}", self.level, self.cause, self.reference)
    }
}

impl StdError for SpecError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("hooks ran out of order")]
    struct OutOfOrder;

    #[test]
    fn test_spec_error_display() {
        let err = SpecError::new(
            "Hooks MUST be called in the listed order.",
            RequirementLevel::Must,
            "https://example.com/config.md#posix-platform-hooks",
            Box::new(OutOfOrder),
        );
        let text = err.to_string();
        assert!(text.starts_with("[MUST] hooks ran out of order"));
        assert!(text.contains("Refer to: https://example.com/config.md#posix-platform-hooks"));
    }

    #[test]
    fn test_spec_error_keeps_cause() {
        let err = SpecError::new("a", RequirementLevel::Should, "r", Box::new(OutOfOrder));
        assert_eq!(err.source().unwrap().to_string(), "hooks ran out of order");
        assert!(err.cause().downcast_ref::<OutOfOrder>().is_some());
        assert!(!err.is_mandatory());
    }

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::DuplicateAssertion("x MUST y".into());
        assert!(err.to_string().contains("x MUST y"));

        let err = RegistryError::ReferenceResolutionFailed {
            assertion: "x MUST y".into(),
            source: ReferenceError::EmptyVersion {
                anchor: "runtime.md#state".into(),
            },
        };
        assert!(err.to_string().contains("runtime.md#state"));
    }
}
