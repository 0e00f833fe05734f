//! The rule registry and error constructor.

use crate::corpus;
use crate::error::{BoxedCause, RegistryError, RegistryResult, SpecError};
use crate::level::RequirementLevel;
use crate::reference::{ReferenceBinding, ReferenceResolver};
use std::collections::BTreeMap;

/// A registered assertion.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Verbatim assertion text.
    pub assertion: &'static str,
    /// Normative strength.
    pub level: RequirementLevel,
    /// Documentation binding.
    pub binding: ReferenceBinding,
}

/// Table of assertions keyed by their verbatim text.
///
/// Built once at startup and only read afterwards; share it by reference
/// (or behind an `Arc`) with whatever reports violations.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    resolver: ReferenceResolver,
    entries: BTreeMap<&'static str, RegistryEntry>,
}

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new(resolver: ReferenceResolver) -> Self {
        Self {
            resolver,
            entries: BTreeMap::new(),
        }
    }

    /// Registry holding the full runtime-spec corpus, using the default resolver.
    pub fn standard() -> RegistryResult<Self> {
        Self::standard_with(ReferenceResolver::default())
    }

    /// Registry holding the full runtime-spec corpus.
    pub fn standard_with(resolver: ReferenceResolver) -> RegistryResult<Self> {
        let mut registry = Self::new(resolver);
        corpus::register_all(&mut registry)?;
        tracing::debug!(assertions = registry.len(), "rule registry populated");
        Ok(registry)
    }

    /// Register an assertion. Registering the same text twice is an error.
    pub fn register(
        &mut self,
        assertion: &'static str,
        level: RequirementLevel,
        binding: ReferenceBinding,
    ) -> RegistryResult<()> {
        if self.entries.contains_key(assertion) {
            return Err(RegistryError::DuplicateAssertion(assertion.to_string()));
        }
        self.entries.insert(
            assertion,
            RegistryEntry {
                assertion,
                level,
                binding,
            },
        );
        Ok(())
    }

    /// Look up an assertion by its text.
    pub fn lookup(&self, assertion: &str) -> RegistryResult<&RegistryEntry> {
        self.entries
            .get(assertion)
            .ok_or_else(|| RegistryError::UnknownAssertion(assertion.to_string()))
    }

    /// Whether the assertion is registered.
    pub fn contains(&self, assertion: &str) -> bool {
        self.entries.contains_key(assertion)
    }

    /// Number of registered assertions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The resolver used for section bindings.
    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// All entries, ordered by assertion text.
    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    /// Entries registered at exactly `level`.
    pub fn with_level(&self, level: RequirementLevel) -> impl Iterator<Item = &RegistryEntry> {
        self.entries().filter(move |entry| entry.level == level)
    }

    /// Entries documented in `document` (e.g. `config-linux.md`).
    pub fn in_document<'a>(&'a self, document: &'a str) -> impl Iterator<Item = &'a RegistryEntry> {
        self.entries()
            .filter(move |entry| entry.binding.document() == Some(document))
    }

    /// Resolve the documentation reference of a registered assertion.
    pub fn reference(&self, assertion: &str, version: &str) -> RegistryResult<String> {
        let entry = self.lookup(assertion)?;
        entry
            .binding
            .resolve(&self.resolver, version)
            .map_err(|source| RegistryError::ReferenceResolutionFailed {
                assertion: assertion.to_string(),
                source,
            })
    }

    /// Build a [`SpecError`] for a violated assertion.
    ///
    /// Fails with [`RegistryError::UnknownAssertion`] when the text is not
    /// registered and with [`RegistryError::ReferenceResolutionFailed`] when the
    /// reference cannot be composed for `version`.
    pub fn construct<E>(&self, assertion: &str, cause: E, version: &str) -> RegistryResult<SpecError>
    where
        E: Into<BoxedCause>,
    {
        let entry = self.lookup(assertion)?;
        let reference = self.reference(assertion, version)?;
        Ok(SpecError::new(entry.assertion, entry.level, reference, cause.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceError;

    const HOOKS_IN_ORDER: &str = "Hooks MUST be called in the listed order.";

    fn registry() -> RuleRegistry {
        let mut registry = RuleRegistry::default();
        registry
            .register(
                HOOKS_IN_ORDER,
                RequirementLevel::Must,
                ReferenceBinding::section("config.md#posix-platform-hooks"),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = registry();
        let entry = registry.lookup(HOOKS_IN_ORDER).unwrap();
        assert_eq!(entry.level, RequirementLevel::Must);
        assert_eq!(entry.binding.anchor(), Some("config.md#posix-platform-hooks"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = registry();
        let err = registry
            .register(
                HOOKS_IN_ORDER,
                RequirementLevel::Should,
                ReferenceBinding::section("runtime.md#lifecycle"),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAssertion(_)));
        // The original entry is untouched.
        assert_eq!(
            registry.lookup(HOOKS_IN_ORDER).unwrap().level,
            RequirementLevel::Must
        );
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = registry();
        assert!(matches!(
            registry.lookup("Hooks MAY be skipped."),
            Err(RegistryError::UnknownAssertion(_))
        ));
    }

    #[test]
    fn test_construct() {
        let registry = registry();
        let err = registry
            .construct(HOOKS_IN_ORDER, "post-stop2 ran before post-stop1", "1.0.2")
            .unwrap();
        assert_eq!(err.assertion(), HOOKS_IN_ORDER);
        assert_eq!(err.level(), RequirementLevel::Must);
        assert_eq!(
            err.reference(),
            "https://github.com/opencontainers/runtime-spec/blob/v1.0.2/config.md#posix-platform-hooks"
        );
        assert_eq!(err.cause().to_string(), "post-stop2 ran before post-stop1");
    }

    #[test]
    fn test_construct_unknown_assertion() {
        let registry = registry();
        let err = registry
            .construct("Hooks MAY be skipped.", "cause", "1.0.2")
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownAssertion(_)));
    }

    #[test]
    fn test_construct_resolution_failure() {
        let mut registry = registry();
        registry
            .register(
                "Runtimes MUST publish their documentation.",
                RequirementLevel::Must,
                ReferenceBinding::custom(|version| {
                    Err(ReferenceError::Unresolvable {
                        version: version.to_string(),
                        reason: "offline".into(),
                    })
                }),
            )
            .unwrap();

        let err = registry
            .construct("Runtimes MUST publish their documentation.", "cause", "1.0.2")
            .unwrap_err();
        assert!(matches!(err, RegistryError::ReferenceResolutionFailed { .. }));

        let err = registry.construct(HOOKS_IN_ORDER, "cause", "").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ReferenceResolutionFailed {
                source: ReferenceError::EmptyVersion { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_filters() {
        let mut registry = registry();
        registry
            .register(
                "The runtime SHOULD NOT modify the ownership of referenced filesystems to realize the mapping.",
                RequirementLevel::ShouldNot,
                ReferenceBinding::section("config-linux.md#user-namespace-mappings"),
            )
            .unwrap();

        assert_eq!(registry.with_level(RequirementLevel::Must).count(), 1);
        assert_eq!(registry.in_document("config-linux.md").count(), 1);
        assert_eq!(registry.in_document("runtime.md").count(), 0);
    }
}
