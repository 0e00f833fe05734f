//! Property tests: reference resolution is deterministic and the registry
//! never silently overwrites an assertion.

use proptest::prelude::*;
use specerror::{
    ReferenceBinding, ReferenceResolver, RegistryError, RequirementLevel, RuleRegistry,
};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_version() -> impl Strategy<Value = String> {
    "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}(-rc[0-9])?"
}

fn arb_anchor() -> impl Strategy<Value = String> {
    ("[a-z-]{3,12}", "[a-z-]{3,20}").prop_map(|(doc, slug)| format!("{doc}.md#{slug}"))
}

fn arb_level() -> impl Strategy<Value = RequirementLevel> {
    prop::sample::select(RequirementLevel::ALL.to_vec())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn resolve_is_deterministic(version in arb_version(), anchor in arb_anchor()) {
        let resolver = ReferenceResolver::default();
        let first = resolver.resolve(&version, &anchor);
        let second = resolver.resolve(&version, &anchor);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.contains(&version));
        prop_assert!(first.ends_with(&anchor));
    }

    #[test]
    fn resolve_matches_fresh_resolver(version in arb_version(), anchor in arb_anchor()) {
        let shared = ReferenceResolver::default();
        let _ = shared.resolve("0.0.1", "warmup.md#state");
        prop_assert_eq!(
            shared.resolve(&version, &anchor),
            ReferenceResolver::default().resolve(&version, &anchor)
        );
    }

    #[test]
    fn duplicate_registration_never_overwrites(
        first in arb_level(),
        second in arb_level(),
    ) {
        let mut registry = RuleRegistry::default();
        registry
            .register("Runtimes MUST be tested.", first, ReferenceBinding::section("runtime.md#state"))
            .unwrap();
        let err = registry
            .register("Runtimes MUST be tested.", second, ReferenceBinding::section("runtime.md#create"))
            .unwrap_err();
        prop_assert!(matches!(err, RegistryError::DuplicateAssertion(_)));
        let entry = registry.lookup("Runtimes MUST be tested.").unwrap();
        prop_assert_eq!(entry.level, first);
        prop_assert_eq!(entry.binding.anchor(), Some("runtime.md#state"));
    }

    #[test]
    fn standard_references_are_stable(version in arb_version()) {
        let registry = RuleRegistry::standard().unwrap();
        for entry in registry.entries() {
            let a = registry.reference(entry.assertion, &version).unwrap();
            let b = registry.reference(entry.assertion, &version).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}

#[test]
fn standard_corpus_texts_are_pairwise_distinct() {
    let registry = RuleRegistry::standard().unwrap();
    let texts: HashSet<&str> = registry.entries().map(|entry| entry.assertion).collect();
    assert_eq!(texts.len(), registry.len());
}

#[test]
fn every_registered_assertion_constructs() {
    let registry = RuleRegistry::standard().unwrap();
    for entry in registry.entries() {
        let err = registry
            .construct(entry.assertion, "observed violation", specerror::SPEC_VERSION)
            .unwrap();
        assert_eq!(err.level(), entry.level);
        assert!(err.reference().contains("/v1.0.2/"));
    }
}
