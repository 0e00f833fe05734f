//! Documentation references for specification sections.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Reference template for the upstream runtime-spec repository.
pub const DEFAULT_REFERENCE_TEMPLATE: &str =
    "https://github.com/opencontainers/runtime-spec/blob/v{version}/{anchor}";

const VERSION_PLACEHOLDER: &str = "{version}";
const ANCHOR_PLACEHOLDER: &str = "{anchor}";

/// Errors produced while composing a reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// The template is missing a required placeholder.
    #[error("reference template {template:?} is missing the {placeholder} placeholder")]
    InvalidTemplate {
        template: String,
        placeholder: &'static str,
    },

    /// No specification version was supplied.
    #[error("cannot resolve {anchor} without a specification version")]
    EmptyVersion { anchor: String },

    /// A custom binding refused the version.
    #[error("cannot resolve reference for version {version}: {reason}")]
    Unresolvable { version: String, reason: String },
}

/// Convenience result type for reference composition.
pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// Composes documentation references from a base template.
///
/// Resolution is plain placeholder substitution; version strings are not
/// validated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceResolver {
    template: String,
}

impl ReferenceResolver {
    /// Create a resolver from a template containing `{version}` and `{anchor}`.
    pub fn new(template: impl Into<String>) -> ReferenceResult<Self> {
        let template = template.into();
        for placeholder in [VERSION_PLACEHOLDER, ANCHOR_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(ReferenceError::InvalidTemplate {
                    template,
                    placeholder,
                });
            }
        }
        Ok(Self { template })
    }

    /// The base template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Compose the reference for a section anchor such as `config.md#posix-platform-hooks`.
    ///
    /// Placeholders are substituted in one pass over the template, so text
    /// inside `version` or `anchor` is never itself expanded.
    pub fn resolve(&self, version: &str, anchor: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + version.len() + anchor.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix(VERSION_PLACEHOLDER) {
                out.push_str(version);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(ANCHOR_PLACEHOLDER) {
                out.push_str(anchor);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self {
            template: DEFAULT_REFERENCE_TEMPLATE.to_string(),
        }
    }
}

/// Custom reference function.
pub type ReferenceFn = Arc<dyn Fn(&str) -> ReferenceResult<String> + Send + Sync>;

/// How an assertion maps a specification version to its documentation.
#[derive(Clone)]
pub enum ReferenceBinding {
    /// A section anchor resolved through the registry's resolver.
    Section(&'static str),
    /// A caller-provided resolution function.
    Custom(ReferenceFn),
}

impl ReferenceBinding {
    /// Bind to a section anchor (`<document>.md#<slug>`).
    pub fn section(anchor: &'static str) -> Self {
        Self::Section(anchor)
    }

    /// Bind to a custom resolution function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> ReferenceResult<String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// The section anchor, if this binding has one.
    pub fn anchor(&self) -> Option<&'static str> {
        match self {
            Self::Section(anchor) => Some(anchor),
            Self::Custom(_) => None,
        }
    }

    /// The document part of the anchor (`config-linux.md`).
    pub fn document(&self) -> Option<&'static str> {
        self.anchor()
            .map(|anchor| anchor.split_once('#').map_or(anchor, |(doc, _)| doc))
    }

    /// Resolve the reference for `version`.
    pub fn resolve(&self, resolver: &ReferenceResolver, version: &str) -> ReferenceResult<String> {
        match self {
            Self::Section(anchor) => {
                if version.is_empty() {
                    return Err(ReferenceError::EmptyVersion {
                        anchor: anchor.to_string(),
                    });
                }
                Ok(resolver.resolve(version, anchor))
            }
            Self::Custom(f) => f(version),
        }
    }
}

impl fmt::Debug for ReferenceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section(anchor) => f.debug_tuple("Section").field(anchor).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
