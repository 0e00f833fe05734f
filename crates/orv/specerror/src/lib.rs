//! Rule registry for the OCI runtime specification.
//!
//! Maps every registered assertion (a verbatim MUST/SHOULD/MAY sentence) to
//! its RFC 2119 requirement level and a versioned documentation reference,
//! and turns violations into structured [`SpecError`]s.
//!
//! # Example
//!
//! ```rust
//! use specerror::{corpus, RuleRegistry};
//!
//! let registry = RuleRegistry::standard().expect("corpus has no duplicates");
//! let err = registry
//!     .construct(
//!         corpus::config::POSIX_HOOKS_CALLED_IN_ORDER,
//!         "post-start2 ran before post-start1",
//!         "1.0.2",
//!     )
//!     .expect("assertion is registered");
//! assert!(err.reference().ends_with("config.md#posix-platform-hooks"));
//! ```

pub mod corpus;
pub mod error;
pub mod level;
pub mod reference;
pub mod registry;

pub use error::{BoxedCause, RegistryError, RegistryResult, SpecError};
pub use level::{ParseLevelError, RequirementLevel};
pub use reference::{
    ReferenceBinding, ReferenceError, ReferenceResolver, ReferenceResult,
    DEFAULT_REFERENCE_TEMPLATE,
};
pub use registry::{RegistryEntry, RuleRegistry};

/// Runtime specification version the corpus was written against.
pub const SPEC_VERSION: &str = "1.0.2";
