//! The registered assertion corpus.
//!
//! Every assertion is a verbatim sentence of the OCI runtime specification,
//! grouped by the document it appears in. Adding, removing or editing an
//! entry changes the compliance surface.

pub mod config;
pub mod config_linux;
pub mod runtime;

use crate::error::RegistryResult;
use crate::registry::RuleRegistry;

/// Documents covered by the corpus.
pub const DOCUMENTS: &[&str] = &["config.md", "config-linux.md", "runtime.md"];

pub(crate) fn register_all(registry: &mut RuleRegistry) -> RegistryResult<()> {
    config::register(registry)?;
    config_linux::register(registry)?;
    runtime::register(registry)?;
    Ok(())
}
