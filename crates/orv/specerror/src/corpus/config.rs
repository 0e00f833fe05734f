//! Assertions from `config.md`.

use crate::error::RegistryResult;
use crate::level::RequirementLevel::*;
use crate::reference::ReferenceBinding;
use crate::registry::RuleRegistry;

pub const SPEC_VERSION_IN_SEMVER: &str = "`ociVersion` (string, REQUIRED) MUST be in SemVer v2.0.0 format and specifies the version of the Open Container Initiative Runtime Specification with which the bundle complies.";
pub const ROOT_ON_POSIX_REQUIRED: &str = "On POSIX platforms, `root` is REQUIRED.";
pub const ROOT_PATH_EXIST: &str = "The path MUST exist.";
pub const PROCESS_CWD_ABS: &str = "`cwd` (string, REQUIRED) is the working directory that will be set for the executable. This value MUST be an absolute path.";
pub const PROCESS_ARGS_REQUIRED_ON_POSIX: &str = "On POSIX platforms, `args` is REQUIRED and MUST have at least one entry.";

// POSIX-platform hooks
pub const POSIX_HOOKS_PATH_ABS: &str =
    "This specification extends the IEEE standard in that `path` MUST be absolute.";
pub const POSIX_HOOKS_TIMEOUT_POSITIVE: &str = "If set, `timeout` MUST be greater than zero.";
pub const POSIX_HOOKS_CALLED_IN_ORDER: &str = "Hooks MUST be called in the listed order.";
pub const POSIX_HOOKS_STATE_TO_STDIN: &str = "The state of the container MUST be passed to hooks over stdin so that they may do work appropriate to the current state of the container.";
pub const PRESTART_HOOKS_TIMING: &str = "The pre-start hooks MUST be called after the `start` operation is called but before the user-specified program command is executed.";
pub const POSTSTART_HOOKS_TIMING: &str = "The post-start hooks MUST be called after the user-specified process is executed but before the `start` operation returns.";
pub const POSTSTOP_HOOKS_TIMING: &str = "The post-stop hooks MUST be called after the container is deleted but before the `delete` operation returns.";

const SPECIFICATION_VERSION_REF: &str = "config.md#specification-version";
const ROOT_REF: &str = "config.md#root";
const PROCESS_REF: &str = "config.md#process";
const POSIX_HOOKS_REF: &str = "config.md#posix-platform-hooks";
const PRESTART_REF: &str = "config.md#prestart";
const POSTSTART_REF: &str = "config.md#poststart";
const POSTSTOP_REF: &str = "config.md#poststop";

pub(crate) fn register(registry: &mut RuleRegistry) -> RegistryResult<()> {
    let rules = [
        (SPEC_VERSION_IN_SEMVER, Must, SPECIFICATION_VERSION_REF),
        (ROOT_ON_POSIX_REQUIRED, Required, ROOT_REF),
        (ROOT_PATH_EXIST, Must, ROOT_REF),
        (PROCESS_CWD_ABS, Must, PROCESS_REF),
        (PROCESS_ARGS_REQUIRED_ON_POSIX, Required, PROCESS_REF),
        (POSIX_HOOKS_PATH_ABS, Must, POSIX_HOOKS_REF),
        (POSIX_HOOKS_TIMEOUT_POSITIVE, Must, POSIX_HOOKS_REF),
        (POSIX_HOOKS_CALLED_IN_ORDER, Must, POSIX_HOOKS_REF),
        (POSIX_HOOKS_STATE_TO_STDIN, Must, POSIX_HOOKS_REF),
        (PRESTART_HOOKS_TIMING, Must, PRESTART_REF),
        (POSTSTART_HOOKS_TIMING, Must, POSTSTART_REF),
        (POSTSTOP_HOOKS_TIMING, Must, POSTSTOP_REF),
    ];

    for (assertion, level, anchor) in rules {
        registry.register(assertion, level, ReferenceBinding::section(anchor))?;
    }
    Ok(())
}
