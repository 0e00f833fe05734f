//! Assertions from `runtime.md`.

use crate::error::RegistryResult;
use crate::level::RequirementLevel::*;
use crate::reference::ReferenceBinding;
use crate::registry::RuleRegistry;

// State
pub const STATE_ID_UNIQ: &str = "`id` (string, REQUIRED) is the container's ID. This MUST be unique across all containers on this host.";
pub const DEFAULT_STATE_JSON_PATTERN: &str =
    "When serialized in JSON, the format MUST adhere to the default pattern.";

// Lifecycle
pub const ENV_CREATE_IMPL_NOT_RUN_PROCESS: &str = "The runtime MUST NOT run the user-specified program, as specified by `process`, at this time.";
pub const PRESTART_HOOKS_INVOKE: &str = "The prestart hooks MUST be invoked by the runtime. If any prestart hook fails, the runtime MUST generate an error, stop the container, and continue the lifecycle at step 9.";
pub const POSTSTART_HOOKS_INVOKE: &str = "The poststart hooks MUST be invoked by the runtime. If any poststart hook fails, the runtime MUST log a warning, but the remaining hooks and lifecycle continue as if the hook had succeeded.";
pub const POSTSTOP_HOOKS_INVOKE: &str = "The poststop hooks MUST be invoked by the runtime. If any poststop hook fails, the runtime MUST log a warning, but the remaining hooks and lifecycle continue as if the hook had succeeded.";

// Operations
pub const QUERY_WITHOUT_ID_GEN_ERROR: &str =
    "This operation MUST generate an error if it is not provided the ID of a container.";
pub const CREATE_WITH_BUNDLE_PATH_AND_ID: &str = "This operation MUST generate an error if it is not provided a path to the bundle and the container ID to associate with the container.";
pub const CREATE_NEW_CONTAINER: &str = "If the ID provided is not unique across all containers within the scope of the runtime, or is not valid in any other way, the implementation MUST generate an error and a new container MUST NOT be created.";
pub const START_WITHOUT_ID_GEN_ERROR: &str =
    "This operation MUST generate an error if it is not provided the container ID.";
pub const START_NOT_CREATED_HAVE_NO_EFFECT: &str = "Attempting to `start` a container that is not `created` MUST have no effect on the container and MUST generate an error.";
pub const KILL_NON_CREATE_RUN_HAVE_NO_EFFECT: &str = "Attempting to send a signal to a container that is neither `created` nor `running` MUST have no effect on the container and MUST generate an error.";
pub const KILL_SIGNAL_IMPLEMENT: &str =
    "This operation MUST send the specified signal to the container process.";
pub const DELETE_NON_STOP_HAVE_NO_EFFECT: &str = "Attempting to `delete` a container that is not `stopped` MUST have no effect on the container and MUST generate an error.";
pub const DELETE_RESOURCES_IMPLEMENT: &str =
    "Deleting a container MUST delete the resources that were created during the `create` step.";

const STATE_REF: &str = "runtime.md#state";
const LIFECYCLE_REF: &str = "runtime.md#lifecycle";
const QUERY_STATE_REF: &str = "runtime.md#query-state";
const CREATE_REF: &str = "runtime.md#create";
const START_REF: &str = "runtime.md#start";
const KILL_REF: &str = "runtime.md#kill";
const DELETE_REF: &str = "runtime.md#delete";

pub(crate) fn register(registry: &mut RuleRegistry) -> RegistryResult<()> {
    let rules = [
        (STATE_ID_UNIQ, Must, STATE_REF),
        (DEFAULT_STATE_JSON_PATTERN, Must, STATE_REF),
        (ENV_CREATE_IMPL_NOT_RUN_PROCESS, Must, LIFECYCLE_REF),
        (PRESTART_HOOKS_INVOKE, Must, LIFECYCLE_REF),
        (POSTSTART_HOOKS_INVOKE, Must, LIFECYCLE_REF),
        (POSTSTOP_HOOKS_INVOKE, Must, LIFECYCLE_REF),
        (QUERY_WITHOUT_ID_GEN_ERROR, Must, QUERY_STATE_REF),
        (CREATE_WITH_BUNDLE_PATH_AND_ID, Must, CREATE_REF),
        (CREATE_NEW_CONTAINER, Must, CREATE_REF),
        (START_WITHOUT_ID_GEN_ERROR, Must, START_REF),
        (START_NOT_CREATED_HAVE_NO_EFFECT, Must, START_REF),
        (KILL_NON_CREATE_RUN_HAVE_NO_EFFECT, Must, KILL_REF),
        (KILL_SIGNAL_IMPLEMENT, Must, KILL_REF),
        (DELETE_NON_STOP_HAVE_NO_EFFECT, Must, DELETE_REF),
        (DELETE_RESOURCES_IMPLEMENT, Must, DELETE_REF),
    ];

    for (assertion, level, anchor) in rules {
        registry.register(assertion, level, ReferenceBinding::section(anchor))?;
    }
    Ok(())
}
