//! Assertions from `config-linux.md`.

use crate::error::RegistryResult;
use crate::level::RequirementLevel::*;
use crate::reference::ReferenceBinding;
use crate::registry::RuleRegistry;

// Default filesystems
pub const DEFAULT_FILESYSTEMS: &str =
    "The following filesystems SHOULD be made available in each container's filesystem:";

// Namespaces
pub const NS_PATH_ABS: &str = "This value MUST be an absolute path in the runtime mount namespace.";
pub const NS_PROC_IN_PATH: &str =
    "The runtime MUST place the container process in the namespace associated with that `path`.";
pub const NS_PATH_MATCH_TYPE_ERROR: &str =
    "The runtime MUST generate an error if `path` is not associated with a namespace of type `type`.";
pub const NS_NEW_NS_WITHOUT_PATH: &str =
    "If `path` is not specified, the runtime MUST create a new container namespace of type `type`.";
pub const NS_INHERIT_WITHOUT_TYPE: &str = "If a namespace type is not specified in the `namespaces` array, the container MUST inherit the runtime namespace of that type.";
pub const NS_ERROR_ON_DUP: &str = "If a `namespaces` field contains duplicated namespaces with same `type`, the runtime MUST generate an error.";

// User namespace mappings
pub const USER_NS_MAP_OWNERSHIP_RO: &str =
    "The runtime SHOULD NOT modify the ownership of referenced filesystems to realize the mapping.";

// Devices
pub const DEVICES_AVAILABLE: &str =
    "devices (array of objects, OPTIONAL) lists devices that MUST be available in the container.";
pub const DEVICES_FILE_NOT_MATCH: &str = "If a file already exists at `path` that does not match the requested device, the runtime MUST generate an error.";
pub const DEVICES_MAJ_MIN_REQUIRED: &str =
    "`major, minor` (int64, REQUIRED unless `type` is `p`) - major, minor numbers for the device.";
pub const DEVICES_ERROR_ON_DUP: &str =
    "The same `type`, `major` and `minor` SHOULD NOT be used for multiple devices.";
pub const DEFAULT_DEVICES: &str =
    "In addition to any devices configured with this setting, the runtime MUST also supply default devices.";

// Cgroups
pub const CGROUPS_PATH_ABS_OR_REL: &str =
    "The value of `cgroupsPath` MUST be either an absolute path or a relative path.";
pub const CGROUPS_ABS_PATH_REL_TO_MOUNT: &str = "In the case of an absolute path (starting with `/`), the runtime MUST take the path to be relative to the cgroups mount point.";
pub const CGROUPS_PATH_ATTACH: &str = "If the value is specified, the runtime MUST consistently attach to the same place in the cgroups hierarchy given the same value of `cgroupsPath`.";
pub const CGROUPS_PATH_ERROR: &str = "Runtimes MAY consider certain `cgroupsPath` values to be invalid, and MUST generate an error if this is the case.";
pub const DEVICES_APPLY_IN_ORDER: &str = "The runtime MUST apply entries in the listed order.";
pub const BLKIO_WEIGHT_OR_LEAF_WEIGHT_EXIST: &str =
    "You MUST specify at least one of `weight` or `leafWeight` in a given entry, and MAY specify both.";

// Intel RDT
pub const INTEL_RDT_PID_WRITE: &str = "If `intelRdt` is set, the runtime MUST write the container process ID to the `<container-id>/tasks` file in a mounted `resctrl` pseudo-filesystem, using the container ID from `start` and creating the `<container-id>` directory if necessary.";
pub const INTEL_RDT_NO_MOUNTED_RESCTRL_ERROR: &str = "If no mounted `resctrl` pseudo-filesystem is available in the runtime mount namespace, the runtime MUST generate an error.";
pub const NOT_MANIP_RESCTRL_WITHOUT_INTEL_RDT: &str =
    "If `intelRdt` is not set, the runtime MUST NOT manipulate any `resctrl` pseudo-filesystems.";
pub const INTEL_RDT_L3_CACHE_SCHEMA_WRITE: &str = "If `l3CacheSchema` is set, runtimes MUST write the value to the `schemata` file in the `<container-id>` directory discussed in `intelRdt`.";
pub const INTEL_RDT_L3_CACHE_SCHEMA_NOT_WRITE: &str = "If `l3CacheSchema` is not set, runtimes MUST NOT write to `schemata` files in any `resctrl` pseudo-filesystems.";

// Seccomp, masked and readonly paths
pub const SECC_SYSCALLS_NAMES_REQUIRED: &str = "`names` MUST contain at least one entry.";
pub const MASKED_PATHS_ABS: &str = "maskedPaths (array of strings, OPTIONAL) will mask over the provided paths inside the container so that they cannot be read. The values MUST be absolute paths in the container namespace.";
pub const READONLY_PATHS_ABS: &str = "readonlyPaths (array of strings, OPTIONAL) will set the provided paths as readonly inside the container. The values MUST be absolute paths in the container namespace.";

const DEFAULT_FILESYSTEMS_REF: &str = "config-linux.md#default-filesystems";
const NAMESPACES_REF: &str = "config-linux.md#namespaces";
const USER_NAMESPACE_MAPPINGS_REF: &str = "config-linux.md#user-namespace-mappings";
const DEVICES_REF: &str = "config-linux.md#devices";
const DEFAULT_DEVICES_REF: &str = "config-linux.md#default-devices";
const CGROUPS_PATH_REF: &str = "config-linux.md#cgroups-path";
const DEVICE_WHITELIST_REF: &str = "config-linux.md#device-whitelist";
const BLOCK_IO_REF: &str = "config-linux.md#block-io";
const INTEL_RDT_REF: &str = "config-linux.md#intelrdt";
const SECCOMP_REF: &str = "config-linux.md#seccomp";
const MASKED_PATHS_REF: &str = "config-linux.md#masked-paths";
const READONLY_PATHS_REF: &str = "config-linux.md#readonly-paths";

pub(crate) fn register(registry: &mut RuleRegistry) -> RegistryResult<()> {
    let rules = [
        (DEFAULT_FILESYSTEMS, Should, DEFAULT_FILESYSTEMS_REF),
        (NS_PATH_ABS, Must, NAMESPACES_REF),
        (NS_PROC_IN_PATH, Must, NAMESPACES_REF),
        (NS_PATH_MATCH_TYPE_ERROR, Must, NAMESPACES_REF),
        (NS_NEW_NS_WITHOUT_PATH, Must, NAMESPACES_REF),
        (NS_INHERIT_WITHOUT_TYPE, Must, NAMESPACES_REF),
        (NS_ERROR_ON_DUP, Must, NAMESPACES_REF),
        (USER_NS_MAP_OWNERSHIP_RO, Should, USER_NAMESPACE_MAPPINGS_REF),
        (DEVICES_AVAILABLE, Must, DEVICES_REF),
        (DEVICES_FILE_NOT_MATCH, Must, DEVICES_REF),
        (DEVICES_MAJ_MIN_REQUIRED, Required, DEVICES_REF),
        (DEVICES_ERROR_ON_DUP, Should, DEVICES_REF),
        (DEFAULT_DEVICES, Must, DEFAULT_DEVICES_REF),
        (CGROUPS_PATH_ABS_OR_REL, Must, CGROUPS_PATH_REF),
        (CGROUPS_ABS_PATH_REL_TO_MOUNT, Must, CGROUPS_PATH_REF),
        (CGROUPS_PATH_ATTACH, Must, CGROUPS_PATH_REF),
        (CGROUPS_PATH_ERROR, Must, CGROUPS_PATH_REF),
        (DEVICES_APPLY_IN_ORDER, Must, DEVICE_WHITELIST_REF),
        (BLKIO_WEIGHT_OR_LEAF_WEIGHT_EXIST, Must, BLOCK_IO_REF),
        (INTEL_RDT_PID_WRITE, Must, INTEL_RDT_REF),
        (INTEL_RDT_NO_MOUNTED_RESCTRL_ERROR, Must, INTEL_RDT_REF),
        (NOT_MANIP_RESCTRL_WITHOUT_INTEL_RDT, Must, INTEL_RDT_REF),
        (INTEL_RDT_L3_CACHE_SCHEMA_WRITE, Must, INTEL_RDT_REF),
        (INTEL_RDT_L3_CACHE_SCHEMA_NOT_WRITE, Must, INTEL_RDT_REF),
        (SECC_SYSCALLS_NAMES_REQUIRED, Must, SECCOMP_REF),
        (MASKED_PATHS_ABS, Must, MASKED_PATHS_REF),
        (READONLY_PATHS_ABS, Must, READONLY_PATHS_REF),
    ];

    for (assertion, level, anchor) in rules {
        registry.register(assertion, level, ReferenceBinding::section(anchor))?;
    }
    Ok(())
}
