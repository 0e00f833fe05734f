//! # orv-runtime
//!
//! Everything the validator needs to talk to an OCI runtime:
//!
//! - [`SpecGenerator`] builds the `config.json` document, including hooks
//! - [`Bundle`] prepares a throwaway bundle directory with a root filesystem
//! - [`RuntimeCli`] is the seam over `create`/`start`/`kill`/`delete`/`state`,
//!   with [`CommandRuntime`] driving a real binary
//!
//! ```no_run
//! use orv_runtime::{Bundle, CommandRuntime, RootfsSource, RuntimeCli, SpecGenerator};
//!
//! # async fn demo() -> orv_runtime::RuntimeResult<()> {
//! let bundle = Bundle::prepare(&RootfsSource::default(), "rootfs")?;
//! bundle.write_config(&SpecGenerator::new())?;
//!
//! let runtime = CommandRuntime::new("runc");
//! runtime.create("demo", bundle.path()).await?;
//! let state = runtime.state("demo").await?;
//! println!("{}", state.status);
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod cli;
pub mod error;
pub mod spec;
pub mod state;

pub use bundle::{Bundle, RootfsSource};
pub use cli::{CommandRuntime, RuntimeCli, CREATE_STDERR_FILE, CREATE_STDOUT_FILE};
pub use error::{RuntimeAction, RuntimeError, RuntimeResult};
pub use spec::{
    Hook, HookStage, Hooks, RuntimeSpec, SpecGenerator, CONFIG_FILE_NAME, DEFAULT_ROOT_PATH,
    OCI_VERSION,
};
pub use state::{ContainerState, ContainerStatus};
