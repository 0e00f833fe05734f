//! # orv-lifecycle
//!
//! Sequences an OCI runtime through `create`, `start` and `delete` for one
//! instance at a time, calling into a [`LifecycleScenario`] at each boundary.
//!
//! ```text
//! Pending -> Creating -> Created -> Starting -> Running -> Stopped -> Deleting -> Deleted
//!                 \           \          \                              \
//!                  +-----------+----------+------------------------------+--> Failed
//! ```
//!
//! Scenarios see the instance through a [`LifecycleContext`]: they can assign
//! the id and edit the configuration before create, and block on an observed
//! status with [`LifecycleContext::wait_for_status`]. The orchestrator removes
//! the instance and its bundle on every exit path.

pub mod actions;
pub mod error;
pub mod orchestrator;
pub mod scenario;
pub mod wait;

pub use actions::{LifecycleActions, LifecyclePhase};
pub use error::{LifecycleError, LifecycleResult};
pub use orchestrator::{Orchestrator, TEARDOWN_SIGNAL};
pub use scenario::{LifecycleContext, LifecycleScenario};
pub use wait::{wait_for_status, StatusSource, WaitPolicy, MAX_WAIT_CEILING, MIN_POLL_INTERVAL};
