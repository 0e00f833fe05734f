//! OCI Runtime Conformance Suite
//!
//! Drives a runtime under test through full container lifecycles and checks
//! the observable behavior against registered runtime-spec assertions.
//!
//! # Scenarios
//!
//! - **Hook ordering**: two hooks at each of prestart, poststart and poststop
//!   append to a shared artifact; the artifact must match the configured
//!   order exactly, including which environment each hook saw
//!
//! Every failure is reported as one [`TestResult`]. Assertion violations carry
//! the assertion text, its requirement level and a versioned reference.
//!
//! # Example
//!
//! ```rust,no_run
//! use orv_conformance::{ConformanceConfig, ConformanceRunner};
//!
//! # async fn demo() -> orv_conformance::ConformanceResult<()> {
//! let runner = ConformanceRunner::new(ConformanceConfig::default())?;
//! let report = runner.run().await;
//! println!("{}", report.to_text());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod framework;
pub mod harness;
pub mod hooks;
pub mod reports;

pub use error::{ConformanceError, ConformanceResult, OrderingMismatch};
pub use framework::{ConformanceConfig, ConformanceRunner};
pub use harness::TestHarness;
pub use hooks::{
    expected_content, verify, HookEnv, HookOrderingScenario, HookRecord, HookRunOutcome,
    HOOK_SEQUENCE, INHERITED_ENV_VAR,
};
pub use reports::{ConformanceReport, Detail, ReportSummary, TestResult, TestStatus};
