//! Conformance test framework

use crate::error::{ConformanceError, ConformanceResult};
use crate::hooks::{self, HookOrderingScenario, INHERITED_ENV_VAR};
use crate::reports::{ConformanceReport, TestResult};
use orv_lifecycle::{Orchestrator, WaitPolicy};
use orv_runtime::{CommandRuntime, RootfsSource, RuntimeCli};
use specerror::{RuleRegistry, SPEC_VERSION};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Configuration for conformance testing
#[derive(Debug, Clone)]
pub struct ConformanceConfig {
    /// Runtime binary under test
    pub runtime: PathBuf,

    /// Arguments placed before every runtime subcommand
    pub runtime_args: Vec<String>,

    /// Root filesystem for each bundle
    pub rootfs: RootfsSource,

    /// Directory bundles are created in; the system temp dir when unset
    pub bundle_parent: Option<PathBuf>,

    /// Specification version used to resolve references
    pub spec_version: String,

    /// Bounded wait for the `stopped` status before delete
    pub wait: WaitPolicy,

    /// Value exported as `VALIDATION_HOOKS` to the runtime
    pub inherited_env_value: String,

    /// Number of independent runs, each with a fresh instance id
    pub runs: usize,
}

impl Default for ConformanceConfig {
    fn default() -> Self {
        Self {
            runtime: PathBuf::from("runc"),
            runtime_args: Vec::new(),
            rootfs: RootfsSource::default(),
            bundle_parent: None,
            spec_version: SPEC_VERSION.to_string(),
            wait: WaitPolicy::default(),
            inherited_env_value: String::new(),
            runs: 1,
        }
    }
}

impl ConformanceConfig {
    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> ConformanceResult<()> {
        if self.runs == 0 {
            return Err(ConformanceError::Config("runs must be at least 1".into()));
        }
        if self.spec_version.trim().is_empty() {
            return Err(ConformanceError::Config("spec version must not be empty".into()));
        }
        if self.wait.poll_interval.is_zero() {
            return Err(ConformanceError::Config("poll interval must be greater than zero".into()));
        }
        if self.wait.poll_interval > self.wait.max_wait {
            return Err(ConformanceError::Config(format!(
                "poll interval {:?} exceeds wait timeout {:?}",
                self.wait.poll_interval, self.wait.max_wait
            )));
        }
        Ok(())
    }

    /// The command-line runtime this configuration describes, exporting the
    /// inherited hook variable.
    pub fn command_runtime(&self) -> CommandRuntime {
        let runtime = self
            .runtime_args
            .iter()
            .fold(CommandRuntime::new(&self.runtime), |rt, arg| rt.global_arg(arg.clone()));
        runtime.env(INHERITED_ENV_VAR, self.inherited_env_value.clone())
    }
}

/// Conformance test runner
pub struct ConformanceRunner {
    config: ConformanceConfig,
    registry: RuleRegistry,
    orchestrator: Orchestrator,
}

impl ConformanceRunner {
    /// Create a runner for the configured runtime binary with the standard
    /// rule registry.
    pub fn new(config: ConformanceConfig) -> ConformanceResult<Self> {
        let registry = RuleRegistry::standard()?;
        let runtime = Arc::new(config.command_runtime());
        Self::with_runtime(config, registry, runtime)
    }

    /// Create a runner over any runtime implementation.
    ///
    /// The runtime is responsible for exporting `VALIDATION_HOOKS` with the
    /// configured value.
    pub fn with_runtime(
        config: ConformanceConfig,
        registry: RuleRegistry,
        runtime: Arc<dyn RuntimeCli>,
    ) -> ConformanceResult<Self> {
        config.validate()?;
        let mut orchestrator = Orchestrator::new(runtime, config.rootfs.clone());
        if let Some(parent) = &config.bundle_parent {
            orchestrator = orchestrator.with_bundle_parent(parent);
        }
        Ok(Self {
            config,
            registry,
            orchestrator,
        })
    }

    pub fn config(&self) -> &ConformanceConfig {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Run the hook-ordering scenario once.
    pub async fn run_hook_ordering(&self) -> TestResult {
        let start = Instant::now();
        let mut scenario =
            HookOrderingScenario::new(self.config.wait, self.config.inherited_env_value.clone());
        let lifecycle = self.orchestrator.run(&mut scenario).await;
        let outcome = scenario.into_outcome(lifecycle, start.elapsed());
        hooks::verify(&outcome, &self.registry, &self.config.spec_version)
    }

    /// Run every scenario `config.runs` times and report the results.
    pub async fn run(&self) -> ConformanceReport {
        self.run_times(self.config.runs).await
    }

    pub(crate) async fn run_times(&self, runs: usize) -> ConformanceReport {
        let start = Instant::now();
        let runtime_name = self.orchestrator.runtime().name().to_string();
        let mut report = ConformanceReport::new(runtime_name.clone(), self.config.spec_version.clone());

        tracing::info!("Starting conformance tests for: {}", runtime_name);

        for run in 1..=runs {
            tracing::info!(run, runs, "Running hook ordering scenario...");
            let mut result = self.run_hook_ordering().await;
            if runs > 1 {
                result.add_detail("run", run.to_string());
            }
            report.add_result(result);
        }

        report.duration = start.elapsed();
        report.finalize();

        tracing::info!(
            "Conformance tests complete: {} passed, {} failed",
            report.passed_count(),
            report.failed_count()
        );

        report
    }
}

impl std::fmt::Debug for ConformanceRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConformanceRunner")
            .field("config", &self.config)
            .field("assertions", &self.registry.len())
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}
