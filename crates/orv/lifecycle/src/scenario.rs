//! Scenario callbacks and the instance context they operate on.

use crate::actions::{LifecycleActions, LifecyclePhase};
use crate::error::{LifecycleError, LifecycleResult};
use crate::wait::{self, StatusSource, WaitPolicy};
use async_trait::async_trait;
use orv_runtime::{Bundle, ContainerStatus, RuntimeCli, SpecGenerator};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The view of one runtime instance handed to scenario callbacks.
///
/// Owns the bundle and the configuration generator for the duration of a
/// run. The generator is written to the bundle after `before_create`.
pub struct LifecycleContext {
    id: Option<String>,
    bundle: Bundle,
    generator: SpecGenerator,
    phase: LifecyclePhase,
    last_status: Option<ContainerStatus>,
    runtime: Arc<dyn RuntimeCli>,
}

impl LifecycleContext {
    pub(crate) fn new(bundle: Bundle, generator: SpecGenerator, runtime: Arc<dyn RuntimeCli>) -> Self {
        Self {
            id: None,
            bundle,
            generator,
            phase: LifecyclePhase::Pending,
            last_status: None,
            runtime,
        }
    }

    /// Instance id, once assigned.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Assign the instance id. Only honored before the instance is created.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn require_id(&self) -> LifecycleResult<&str> {
        self.id().ok_or(LifecycleError::MissingInstanceId)
    }

    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    pub fn bundle_path(&self) -> &Path {
        self.bundle.path()
    }

    pub fn rootfs_path(&self) -> PathBuf {
        self.bundle.rootfs_path()
    }

    pub fn generator(&self) -> &SpecGenerator {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut SpecGenerator {
        &mut self.generator
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: LifecyclePhase) {
        tracing::debug!(id = self.id().unwrap_or("-"), from = %self.phase, to = %phase, "lifecycle transition");
        self.phase = phase;
    }

    /// Status most recently observed through this context.
    pub fn last_status(&self) -> Option<ContainerStatus> {
        self.last_status
    }

    pub fn runtime(&self) -> &dyn RuntimeCli {
        self.runtime.as_ref()
    }

    pub(crate) fn into_bundle(self) -> Bundle {
        self.bundle
    }

    fn record_status(&mut self, status: ContainerStatus) {
        self.last_status = Some(status);
        if status == ContainerStatus::Stopped && self.phase == LifecyclePhase::Running {
            self.set_phase(LifecyclePhase::Stopped);
        }
    }

    /// Query the runtime once for the instance's status.
    pub async fn observe_status(&mut self) -> LifecycleResult<ContainerStatus> {
        let id = self.require_id()?.to_string();
        let status = self.runtime.status(&id).await?;
        self.record_status(status);
        Ok(status)
    }

    /// Block until the runtime reports `target` or the policy's deadline passes.
    pub async fn wait_for_status(
        &mut self,
        target: ContainerStatus,
        policy: WaitPolicy,
    ) -> LifecycleResult<ContainerStatus> {
        let id = self.require_id()?.to_string();
        let result = wait::wait_for_status(self.runtime.as_ref(), &id, target, policy).await;
        match &result {
            Ok(status) => self.record_status(*status),
            Err(LifecycleError::StatusWaitTimeout { last_observed, .. }) => {
                self.record_status(*last_observed)
            }
            Err(_) => {}
        }
        result
    }
}

impl std::fmt::Debug for LifecycleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleContext")
            .field("id", &self.id)
            .field("bundle", &self.bundle.path())
            .field("phase", &self.phase)
            .field("last_status", &self.last_status)
            .field("runtime", &self.runtime.name())
            .finish()
    }
}

/// Per-scenario behavior plugged into the orchestrator at fixed points.
///
/// Every callback defaults to a no-op. `collect` runs after the requested
/// actions on every path, success or failure, while the bundle still exists.
#[async_trait]
pub trait LifecycleScenario: Send {
    /// Scenario name used in logs and reports.
    fn name(&self) -> &str;

    /// Actions the orchestrator should perform.
    fn actions(&self) -> LifecycleActions {
        LifecycleActions::ALL
    }

    /// Runs on entry to `Creating`. May edit the configuration and assign the id.
    async fn before_create(&mut self, _ctx: &mut LifecycleContext) -> LifecycleResult<()> {
        Ok(())
    }

    async fn after_create(&mut self, _ctx: &mut LifecycleContext) -> LifecycleResult<()> {
        Ok(())
    }

    async fn before_start(&mut self, _ctx: &mut LifecycleContext) -> LifecycleResult<()> {
        Ok(())
    }

    async fn after_start(&mut self, _ctx: &mut LifecycleContext) -> LifecycleResult<()> {
        Ok(())
    }

    /// Runs on entry to `Deleting`, typically to wait for `stopped`.
    async fn before_delete(&mut self, _ctx: &mut LifecycleContext) -> LifecycleResult<()> {
        Ok(())
    }

    async fn after_delete(&mut self, _ctx: &mut LifecycleContext) -> LifecycleResult<()> {
        Ok(())
    }

    /// Gather evidence before teardown removes the bundle.
    async fn collect(&mut self, _ctx: &LifecycleContext) -> LifecycleResult<()> {
        Ok(())
    }
}
