//! Lifecycle Orchestrator - sequences a runtime through create, start and delete
//!
//! The orchestrator owns the bundle for the duration of a run and tears the
//! instance down on every exit path. It never inspects what a scenario checks.

use crate::actions::{LifecycleActions, LifecyclePhase};
use crate::error::{LifecycleError, LifecycleResult};
use crate::scenario::{LifecycleContext, LifecycleScenario};
use dashmap::DashSet;
use orv_runtime::{Bundle, RootfsSource, RuntimeAction, RuntimeCli, SpecGenerator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Signal sent when tearing down an instance that was not deleted.
pub const TEARDOWN_SIGNAL: &str = "KILL";

/// Drives runtime instances through the actions a scenario requests.
pub struct Orchestrator {
    runtime: Arc<dyn RuntimeCli>,
    rootfs: RootfsSource,
    bundle_parent: Option<PathBuf>,
    base_config: SpecGenerator,
    /// Ids issued during this process; never reused.
    issued: DashSet<String>,
}

impl Orchestrator {
    pub fn new(runtime: Arc<dyn RuntimeCli>, rootfs: RootfsSource) -> Self {
        Self {
            runtime,
            rootfs,
            bundle_parent: None,
            base_config: SpecGenerator::new(),
            issued: DashSet::new(),
        }
    }

    /// Create bundles under `dir` instead of the system temporary directory.
    pub fn with_bundle_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundle_parent = Some(dir.into());
        self
    }

    /// Configuration every run starts from before `before_create` edits it.
    pub fn with_base_config(mut self, generator: SpecGenerator) -> Self {
        self.base_config = generator;
        self
    }

    pub fn runtime(&self) -> &dyn RuntimeCli {
        self.runtime.as_ref()
    }

    /// Whether `id` was already issued to an instance in this process.
    pub fn is_issued(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    fn prepare_bundle(&self) -> LifecycleResult<Bundle> {
        let root_path = self.base_config.root_path();
        let bundle = match &self.bundle_parent {
            Some(parent) => Bundle::prepare_in(parent, &self.rootfs, root_path)?,
            None => Bundle::prepare(&self.rootfs, root_path)?,
        };
        Ok(bundle)
    }

    /// Run one instance through the scenario's requested actions.
    ///
    /// The first failure aborts the remaining actions and is returned after
    /// `collect` and teardown have run. The bundle is removed on every path.
    #[instrument(skip_all, fields(scenario = scenario.name(), runtime = self.runtime.name()))]
    pub async fn run<S>(&self, scenario: &mut S) -> LifecycleResult<()>
    where
        S: LifecycleScenario + ?Sized,
    {
        let bundle = self.prepare_bundle()?;
        let mut ctx = LifecycleContext::new(bundle, self.base_config.clone(), Arc::clone(&self.runtime));
        let mut registered = false;

        let actions = scenario.actions();
        info!(%actions, bundle = %ctx.bundle_path().display(), "starting lifecycle");

        let mut result = self.drive(scenario, &mut ctx, actions, &mut registered).await;
        if result.is_err() {
            ctx.set_phase(LifecyclePhase::Failed);
        }

        let collected = scenario.collect(&ctx).await;
        if result.is_ok() {
            result = collected;
        } else if let Err(err) = collected {
            warn!(error = %err, "collect failed after lifecycle failure");
        }

        if registered {
            teardown(&ctx).await;
        }

        let bundle_path = ctx.bundle_path().to_path_buf();
        if let Err(err) = ctx.into_bundle().close() {
            warn!(bundle = %bundle_path.display(), error = %err, "failed to remove bundle");
        }

        match &result {
            Ok(()) => info!("lifecycle complete"),
            Err(err) => info!(error = %err, "lifecycle aborted"),
        }
        result
    }

    async fn drive<S>(
        &self,
        scenario: &mut S,
        ctx: &mut LifecycleContext,
        actions: LifecycleActions,
        registered: &mut bool,
    ) -> LifecycleResult<()>
    where
        S: LifecycleScenario + ?Sized,
    {
        if actions.contains(LifecycleActions::CREATE) {
            ctx.set_phase(LifecyclePhase::Creating);
            scenario.before_create(ctx).await?;

            if ctx.id().is_none() {
                ctx.set_id(Uuid::new_v4().to_string());
            }
            let id = ctx.require_id()?.to_string();
            if !self.issued.insert(id.clone()) {
                return Err(LifecycleError::DuplicateInstanceId(id));
            }

            ctx.bundle().write_config(ctx.generator())?;

            // The runtime may hold partial state even when create fails.
            *registered = true;
            self.runtime
                .create(&id, ctx.bundle_path())
                .await
                .map_err(|e| LifecycleError::action_failed(RuntimeAction::Create, e))?;
            ctx.set_phase(LifecyclePhase::Created);
            scenario.after_create(ctx).await?;
        }

        if actions.contains(LifecycleActions::START) {
            let id = ctx.require_id()?.to_string();
            ctx.set_phase(LifecyclePhase::Starting);
            scenario.before_start(ctx).await?;
            self.runtime
                .start(&id)
                .await
                .map_err(|e| LifecycleError::action_failed(RuntimeAction::Start, e))?;
            ctx.set_phase(LifecyclePhase::Running);
            scenario.after_start(ctx).await?;
        }

        if actions.contains(LifecycleActions::DELETE) {
            let id = ctx.require_id()?.to_string();
            ctx.set_phase(LifecyclePhase::Deleting);
            scenario.before_delete(ctx).await?;
            self.runtime
                .delete(&id)
                .await
                .map_err(|e| LifecycleError::action_failed(RuntimeAction::Delete, e))?;
            *registered = false;
            ctx.set_phase(LifecyclePhase::Deleted);
            scenario.after_delete(ctx).await?;
        }

        Ok(())
    }
}

/// Best-effort removal of an instance the run left registered with the runtime.
async fn teardown(ctx: &LifecycleContext) {
    let Some(id) = ctx.id() else {
        return;
    };
    let runtime = ctx.runtime();

    if let Err(err) = runtime.kill(id, TEARDOWN_SIGNAL).await {
        // Expected when the process already exited.
        debug!(id, error = %err, "teardown kill failed");
    }
    if let Err(err) = runtime.delete(id).await {
        warn!(id, error = %err, "teardown delete failed");
    } else {
        debug!(id, "instance removed during teardown");
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("runtime", &self.runtime.name())
            .field("rootfs", &self.rootfs)
            .field("bundle_parent", &self.bundle_parent)
            .field("issued", &self.issued.len())
            .finish()
    }
}
