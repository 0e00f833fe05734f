//! Hook-ordering scenario
//!
//! Installs two hooks at each of the prestart, poststart and poststop stages.
//! Every hook appends one line to a shared artifact inside the root
//! filesystem; the artifact is then compared with the expected sequence.
//!
//! Each line starts with the value of `VALIDATION_HOOKS` as the hook sees it.
//! Hooks that declare no environment inherit it from the runtime process.
//! `pre-start2` declares only `MSG` and prints its marker from that variable,
//! so neither the inherited value nor a missing `MSG` can go unnoticed.

use crate::error::OrderingMismatch;
use crate::reports::TestResult;
use async_trait::async_trait;
use orv_lifecycle::{
    LifecycleContext, LifecycleError, LifecycleResult, LifecycleScenario, WaitPolicy,
};
use orv_runtime::{ContainerStatus, Hook, HookStage};
use specerror::corpus::config::POSIX_HOOKS_CALLED_IN_ORDER;
use specerror::RuleRegistry;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Name of the scenario in reports.
pub const SCENARIO_NAME: &str = "hook_ordering";

/// File, relative to the root filesystem, that hooks append to.
pub const ARTIFACT_FILE_NAME: &str = "output";

/// Variable exported to the runtime process and inherited by hooks.
pub const INHERITED_ENV_VAR: &str = "VALIDATION_HOOKS";

/// Variable declared in a single hook's own environment.
pub const HOOK_ENV_VAR: &str = "MSG";

/// Interpreter every hook runs under.
pub const HOOK_SHELL: &str = "/bin/sh";

/// How a hook obtains its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEnv {
    /// No declared environment; the runtime's environment is inherited.
    Inherited,
    /// Only this variable is set.
    Declared {
        name: &'static str,
        value: &'static str,
    },
}

/// One hook in the oracle: where it runs, where it should land, what it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookRecord {
    pub name: &'static str,
    pub stage: HookStage,
    /// Zero-based line in the artifact.
    pub position: usize,
    pub marker: &'static str,
    pub env: HookEnv,
}

/// The hooks in configuration order, which is also the expected output order.
pub const HOOK_SEQUENCE: [HookRecord; 6] = [
    HookRecord {
        name: "pre-start1",
        stage: HookStage::Prestart,
        position: 0,
        marker: "pre-start1 called",
        env: HookEnv::Inherited,
    },
    HookRecord {
        name: "pre-start2",
        stage: HookStage::Prestart,
        position: 1,
        marker: "pre-start2 called",
        env: HookEnv::Declared {
            name: HOOK_ENV_VAR,
            value: "pre-start2 called",
        },
    },
    HookRecord {
        name: "post-start1",
        stage: HookStage::Poststart,
        position: 2,
        marker: "post-start1",
        env: HookEnv::Inherited,
    },
    HookRecord {
        name: "post-start2",
        stage: HookStage::Poststart,
        position: 3,
        marker: "post-start2",
        env: HookEnv::Inherited,
    },
    HookRecord {
        name: "post-stop1",
        stage: HookStage::Poststop,
        position: 4,
        marker: "post-stop1",
        env: HookEnv::Inherited,
    },
    HookRecord {
        name: "post-stop2",
        stage: HookStage::Poststop,
        position: 5,
        marker: "post-stop2",
        env: HookEnv::Inherited,
    },
];

impl HookRecord {
    /// The artifact line this hook must produce.
    pub fn expected_line(&self, inherited_value: &str) -> String {
        match self.env {
            HookEnv::Inherited => format!("{inherited_value}{}", self.marker),
            HookEnv::Declared { .. } => self.marker.to_string(),
        }
    }

    /// Shell command appending this hook's line to `artifact`.
    pub fn script(&self, artifact: &Path) -> String {
        let text = match self.env {
            HookEnv::Inherited => shell_quote(self.marker),
            HookEnv::Declared { name, .. } => format!("\"${name}\""),
        };
        format!(
            "printf '%s%s\\n' \"${INHERITED_ENV_VAR}\" {text} >> {}",
            shell_quote(&artifact.to_string_lossy())
        )
    }

    /// The runtime hook entry for this record.
    pub fn to_hook(&self, artifact: &Path) -> Hook {
        let hook = Hook::new(HOOK_SHELL, ["sh".to_string(), "-c".to_string(), self.script(artifact)]);
        match self.env {
            HookEnv::Inherited => hook,
            HookEnv::Declared { name, value } => hook.with_env(name, value),
        }
    }
}

/// Full artifact content a conforming runtime produces.
pub fn expected_content(inherited_value: &str) -> String {
    HOOK_SEQUENCE
        .iter()
        .map(|record| format!("{}\n", record.expected_line(inherited_value)))
        .collect()
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Everything observed in one hook-ordering run.
#[derive(Debug)]
pub struct HookRunOutcome {
    pub instance_id: Option<String>,
    pub artifact_path: Option<PathBuf>,
    pub expected: String,
    /// Artifact content; empty when it could not be read.
    pub actual: String,
    pub read_error: Option<String>,
    pub lifecycle: LifecycleResult<()>,
    pub duration: Duration,
}

/// Scenario configuring the six hooks and collecting the artifact.
#[derive(Debug)]
pub struct HookOrderingScenario {
    wait: WaitPolicy,
    inherited_value: String,
    instance_id: Option<String>,
    artifact: Option<PathBuf>,
    actual: Option<String>,
    read_error: Option<String>,
}

impl HookOrderingScenario {
    /// `inherited_value` must match what the runtime process exports as
    /// `VALIDATION_HOOKS`.
    pub fn new(wait: WaitPolicy, inherited_value: impl Into<String>) -> Self {
        Self {
            wait,
            inherited_value: inherited_value.into(),
            instance_id: None,
            artifact: None,
            actual: None,
            read_error: None,
        }
    }

    pub fn expected_content(&self) -> String {
        expected_content(&self.inherited_value)
    }

    /// Consume the scenario together with the orchestrator's verdict.
    pub fn into_outcome(self, lifecycle: LifecycleResult<()>, duration: Duration) -> HookRunOutcome {
        let expected = self.expected_content();
        HookRunOutcome {
            instance_id: self.instance_id,
            artifact_path: self.artifact,
            expected,
            actual: self.actual.unwrap_or_default(),
            read_error: self.read_error,
            lifecycle,
            duration,
        }
    }
}

#[async_trait]
impl LifecycleScenario for HookOrderingScenario {
    fn name(&self) -> &str {
        SCENARIO_NAME
    }

    async fn before_create(&mut self, ctx: &mut LifecycleContext) -> LifecycleResult<()> {
        let id = format!("orv-hooks-{}", Uuid::new_v4());
        ctx.set_id(id.clone());
        self.instance_id = Some(id);

        let artifact = ctx.rootfs_path().join(ARTIFACT_FILE_NAME);
        match tokio::fs::remove_file(&artifact).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(LifecycleError::Scenario(format!(
                    "cannot reset artifact {}: {e}",
                    artifact.display()
                )))
            }
        }

        let generator = ctx.generator_mut();
        generator.set_process_args(["true"]);
        for record in &HOOK_SEQUENCE {
            generator.add_hook(record.stage, record.to_hook(&artifact))?;
        }
        tracing::debug!(artifact = %artifact.display(), hooks = HOOK_SEQUENCE.len(), "configured hooks");
        self.artifact = Some(artifact);
        Ok(())
    }

    async fn before_delete(&mut self, ctx: &mut LifecycleContext) -> LifecycleResult<()> {
        ctx.wait_for_status(ContainerStatus::Stopped, self.wait).await?;
        Ok(())
    }

    async fn collect(&mut self, _ctx: &LifecycleContext) -> LifecycleResult<()> {
        let Some(artifact) = &self.artifact else {
            return Ok(());
        };
        match tokio::fs::read_to_string(artifact).await {
            Ok(content) => self.actual = Some(content),
            Err(e) => {
                // Compared as empty content below.
                tracing::warn!(artifact = %artifact.display(), error = %e, "hook artifact unreadable");
                self.read_error = Some(e.to_string());
            }
        }
        Ok(())
    }
}

/// Turn a run outcome into exactly one test result.
///
/// A lifecycle failure is reported as such. Otherwise any difference between
/// expected and actual content is a violation of the hook-ordering assertion.
pub fn verify(outcome: &HookRunOutcome, registry: &RuleRegistry, spec_version: &str) -> TestResult {
    let mut result = match &outcome.lifecycle {
        Err(err) => {
            let mut result = TestResult::failed(SCENARIO_NAME, err.to_string(), outcome.duration);
            if let Some(stderr) = err.stderr() {
                result.add_detail("stderr", stderr);
            }
            result
        }
        Ok(()) => match OrderingMismatch::compare(&outcome.expected, &outcome.actual) {
            None => TestResult::passed(SCENARIO_NAME, outcome.duration),
            Some(mismatch) => {
                match registry.construct(POSIX_HOOKS_CALLED_IN_ORDER, mismatch, spec_version) {
                    Ok(violation) => TestResult::violation(SCENARIO_NAME, &violation, outcome.duration),
                    Err(err) => TestResult::failed(SCENARIO_NAME, err.to_string(), outcome.duration),
                }
            }
        },
    };

    if let Some(id) = &outcome.instance_id {
        result.add_detail("instance", id.as_str());
    }
    if let Some(path) = &outcome.artifact_path {
        result.add_detail("artifact", path.to_string_lossy());
    }
    result.add_detail("expected", outcome.expected.as_str());
    result.add_detail("actual", outcome.actual.as_str());
    if let Some(read_error) = &outcome.read_error {
        result.add_detail("read_error", read_error.as_str());
        result.add_warning("artifact could not be read; compared as empty content");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use orv_runtime::{RuntimeAction, RuntimeError};
    use specerror::RequirementLevel;

    fn outcome(actual: &str, lifecycle: LifecycleResult<()>) -> HookRunOutcome {
        HookRunOutcome {
            instance_id: Some("orv-hooks-test".into()),
            artifact_path: Some(PathBuf::from("/bundle/rootfs/output")),
            expected: expected_content(""),
            actual: actual.to_string(),
            read_error: None,
            lifecycle,
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_expected_content_literal() {
        assert_eq!(
            expected_content(""),
            "pre-start1 called\npre-start2 called\npost-start1\npost-start2\npost-stop1\npost-stop2\n"
        );
    }

    #[test]
    fn test_expected_content_with_inherited_value() {
        let content = expected_content("env:");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "env:pre-start1 called");
        assert_eq!(lines[1], "pre-start2 called");
        assert_eq!(lines[5], "env:post-stop2");
    }

    #[test]
    fn test_sequence_positions_and_stages() {
        for (index, record) in HOOK_SEQUENCE.iter().enumerate() {
            assert_eq!(record.position, index);
        }
        for stage in [HookStage::Prestart, HookStage::Poststart, HookStage::Poststop] {
            assert_eq!(HOOK_SEQUENCE.iter().filter(|r| r.stage == stage).count(), 2);
        }
        let declared = HOOK_SEQUENCE
            .iter()
            .filter(|r| matches!(r.env, HookEnv::Declared { .. }))
            .count();
        assert_eq!(declared, 1);
    }

    #[test]
    fn test_hook_scripts() {
        let artifact = Path::new("/b/rootfs/output");
        assert_eq!(
            HOOK_SEQUENCE[0].script(artifact),
            "printf '%s%s\\n' \"$VALIDATION_HOOKS\" 'pre-start1 called' >> '/b/rootfs/output'"
        );
        assert_eq!(
            HOOK_SEQUENCE[1].script(artifact),
            "printf '%s%s\\n' \"$VALIDATION_HOOKS\" \"$MSG\" >> '/b/rootfs/output'"
        );

        let hook = HOOK_SEQUENCE[1].to_hook(artifact);
        assert_eq!(hook.path, HOOK_SHELL);
        assert_eq!(hook.args[..2], ["sh", "-c"]);
        assert_eq!(hook.env, ["MSG=pre-start2 called"]);
        assert!(HOOK_SEQUENCE[0].to_hook(artifact).env.is_empty());
    }

    #[test]
    fn test_shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_verify_exact_match_passes() {
        let registry = RuleRegistry::standard().unwrap();
        let result = verify(&outcome(&expected_content(""), Ok(())), &registry, "1.0.2");
        assert_eq!(result.status, crate::TestStatus::Passed);
        assert_eq!(result.detail("instance"), Some("orv-hooks-test"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_verify_reordered_output_is_a_violation() {
        let registry = RuleRegistry::standard().unwrap();
        let actual =
            "pre-start1 called\npre-start2 called\npost-start2\npost-start1\npost-stop1\npost-stop2\n";
        let result = verify(&outcome(actual, Ok(())), &registry, "1.0.2");

        assert_eq!(result.status, crate::TestStatus::Failed);
        assert_eq!(result.assertion.as_deref(), Some(POSIX_HOOKS_CALLED_IN_ORDER));
        assert_eq!(result.level, Some(RequirementLevel::Must));
        assert!(result
            .reference
            .as_deref()
            .unwrap()
            .ends_with("/v1.0.2/config.md#posix-platform-hooks"));
        assert!(result.error.as_deref().unwrap().contains("first difference at line 3"));
        assert_eq!(result.detail("actual"), Some(actual));
        assert_eq!(result.detail("artifact"), Some("/bundle/rootfs/output"));
    }

    #[test]
    fn test_verify_empty_artifact_is_a_violation() {
        let registry = RuleRegistry::standard().unwrap();
        let mut run = outcome("", Ok(()));
        run.read_error = Some("No such file or directory".into());
        let result = verify(&run, &registry, "1.0.2");
        assert_eq!(result.level, Some(RequirementLevel::Must));
        assert_eq!(result.detail("read_error"), Some("No such file or directory"));
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("compared as empty"));
    }

    #[test]
    fn test_verify_lifecycle_failure_reports_stderr() {
        let registry = RuleRegistry::standard().unwrap();
        let err = LifecycleError::OrchestrationActionFailed {
            action: RuntimeAction::Create,
            source: RuntimeError::ActionFailed {
                action: RuntimeAction::Create,
                id: "orv-hooks-test".into(),
                code: Some(1),
                stderr: "no such rootfs".into(),
            },
        };
        let result = verify(&outcome("", Err(err)), &registry, "1.0.2");
        assert_eq!(result.status, crate::TestStatus::Failed);
        assert!(result.level.is_none());
        assert!(result.error.as_deref().unwrap().contains("create"));
        assert_eq!(result.detail("stderr"), Some("no such rootfs"));
        assert!(result.is_blocking());
    }

    #[test]
    fn test_verify_unknown_assertion_is_surfaced() {
        let registry = RuleRegistry::default();
        let result = verify(&outcome("", Ok(())), &registry, "1.0.2");
        assert_eq!(result.status, crate::TestStatus::Failed);
        assert!(result.error.as_deref().unwrap().contains("unknown assertion"));
    }
}
