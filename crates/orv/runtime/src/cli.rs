//! The runtime command line: `create`, `start`, `kill`, `delete` and `state`.

use crate::error::{RuntimeAction, RuntimeError, RuntimeResult};
use crate::state::ContainerState;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// File in the bundle receiving the standard output of `create`.
pub const CREATE_STDOUT_FILE: &str = "runtime-create.stdout";

/// File in the bundle receiving the standard error of `create`.
pub const CREATE_STDERR_FILE: &str = "runtime-create.stderr";

/// An OCI runtime driven through its command-line interface.
///
/// Every operation is addressed by instance id. Implementations must be
/// shareable across tasks; the orchestrator only ever holds `&dyn RuntimeCli`.
#[async_trait]
pub trait RuntimeCli: Send + Sync {
    /// Human-readable runtime name used in logs and reports.
    fn name(&self) -> &str;

    /// `create --bundle <bundle> <id>`
    async fn create(&self, id: &str, bundle: &Path) -> RuntimeResult<()>;

    /// `start <id>`
    async fn start(&self, id: &str) -> RuntimeResult<()>;

    /// `kill <id> <signal>`
    async fn kill(&self, id: &str, signal: &str) -> RuntimeResult<()>;

    /// `delete <id>`
    async fn delete(&self, id: &str) -> RuntimeResult<()>;

    /// `state <id>`, parsed.
    async fn state(&self, id: &str) -> RuntimeResult<ContainerState>;
}

/// [`RuntimeCli`] backed by an external runtime binary such as `runc`.
#[derive(Debug, Clone)]
pub struct CommandRuntime {
    binary: PathBuf,
    global_args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CommandRuntime {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            global_args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Argument placed before the subcommand on every invocation.
    pub fn global_arg(mut self, arg: impl Into<String>) -> Self {
        self.global_args.push(arg.into());
        self
    }

    /// Environment variable exported to every runtime invocation.
    ///
    /// The runtime passes its own environment on to hooks that declare none.
    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((name.into(), value.into()));
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn global_args(&self) -> &[String] {
        &self.global_args
    }

    fn command(&self, action: RuntimeAction) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.global_args)
            .arg(action.as_str())
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> RuntimeError {
        RuntimeError::Spawn {
            binary: self.binary.clone(),
            source,
        }
    }

    /// Run a short-lived subcommand with captured output.
    async fn run(&self, action: RuntimeAction, id: &str, args: &[&str]) -> RuntimeResult<Vec<u8>> {
        tracing::debug!(runtime = %self.name(), %action, id, "invoking runtime");

        let output = self
            .command(action)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        check_status(action, id, output.status, || {
            String::from_utf8_lossy(&output.stderr).trim().to_string()
        })?;
        Ok(output.stdout)
    }
}

#[async_trait]
impl RuntimeCli for CommandRuntime {
    fn name(&self) -> &str {
        self.binary
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("runtime")
    }

    async fn create(&self, id: &str, bundle: &Path) -> RuntimeResult<()> {
        let action = RuntimeAction::Create;
        tracing::debug!(runtime = %self.name(), %action, id, bundle = %bundle.display(), "invoking runtime");

        // The container process inherits these descriptors and outlives
        // `create`, so they must not be pipes we wait on.
        let stdout_path = bundle.join(CREATE_STDOUT_FILE);
        let stderr_path = bundle.join(CREATE_STDERR_FILE);
        let stdout = std::fs::File::create(&stdout_path)?;
        let stderr = std::fs::File::create(&stderr_path)?;

        let status = self
            .command(action)
            .arg("--bundle")
            .arg(bundle)
            .arg(id)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if status.success() {
            return Ok(());
        }
        let captured = tokio::fs::read_to_string(&stderr_path)
            .await
            .unwrap_or_default();
        check_status(action, id, status, || captured.trim().to_string())
    }

    async fn start(&self, id: &str) -> RuntimeResult<()> {
        self.run(RuntimeAction::Start, id, &[id]).await.map(|_| ())
    }

    async fn kill(&self, id: &str, signal: &str) -> RuntimeResult<()> {
        self.run(RuntimeAction::Kill, id, &[id, signal]).await.map(|_| ())
    }

    async fn delete(&self, id: &str) -> RuntimeResult<()> {
        self.run(RuntimeAction::Delete, id, &[id]).await.map(|_| ())
    }

    async fn state(&self, id: &str) -> RuntimeResult<ContainerState> {
        let stdout = self.run(RuntimeAction::State, id, &[id]).await?;
        ContainerState::from_json(&stdout).map_err(|source| RuntimeError::InvalidState {
            id: id.to_string(),
            source,
        })
    }
}

fn check_status(
    action: RuntimeAction,
    id: &str,
    status: ExitStatus,
    stderr: impl FnOnce() -> String,
) -> RuntimeResult<()> {
    if status.success() {
        return Ok(());
    }
    let err = RuntimeError::ActionFailed {
        action,
        id: id.to_string(),
        code: status.code(),
        stderr: stderr(),
    };
    tracing::debug!(error = %err, "runtime invocation failed");
    Err(err)
}
