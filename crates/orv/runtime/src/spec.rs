//! The runtime configuration document (`config.json`) and its generator.
//!
//! Only the parts of the OCI configuration the validator touches are typed;
//! everything is serialized with the upstream camelCase field names.

use crate::error::{RuntimeError, RuntimeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Version written into `ociVersion` of generated documents.
pub const OCI_VERSION: &str = "1.0.2";

/// File name of the configuration document inside a bundle.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default root filesystem directory, relative to the bundle.
pub const DEFAULT_ROOT_PATH: &str = "rootfs";

/// Root filesystem of the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    pub path: String,
    #[serde(default)]
    pub readonly: bool,
}

/// User the container process runs as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: u32,
    pub gid: u32,
}

/// The container process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    #[serde(default)]
    pub terminal: bool,
    #[serde(default)]
    pub user: User,
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    pub cwd: String,
}

/// A lifecycle hook: executable path, argv and optional environment.
///
/// `args` includes `argv[0]`. A non-empty `env` replaces the environment the
/// runtime would otherwise pass to the hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
}

impl Hook {
    /// Hook executing `path` with the given argv.
    pub fn new<I, S>(path: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
            timeout: None,
        }
    }

    /// Declare a hook-scoped environment variable.
    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.env.push(format!("{name}={value}"));
        self
    }

    /// Set the hook timeout in seconds.
    pub fn with_timeout(mut self, seconds: i64) -> Self {
        self.timeout = Some(seconds);
        self
    }
}

/// Extension points at which hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookStage {
    Prestart,
    Poststart,
    Poststop,
}

impl HookStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prestart => "prestart",
            Self::Poststart => "poststart",
            Self::Poststop => "poststop",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hooks grouped by extension point, each list in invocation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hooks {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prestart: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poststart: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poststop: Vec<Hook>,
}

impl Hooks {
    pub fn is_empty(&self) -> bool {
        self.prestart.is_empty() && self.poststart.is_empty() && self.poststop.is_empty()
    }

    /// Hooks registered for a stage.
    pub fn stage(&self, stage: HookStage) -> &[Hook] {
        match stage {
            HookStage::Prestart => &self.prestart,
            HookStage::Poststart => &self.poststart,
            HookStage::Poststop => &self.poststop,
        }
    }

    fn stage_mut(&mut self, stage: HookStage) -> &mut Vec<Hook> {
        match stage {
            HookStage::Prestart => &mut self.prestart,
            HookStage::Poststart => &mut self.poststart,
            HookStage::Poststop => &mut self.poststop,
        }
    }
}

/// A Linux namespace entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Linux-specific configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linux {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<Namespace>,
}

/// The configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSpec {
    pub oci_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Root>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Hooks::is_empty")]
    pub hooks: Hooks,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<Linux>,
}

/// Builds and mutates a [`RuntimeSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecGenerator {
    spec: RuntimeSpec,
}

impl SpecGenerator {
    /// Generator seeded with a minimal Linux container running `sh`.
    pub fn new() -> Self {
        let namespaces = ["pid", "network", "ipc", "uts", "mount"]
            .into_iter()
            .map(|kind| Namespace {
                kind: kind.to_string(),
                path: None,
            })
            .collect();

        Self {
            spec: RuntimeSpec {
                oci_version: OCI_VERSION.to_string(),
                root: Some(Root {
                    path: DEFAULT_ROOT_PATH.to_string(),
                    readonly: false,
                }),
                process: Some(Process {
                    terminal: false,
                    user: User::default(),
                    args: vec!["sh".to_string()],
                    env: vec![
                        "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin"
                            .to_string(),
                        "TERM=xterm".to_string(),
                    ],
                    cwd: "/".to_string(),
                }),
                hostname: Some("orv".to_string()),
                hooks: Hooks::default(),
                annotations: BTreeMap::new(),
                linux: Some(Linux { namespaces }),
            },
        }
    }

    /// Wrap an existing document.
    pub fn from_spec(spec: RuntimeSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &RuntimeSpec {
        &self.spec
    }

    pub fn into_spec(self) -> RuntimeSpec {
        self.spec
    }

    /// Root filesystem path relative to the bundle.
    pub fn root_path(&self) -> &str {
        self.spec
            .root
            .as_ref()
            .map_or(DEFAULT_ROOT_PATH, |root| root.path.as_str())
    }

    pub fn set_root_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        match self.spec.root.as_mut() {
            Some(root) => root.path = path,
            None => {
                self.spec.root = Some(Root {
                    path,
                    readonly: false,
                })
            }
        }
    }

    /// Replace the container process argv.
    pub fn set_process_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = args.into_iter().map(Into::into).collect();
        match self.spec.process.as_mut() {
            Some(process) => process.args = args,
            None => {
                self.spec.process = Some(Process {
                    terminal: false,
                    user: User::default(),
                    args,
                    env: Vec::new(),
                    cwd: "/".to_string(),
                })
            }
        }
    }

    pub fn set_hostname(&mut self, hostname: impl Into<String>) {
        self.spec.hostname = Some(hostname.into());
    }

    pub fn add_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.spec.annotations.insert(key.into(), value.into());
    }

    /// Append a hook to a stage. Hook paths must be absolute and a timeout,
    /// when set, must be positive.
    pub fn add_hook(&mut self, stage: HookStage, hook: Hook) -> RuntimeResult<()> {
        if !Path::new(&hook.path).is_absolute() {
            return Err(RuntimeError::InvalidHook {
                path: hook.path,
                reason: "hook path must be absolute".to_string(),
            });
        }
        if let Some(timeout) = hook.timeout {
            if timeout <= 0 {
                return Err(RuntimeError::InvalidHook {
                    path: hook.path,
                    reason: format!("timeout must be greater than zero, got {timeout}"),
                });
            }
        }
        self.spec.hooks.stage_mut(stage).push(hook);
        Ok(())
    }

    pub fn add_prestart_hook(&mut self, hook: Hook) -> RuntimeResult<()> {
        self.add_hook(HookStage::Prestart, hook)
    }

    pub fn add_poststart_hook(&mut self, hook: Hook) -> RuntimeResult<()> {
        self.add_hook(HookStage::Poststart, hook)
    }

    pub fn add_poststop_hook(&mut self, hook: Hook) -> RuntimeResult<()> {
        self.add_hook(HookStage::Poststop, hook)
    }

    /// Write `config.json` into `bundle_dir`, returning its path.
    pub fn write_to(&self, bundle_dir: &Path) -> RuntimeResult<PathBuf> {
        let path = bundle_dir.join(CONFIG_FILE_NAME);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, &self.spec)?;
        writer.flush()?;
        tracing::debug!(path = %path.display(), "wrote runtime config");
        Ok(path)
    }

    /// Read a `config.json` back from `bundle_dir`.
    pub fn read_from(bundle_dir: &Path) -> RuntimeResult<Self> {
        let bytes = std::fs::read(bundle_dir.join(CONFIG_FILE_NAME))?;
        Ok(Self::from_spec(serde_json::from_slice(&bytes)?))
    }
}

impl Default for SpecGenerator {
    fn default() -> Self {
        Self::new()
    }
}
