//! CLI configuration

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use orv_conformance::ConformanceConfig;
use orv_lifecycle::WaitPolicy;
use orv_runtime::RootfsSource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Runtime binary used when neither a flag nor the file names one.
pub const DEFAULT_RUNTIME: &str = "runc";

/// CLI configuration file (`config.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Runtime binary under test
    pub runtime: Option<PathBuf>,

    /// Arguments placed before every runtime subcommand
    pub runtime_args: Option<Vec<String>>,

    /// Root filesystem tarball or directory
    pub rootfs: Option<PathBuf>,

    /// Directory bundles are created in
    pub bundle_dir: Option<PathBuf>,

    /// Runtime specification version
    pub spec_version: Option<String>,

    /// Wait timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Status poll interval in milliseconds
    pub poll_millis: Option<u64>,

    /// Value exported as `VALIDATION_HOOKS`
    pub inherited_env_value: Option<String>,

    /// Default output format
    pub output: Option<OutputFormat>,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            tracing::debug!(path = %config_path.display(), "loaded configuration file");
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("orv").join("config.toml"))
    }
}

/// Command-line overrides for the validation settings
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SettingsArgs {
    /// Runtime binary under test
    #[arg(long, env = "RUNTIME")]
    pub runtime: Option<PathBuf>,

    /// Argument placed before every runtime subcommand (repeatable)
    #[arg(long = "runtime-arg", allow_hyphen_values = true)]
    pub runtime_args: Vec<String>,

    /// Root filesystem tarball or directory
    #[arg(long, env = "ORV_ROOTFS")]
    pub rootfs: Option<PathBuf>,

    /// Directory bundles are created in
    #[arg(long)]
    pub bundle_dir: Option<PathBuf>,

    /// Runtime specification version for references
    #[arg(long)]
    pub spec_version: Option<String>,

    /// Seconds to wait for the instance to stop
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Milliseconds between status queries
    #[arg(long)]
    pub poll_millis: Option<u64>,

    /// Value exported to the runtime as VALIDATION_HOOKS
    #[arg(long, env = "VALIDATION_HOOKS")]
    pub inherited_env_value: Option<String>,
}

/// Effective settings after merging flags over the file over defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub runtime: PathBuf,
    pub runtime_args: Vec<String>,
    pub rootfs: RootfsSource,
    pub bundle_dir: Option<PathBuf>,
    pub spec_version: String,
    pub timeout_secs: u64,
    pub poll_millis: u64,
    pub inherited_env_value: String,
}

impl Settings {
    /// Merge command-line overrides over the configuration file.
    pub fn resolve(file: &CliConfig, args: &SettingsArgs) -> CliResult<Self> {
        let defaults = ConformanceConfig::default();
        let wait = WaitPolicy::default();

        let runtime_args = if args.runtime_args.is_empty() {
            file.runtime_args.clone().unwrap_or_default()
        } else {
            args.runtime_args.clone()
        };

        let settings = Self {
            runtime: args
                .runtime
                .clone()
                .or_else(|| file.runtime.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RUNTIME)),
            runtime_args,
            rootfs: args
                .rootfs
                .clone()
                .or_else(|| file.rootfs.clone())
                .map(RootfsSource::from_path)
                .unwrap_or(defaults.rootfs),
            bundle_dir: args.bundle_dir.clone().or_else(|| file.bundle_dir.clone()),
            spec_version: args
                .spec_version
                .clone()
                .or_else(|| file.spec_version.clone())
                .unwrap_or(defaults.spec_version),
            timeout_secs: args
                .timeout_secs
                .or(file.timeout_secs)
                .unwrap_or(wait.max_wait.as_secs()),
            poll_millis: args
                .poll_millis
                .or(file.poll_millis)
                .unwrap_or(wait.poll_interval.as_millis() as u64),
            inherited_env_value: args
                .inherited_env_value
                .clone()
                .or_else(|| file.inherited_env_value.clone())
                .unwrap_or_default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> CliResult<()> {
        if self.runtime.as_os_str().is_empty() {
            return Err(CliError::Config("runtime must not be empty".into()));
        }
        self.to_conformance_config(1).validate()?;
        Ok(())
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_secs(self.timeout_secs),
            Duration::from_millis(self.poll_millis),
        )
    }

    /// Conformance configuration performing `runs` independent runs.
    pub fn to_conformance_config(&self, runs: usize) -> ConformanceConfig {
        ConformanceConfig {
            runtime: self.runtime.clone(),
            runtime_args: self.runtime_args.clone(),
            rootfs: self.rootfs.clone(),
            bundle_parent: self.bundle_dir.clone(),
            spec_version: self.spec_version.clone(),
            wait: self.wait_policy(),
            inherited_env_value: self.inherited_env_value.clone(),
            runs,
        }
    }
}
