//! Configuration for kvshepherd services

use crate::common::{Error, Result};
use crate::materializer::MonitorSettings;
use crate::process::LaunchSpec;
use crate::topology::ClusterNodeInfo;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up when none is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "kvshepherd.toml";

/// Environment prefix for overrides (`KVSHEPHERD__CONTROL_PORT=7000`)
pub const ENV_PREFIX: &str = "KVSHEPHERD";

/// Port the data-plane store listens on
pub const STORE_PORT: u16 = 6379;

/// Port the sentinel listens on
pub const SENTINEL_PORT: u16 = 26379;

/// Which managed process this service supervises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServiceVariant {
    /// The key-value store itself
    Store,
    /// The failover coordinator watching the store
    Sentinel,
}

impl ServiceVariant {
    /// Name of the per-activation directory under the work path
    pub fn role(&self) -> &'static str {
        match self {
            ServiceVariant::Store => "store",
            ServiceVariant::Sentinel => "sentinel",
        }
    }

    pub fn default_config_file(&self) -> &'static str {
        match self {
            ServiceVariant::Store => "redis.conf",
            ServiceVariant::Sentinel => "sentinel.conf",
        }
    }

    pub fn default_control_port(&self) -> u16 {
        match self {
            ServiceVariant::Store => STORE_PORT,
            ServiceVariant::Sentinel => SENTINEL_PORT,
        }
    }

    /// Only the sentinel needs to know the cluster topology
    pub fn needs_topology(&self) -> bool {
        matches!(self, ServiceVariant::Sentinel)
    }

    /// Arguments passed to the executable, in order
    pub fn launch_args(&self, config_file: &str) -> Vec<String> {
        match self {
            ServiceVariant::Store => vec![config_file.to_string()],
            ServiceVariant::Sentinel => vec![config_file.to_string(), "--sentinel".to_string()],
        }
    }
}

impl std::fmt::Display for ServiceVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.role())
    }
}

/// Where cluster membership comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DirectorySource {
    /// Fixed node list, served in pages of `page_size` (all at once if absent)
    Static {
        nodes: Vec<ClusterNodeInfo>,
        #[serde(default)]
        page_size: Option<usize>,
    },
    /// Paged JSON endpoint
    Http {
        url: String,
        #[serde(default = "default_page_size")]
        page_size: usize,
    },
}

fn default_page_size() -> usize {
    100
}

/// Everything one activation needs, passed in explicitly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    pub variant: ServiceVariant,

    /// Directory holding the executable and the config templates
    pub code_path: PathBuf,

    /// Root under which the per-role work directory is created
    pub work_path: PathBuf,

    /// Executable file name, resolved under `code_path`
    pub executable: String,

    /// Template file name, resolved under `code_path`
    pub template: String,

    /// Name of the generated file inside the work directory
    pub config_file: String,

    /// Port the managed process accepts `shutdown` on
    pub control_port: u16,

    /// Port of the store named in generated sentinel directives
    pub target_port: u16,

    /// Master name used in generated sentinel directives
    pub master_name: String,

    pub shutdown_timeout_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<DirectorySource>,

    /// Reverse-proxy listener (store variant only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_bind: Option<SocketAddr>,

    pub log_level: String,
}

impl SupervisorConfig {
    pub fn default_for(variant: ServiceVariant) -> Self {
        Self {
            variant,
            code_path: PathBuf::from("."),
            work_path: PathBuf::from("./work"),
            executable: "redis-server".to_string(),
            template: variant.default_config_file().to_string(),
            config_file: variant.default_config_file().to_string(),
            control_port: variant.default_control_port(),
            target_port: STORE_PORT,
            master_name: "mymaster".to_string(),
            shutdown_timeout_ms: 2000,
            directory: None,
            http_bind: None,
            log_level: "info".to_string(),
        }
    }

    /// Layered load: built-in defaults, then the TOML file (if present), then
    /// `KVSHEPHERD__*` environment variables. The variant is fixed by the caller.
    pub fn load(variant: ServiceVariant, path: Option<&Path>) -> Result<Self> {
        let defaults = ::config::Config::try_from(&Self::default_for(variant))?;
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let loaded: Self = ::config::Config::builder()
            .add_source(defaults)
            .add_source(::config::File::from(file).required(path.is_some()))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_override("variant", variant.role())?
            .build()?
            .try_deserialize()?;

        tracing::debug!(variant = %variant, file = %file.display(), "configuration loaded");
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.control_port == 0 {
            return Err(Error::InvalidConfig("control_port must be non-zero".into()));
        }
        if self.target_port == 0 {
            return Err(Error::InvalidConfig("target_port must be non-zero".into()));
        }
        if self.executable.trim().is_empty() {
            return Err(Error::InvalidConfig("executable must not be empty".into()));
        }
        if self.config_file.trim().is_empty() {
            return Err(Error::InvalidConfig("config_file must not be empty".into()));
        }
        if self.variant.needs_topology() {
            if self.directory.is_none() {
                return Err(Error::InvalidConfig(format!(
                    "{} variant requires a node directory",
                    self.variant
                )));
            }
            if self.master_name.trim().is_empty() {
                return Err(Error::InvalidConfig("master_name must not be empty".into()));
            }
        }
        Ok(())
    }

    /// `<work_path>/<role>`
    pub fn work_dir(&self) -> PathBuf {
        self.work_path.join(self.variant.role())
    }

    pub fn template_path(&self) -> PathBuf {
        self.code_path.join(&self.template)
    }

    pub fn executable_path(&self) -> PathBuf {
        self.code_path.join(&self.executable)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            master_name: self.master_name.clone(),
            target_port: self.target_port,
        }
    }

    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            program: self.executable_path(),
            working_dir: self.work_dir(),
            args: self.variant.launch_args(&self.config_file),
        }
    }
}
