//! Command-line overrides shared by the service binaries

use crate::common::SupervisorConfig;
use std::path::PathBuf;

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// TOML config file (defaults to ./kvshepherd.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the executable and templates
    #[arg(long)]
    pub code_path: Option<PathBuf>,

    /// Root for the per-activation work directory
    #[arg(long)]
    pub work_path: Option<PathBuf>,

    /// Executable file name under the code path
    #[arg(long)]
    pub executable: Option<String>,

    /// Template file name under the code path
    #[arg(long)]
    pub template: Option<String>,

    /// Control port the managed process accepts `shutdown` on
    #[arg(long)]
    pub control_port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ServiceArgs {
    /// CLI values win over file and environment
    pub fn apply(&self, config: &mut SupervisorConfig) {
        if let Some(code_path) = &self.code_path {
            config.code_path = code_path.clone();
        }
        if let Some(work_path) = &self.work_path {
            config.work_path = work_path.clone();
        }
        if let Some(executable) = &self.executable {
            config.executable = executable.clone();
        }
        if let Some(template) = &self.template {
            config.template = template.clone();
        }
        if let Some(port) = self.control_port {
            config.control_port = port;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}
