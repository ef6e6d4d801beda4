//! Activation lifecycle
//!
//! ```text
//! Starting ──► Preparing ──► Running ──► ShuttingDown ──► Terminated
//!                  │             │            ▲
//!                  └── error / cancellation ──┘
//! ```
//!
//! A shutdown command goes out before anything else happens and again on
//! every way out of the activation, whether it ended by cancellation or by
//! a fatal error.

use crate::common::{Result, SupervisorConfig};
use crate::materializer::{ConfigMaterializer, MaterializeMode};
use crate::process::{ProcessLauncher, ShutdownClient, ShutdownOutcome};
use crate::topology::{NodeDirectory, TopologyReader};
use std::future::Future;
use std::path::PathBuf;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Starting,
    Preparing,
    Running,
    ShuttingDown,
    Terminated,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Starting => write!(f, "starting"),
            RunState::Preparing => write!(f, "preparing"),
            RunState::Running => write!(f, "running"),
            RunState::ShuttingDown => write!(f, "shutting-down"),
            RunState::Terminated => write!(f, "terminated"),
        }
    }
}

pub struct ServiceRunLoop<D, L> {
    config: SupervisorConfig,
    reader: TopologyReader<D>,
    launcher: L,
    shutdown: ShutdownClient,
    state: watch::Sender<RunState>,
}

impl<D: NodeDirectory, L: ProcessLauncher> ServiceRunLoop<D, L> {
    pub fn new(config: SupervisorConfig, directory: D, launcher: L) -> Self {
        let shutdown = ShutdownClient::new(config.control_port, config.shutdown_timeout());
        let (state, _) = watch::channel(RunState::Starting);
        Self {
            config,
            reader: TopologyReader::new(directory),
            launcher,
            shutdown,
            state,
        }
    }

    /// Replace the control-port client (tests point it at a local listener)
    pub fn with_shutdown_client(mut self, shutdown: ShutdownClient) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Run one activation until `cancel` resolves or a fatal error occurs.
    ///
    /// Returns `Ok(Terminated)` after a cancelled activation and the fatal
    /// error otherwise; the closing shutdown command is sent in both cases.
    pub async fn run<F>(&self, cancel: F) -> Result<RunState>
    where
        F: Future<Output = ()>,
    {
        self.enter(RunState::Starting);
        self.request_shutdown("before start").await;

        let result = tokio::select! {
            biased;
            _ = cancel => {
                tracing::info!(state = %self.state(), "cancellation received");
                Ok(())
            }
            res = self.activate() => res,
        };

        if let Err(e) = &result {
            tracing::error!(error = %e, state = %self.state(), "activation failed");
        }

        self.enter(RunState::ShuttingDown);
        self.request_shutdown("on exit").await;
        self.enter(RunState::Terminated);

        result.map(|()| RunState::Terminated)
    }

    /// Discover (sentinel only) and write the working config
    pub async fn prepare(&self) -> Result<PathBuf> {
        let work_dir = self.config.work_dir();
        let template = self.config.template_path();
        let materializer = ConfigMaterializer::new(&work_dir, self.config.config_file.as_str());

        if self.config.variant.needs_topology() {
            let nodes = self.reader.discover_nodes().await?;
            let settings = self.config.monitor_settings();
            materializer
                .materialize(
                    &template,
                    MaterializeMode::Sentinel {
                        settings: &settings,
                        nodes: &nodes,
                    },
                )
                .await
        } else {
            materializer.materialize(&template, MaterializeMode::Plain).await
        }
    }

    async fn activate(&self) -> Result<()> {
        self.enter(RunState::Preparing);
        let config_path = self.prepare().await?;

        self.enter(RunState::Running);
        let spec = self.config.launch_spec();
        tracing::debug!(config = %config_path.display(), "launching against working config");
        self.launcher.launch(&spec)?;

        std::future::pending::<()>().await;
        Ok(())
    }

    async fn request_shutdown(&self, phase: &str) -> ShutdownOutcome {
        let outcome = self.shutdown.request_shutdown().await;
        tracing::debug!(phase, outcome = %outcome, "control-port shutdown attempted");
        outcome
    }

    fn enter(&self, state: RunState) {
        self.state.send_replace(state);
        tracing::info!(variant = %self.config.variant, state = %state, "run loop state");
    }
}
