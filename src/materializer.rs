//! Working config generation
//!
//! The template is copied verbatim into `<work_dir>/<config_file>`. In
//! sentinel mode a block of generated directives is appended describing the
//! discovered topology. Epochs always start from fixed values, so the same
//! template and topology always produce the same bytes.

use crate::common::{Error, Result};
use crate::topology::ClusterNodeInfo;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Marker line written around generated directives
pub const GENERATOR_MARKER: &str = "# Generated by kvshepherd";

/// Number of sentinels that must agree the primary is down
pub fn quorum_threshold(node_count: usize) -> usize {
    if node_count <= 2 {
        1
    } else {
        2
    }
}

/// Fixed values that go into the sentinel directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub master_name: String,
    pub target_port: u16,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            master_name: "mymaster".to_string(),
            target_port: crate::common::STORE_PORT,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum MaterializeMode<'a> {
    /// Template only
    Plain,
    /// Template followed by monitor/epoch/known-replica directives
    Sentinel {
        settings: &'a MonitorSettings,
        nodes: &'a [ClusterNodeInfo],
    },
}

/// Render the generated sentinel block. The first node is the initial primary.
pub fn render_sentinel_directives(
    settings: &MonitorSettings,
    nodes: &[ClusterNodeInfo],
) -> Result<String> {
    let (primary, peers) = nodes.split_first().ok_or(Error::EmptyTopology)?;
    let master = &settings.master_name;
    let port = settings.target_port;

    let mut lines = vec![
        GENERATOR_MARKER.to_string(),
        format!(
            "sentinel monitor {} {} {} {}",
            master,
            primary.address,
            port,
            quorum_threshold(nodes.len())
        ),
        GENERATOR_MARKER.to_string(),
        format!("sentinel config-epoch {} 0", master),
        format!("sentinel leader-epoch {} 1", master),
    ];
    lines.extend(
        peers
            .iter()
            .map(|peer| format!("sentinel known-replica {} {} {}", master, peer.address, port)),
    );
    lines.push("sentinel current-epoch 1".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// Create the work directory (and parents); existing directories are fine
pub async fn ensure_work_dir(work_dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(work_dir)
        .await
        .map_err(|source| Error::WriteFailed {
            path: work_dir.to_path_buf(),
            source,
        })
}

pub struct ConfigMaterializer {
    work_dir: PathBuf,
    config_file: String,
}

impl ConfigMaterializer {
    pub fn new(work_dir: impl Into<PathBuf>, config_file: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            config_file: config_file.into(),
        }
    }

    /// Path of the file `materialize` writes
    pub fn target_path(&self) -> PathBuf {
        self.work_dir.join(&self.config_file)
    }

    /// Write the working config and return its path.
    ///
    /// The content goes to a sibling scratch file created with `create_new`,
    /// is flushed and synced, then renamed over the target. A reader never
    /// sees a half-written config and no second writer can share the scratch
    /// file.
    pub async fn materialize(&self, template: &Path, mode: MaterializeMode<'_>) -> Result<PathBuf> {
        let mut contents = tokio::fs::read(template)
            .await
            .map_err(|source| Error::TemplateMissing {
                path: template.to_path_buf(),
                source,
            })?;

        if let MaterializeMode::Sentinel { settings, nodes } = mode {
            let generated = render_sentinel_directives(settings, nodes)?;
            if !contents.is_empty() && !contents.ends_with(b"\n") {
                contents.push(b'\n');
            }
            contents.extend_from_slice(generated.as_bytes());
        }

        ensure_work_dir(&self.work_dir).await?;
        let target = self.target_path();
        self.write_replacing(&target, &contents)
            .await
            .map_err(|source| Error::WriteFailed {
                path: target.clone(),
                source,
            })?;

        tracing::info!(
            path = %target.display(),
            bytes = contents.len(),
            "working config written"
        );
        Ok(target)
    }

    async fn write_replacing(&self, target: &Path, contents: &[u8]) -> std::io::Result<()> {
        let scratch = self.work_dir.join(format!(".{}.tmp", self.config_file));
        match tokio::fs::remove_file(&scratch).await {
            Ok(()) => tracing::debug!(path = %scratch.display(), "removed stale scratch file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&scratch)
            .await?;
        file.write_all(contents).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&scratch, target).await
    }
}
