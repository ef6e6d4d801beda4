//! Paginated topology sweep

use crate::common::Result;
use crate::topology::{ClusterNodeInfo, NodeDirectory};

pub struct TopologyReader<D> {
    directory: D,
}

impl<D: NodeDirectory> TopologyReader<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Walk every page of the directory and return the nodes in arrival order.
    ///
    /// The sweep ends when a page comes back without a continuation token;
    /// an empty page that still carries a token is followed. Failures are
    /// returned as-is, there is no retry here.
    pub async fn discover_nodes(&self) -> Result<Vec<ClusterNodeInfo>> {
        let mut nodes = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.directory.query_page(token.as_deref()).await?;
            pages += 1;
            tracing::debug!(page = pages, items = page.items.len(), "node directory page");
            nodes.extend(page.items);

            match page.continuation_token.filter(|t| !t.is_empty()) {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        if pages > 1 && !nodes.is_empty() {
            // Page order is not guaranteed stable between sweeps, so the node
            // picked as initial primary may differ across activations.
            tracing::warn!(
                pages,
                first = %nodes[0].name,
                "topology spans multiple pages; initial primary depends on directory order"
            );
        }
        tracing::info!(nodes = nodes.len(), pages, "cluster topology discovered");
        Ok(nodes)
    }
}
