//! Node directory sources

use crate::common::{DirectorySource, Error, Result};
use crate::topology::{ClusterNodeInfo, NodePage};
use std::future::Future;
use std::time::Duration;

/// Paged view over the cluster's node directory
pub trait NodeDirectory {
    /// Fetch the page starting at `continuation_token` (first page if `None`)
    fn query_page(
        &self,
        continuation_token: Option<&str>,
    ) -> impl Future<Output = Result<NodePage>> + Send;
}

/// Fixed node list served in pages; the token is the offset of the next page
#[derive(Debug, Clone, Default)]
pub struct StaticNodeDirectory {
    nodes: Vec<ClusterNodeInfo>,
    page_size: Option<usize>,
}

impl StaticNodeDirectory {
    pub fn new(nodes: Vec<ClusterNodeInfo>) -> Self {
        Self {
            nodes,
            page_size: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    fn page(&self, continuation_token: Option<&str>) -> Result<NodePage> {
        let offset = match continuation_token {
            Some(token) => token.parse::<usize>().map_err(|_| {
                Error::DirectoryUnavailable(format!("invalid continuation token: {}", token))
            })?,
            None => 0,
        };
        if offset > self.nodes.len() {
            return Err(Error::DirectoryUnavailable(format!(
                "continuation token {} past end of directory",
                offset
            )));
        }

        let page_size = self.page_size.unwrap_or(self.nodes.len().max(1));
        let end = (offset + page_size).min(self.nodes.len());
        Ok(NodePage {
            items: self.nodes[offset..end].to_vec(),
            continuation_token: (end < self.nodes.len()).then(|| end.to_string()),
        })
    }
}

impl NodeDirectory for StaticNodeDirectory {
    async fn query_page(&self, continuation_token: Option<&str>) -> Result<NodePage> {
        self.page(continuation_token)
    }
}

/// Directory exposed over HTTP as paged JSON:
/// `GET <url>?page_size=N[&continuation_token=T]`
#[derive(Debug, Clone)]
pub struct HttpNodeDirectory {
    client: reqwest::Client,
    url: String,
    page_size: usize,
}

impl HttpNodeDirectory {
    pub fn new(url: impl Into<String>, page_size: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            page_size: page_size.max(1),
        })
    }
}

impl NodeDirectory for HttpNodeDirectory {
    async fn query_page(&self, continuation_token: Option<&str>) -> Result<NodePage> {
        let mut request = self
            .client
            .get(&self.url)
            .query(&[("page_size", self.page_size.to_string())]);
        if let Some(token) = continuation_token {
            request = request.query(&[("continuation_token", token)]);
        }

        let response = request.send().await?.error_for_status()?;
        let page: NodePage = response.json().await?;
        tracing::debug!(
            url = %self.url,
            items = page.items.len(),
            has_more = page.continuation_token.is_some(),
            "directory page received"
        );
        Ok(page)
    }
}

/// Directory selected from configuration
#[derive(Debug, Clone)]
pub enum ConfiguredDirectory {
    Static(StaticNodeDirectory),
    Http(HttpNodeDirectory),
}

impl ConfiguredDirectory {
    /// Build the directory named by `source`; no source means an empty static list
    pub fn from_source(source: Option<&DirectorySource>, timeout: Duration) -> Result<Self> {
        match source {
            None => Ok(Self::Static(StaticNodeDirectory::default())),
            Some(DirectorySource::Static { nodes, page_size }) => {
                let directory = StaticNodeDirectory::new(nodes.clone());
                Ok(Self::Static(match page_size {
                    Some(size) => directory.with_page_size(*size),
                    None => directory,
                }))
            }
            Some(DirectorySource::Http { url, page_size }) => Ok(Self::Http(
                HttpNodeDirectory::new(url.clone(), *page_size, timeout)?,
            )),
        }
    }
}

impl NodeDirectory for ConfiguredDirectory {
    async fn query_page(&self, continuation_token: Option<&str>) -> Result<NodePage> {
        match self {
            ConfiguredDirectory::Static(directory) => directory.query_page(continuation_token).await,
            ConfiguredDirectory::Http(directory) => directory.query_page(continuation_token).await,
        }
    }
}
