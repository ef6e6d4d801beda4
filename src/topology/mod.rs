//! Cluster topology discovery
//!
//! The node directory is queried page by page until it stops handing out
//! continuation tokens. Records are kept in the order the directory returns
//! them, duplicates included.

pub mod directory;
pub mod reader;

pub use directory::{ConfiguredDirectory, HttpNodeDirectory, NodeDirectory, StaticNodeDirectory};
pub use reader::TopologyReader;

use serde::{Deserialize, Serialize};

/// One peer eligible to take part in the managed topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNodeInfo {
    pub name: String,
    pub address: String,
}

impl ClusterNodeInfo {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl std::str::FromStr for ClusterNodeInfo {
    type Err = crate::Error;

    /// Parses `name=address`
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.split_once('=').map(|(name, address)| (name.trim(), address.trim())) {
            Some((name, address)) if !name.is_empty() && !address.is_empty() => {
                Ok(Self::new(name, address))
            }
            _ => Err(crate::Error::InvalidConfig(format!(
                "expected name=address, got '{}'",
                s
            ))),
        }
    }
}

/// One page of a directory query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePage {
    pub items: Vec<ClusterNodeInfo>,
    #[serde(default)]
    pub continuation_token: Option<String>,
}
