//! Common types shared across kvshepherd

pub mod config;
pub mod error;

pub use config::{DirectorySource, ServiceVariant, SupervisorConfig, SENTINEL_PORT, STORE_PORT};
pub use error::{Error, Result};
