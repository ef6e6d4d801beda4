//! # kvshepherd
//!
//! Supervises a redis-style key-value store (or its sentinel) as a service
//! inside a clustered host:
//! - discovers the cluster's nodes through a paged node directory
//! - writes a working config from a template (plus sentinel directives)
//! - launches the server binary against it and lets it run
//! - stops it through its control port before every start and on exit
//!
//! ## Activation
//!
//! ```text
//!   shutdown ─► discover ─► materialize ─► launch ─► wait ─► shutdown
//!   (control     (sentinel    <work>/<role>/   (fire and     (always)
//!    port)        only)        <config>         forget)
//! ```
//!
//! ## Usage
//!
//! ### Store
//! ```bash
//! kvshepherd-store --code-path /opt/redis --work-path /var/lib/kvshepherd
//! ```
//!
//! ### Sentinel
//! ```bash
//! kvshepherd-sentinel \
//!   --code-path /opt/redis \
//!   --work-path /var/lib/kvshepherd \
//!   --node n1=10.0.0.1 --node n2=10.0.0.2 --node n3=10.0.0.3
//! ```
//!
//! ### Operator CLI
//! ```bash
//! kvshepherd render --variant sentinel --template sentinel.conf --out-dir ./out --node n1=10.0.0.1
//! kvshepherd shutdown --port 6379
//! kvshepherd quorum 5
//! ```

pub mod common;
pub mod materializer;
pub mod process;
pub mod service;
pub mod topology;

// Re-export commonly used types
pub use common::{Error, Result, ServiceVariant, SupervisorConfig};
pub use service::{RunState, ServiceRunLoop};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build info
pub const BUILD_INFO: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARGO_PKG_NAME"), ")");
