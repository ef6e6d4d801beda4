//! Managed process handling
//!
//! Starting the process is fire-and-forget; stopping it only ever goes
//! through the control port.

pub mod launcher;
pub mod shutdown;

pub use launcher::{LaunchSpec, ProcessLauncher, TokioLauncher};
pub use shutdown::{ShutdownClient, ShutdownOutcome, SHUTDOWN_COMMAND};
