//! Control-port shutdown
//!
//! Sends `shutdown\n` to the managed process over loopback TCP and closes the
//! connection without reading anything back. Every failure is reported as an
//! outcome, never as an error: nothing listening is the normal state before
//! the first launch.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

pub const SHUTDOWN_COMMAND: &[u8] = b"shutdown\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Command written and flushed to a listener
    Terminated,
    /// Connection refused
    NoListener,
    /// Anything else: timeout, reset, write failure
    OtherFailure(String),
}

impl std::fmt::Display for ShutdownOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownOutcome::Terminated => write!(f, "terminated"),
            ShutdownOutcome::NoListener => write!(f, "no listener"),
            ShutdownOutcome::OtherFailure(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownClient {
    addr: SocketAddr,
    timeout: Duration,
}

impl ShutdownClient {
    /// Client for `127.0.0.1:<port>`
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self::with_addr(SocketAddr::from((Ipv4Addr::LOCALHOST, port)), timeout)
    }

    pub fn with_addr(addr: SocketAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Ask the process to stop. One attempt, bounded by the timeout.
    pub async fn request_shutdown(&self) -> ShutdownOutcome {
        let outcome = match tokio::time::timeout(self.timeout, self.send()).await {
            Ok(Ok(())) => ShutdownOutcome::Terminated,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                ShutdownOutcome::NoListener
            }
            Ok(Err(e)) => ShutdownOutcome::OtherFailure(e.to_string()),
            Err(_) => ShutdownOutcome::OtherFailure(format!("timed out after {:?}", self.timeout)),
        };

        match &outcome {
            ShutdownOutcome::Terminated => {
                tracing::info!(addr = %self.addr, "shutdown command delivered")
            }
            ShutdownOutcome::NoListener => {
                tracing::info!(addr = %self.addr, "no process listening on control port")
            }
            ShutdownOutcome::OtherFailure(reason) => {
                tracing::warn!(addr = %self.addr, %reason, "shutdown command failed")
            }
        }
        outcome
    }

    async fn send(&self) -> std::io::Result<()> {
        let mut stream = TcpStream::connect(self.addr).await?;
        stream.write_all(SHUTDOWN_COMMAND).await?;
        stream.flush().await?;
        // The peer may already be gone after reading the command.
        let _ = stream.shutdown().await;
        Ok(())
    }
}
