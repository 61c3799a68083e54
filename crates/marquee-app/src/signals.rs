//! OS signals that end the daemon
//!
//! Either signal starts the same shutdown: the HTTP server stops accepting
//! requests, then the engine takes whatever is on the matrix off the display
//! so no renderer outlives the process.

use std::fmt;

use marquee_core::prelude::*;

/// The signal that asked the daemon to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT, or Ctrl+C on Windows
    Interrupt,
    /// SIGTERM, as sent by service managers
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => write!(f, "SIGINT"),
            ShutdownSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Resolve with the first shutdown signal delivered to the process
pub async fn shutdown_signal() -> Result<ShutdownSignal> {
    #[cfg(unix)]
    let received = {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|e| Error::signal(format!("Failed to create SIGINT handler: {}", e)))?;
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| Error::signal(format!("Failed to create SIGTERM handler: {}", e)))?;

        tokio::select! {
            _ = sigint.recv() => ShutdownSignal::Interrupt,
            _ = sigterm.recv() => ShutdownSignal::Terminate,
        }
    };

    #[cfg(windows)]
    let received = {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| Error::signal(format!("Failed to listen for Ctrl+C: {}", e)))?;
        ShutdownSignal::Interrupt
    };

    info!("Received {}, clearing the display", received);
    Ok(received)
}
