//! Engine - owns the queue, the arbiter task and the shutdown signal
//!
//! Frontends (the HTTP server, tests) only ever see the shared
//! [`MessageQueue`]; everything that touches the display runs inside the
//! arbiter task spawned here.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use marquee_core::prelude::*;
use marquee_daemon::RenderBackend;

use crate::arbiter::{Arbiter, ArbiterSettings};
use crate::config::Settings;
use crate::queue::MessageQueue;

/// How long [`Engine::shutdown`] waits for the arbiter to clear the display
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Running arbitration context
pub struct Engine {
    queue: Arc<MessageQueue>,

    /// Send `true` to stop the arbiter
    shutdown_tx: watch::Sender<bool>,

    shutdown_rx: watch::Receiver<bool>,

    arbiter_task: Option<JoinHandle<()>>,
}

impl Engine {
    /// Create the queue and spawn the arbiter over `backend`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start<B>(settings: Settings, backend: B) -> Self
    where
        B: RenderBackend + Send + 'static,
    {
        Self::start_with(settings.arbiter_settings(), settings, backend)
    }

    /// Like [`start`](Self::start) but with explicit arbiter timing
    pub fn start_with<B>(arbiter_settings: ArbiterSettings, settings: Settings, backend: B) -> Self
    where
        B: RenderBackend + Send + 'static,
    {
        let queue = Arc::new(MessageQueue::new(settings.queue.capacity));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            "Starting engine (queue capacity {}, tick {:?}, demo timeout {:?})",
            queue.capacity(),
            arbiter_settings.tick,
            arbiter_settings.demo_timeout
        );

        let arbiter = Arbiter::new(backend, Arc::clone(&queue), arbiter_settings);
        let arbiter_task = tokio::spawn(arbiter.run(shutdown_rx.clone()));

        Self {
            queue,
            shutdown_tx,
            shutdown_rx,
            arbiter_task: Some(arbiter_task),
        }
    }

    /// The queue shared with the intake
    pub fn queue(&self) -> Arc<MessageQueue> {
        Arc::clone(&self.queue)
    }

    /// Whether shutdown has been requested
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Signal the arbiter and wait for it to clear the display, including a
    /// text render that is still running
    pub async fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(true);

        let Some(task) = self.arbiter_task.take() else {
            return;
        };

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await {
            Ok(Ok(())) => info!("Arbiter stopped"),
            Ok(Err(e)) => warn!("Arbiter task panicked: {}", e),
            Err(_) => warn!("Arbiter did not stop within {:?}", SHUTDOWN_TIMEOUT),
        }
    }
}
