//! The render backend capability used by the arbiter
//!
//! The arbiter never touches processes directly: it asks a [`RenderBackend`]
//! to start a demo, run a text job, terminate, or poll. [`ProcessBackend`]
//! does this with real renderer executables; tests use the scripted
//! `FakeBackend` from `test_utils`.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;

use marquee_core::prelude::*;
use marquee_core::{ProcessStatus, TextJob};

use crate::command::{demo_command, text_command};
use crate::config::RenderConfig;
use crate::demos::select_demo;
use crate::process::RenderProcess;

/// Default time allowed for a killed renderer to be reaped
pub const DEFAULT_TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Display rendering operations
///
/// Exactly one handle may be live at a time; callers terminate (or observe
/// the exit of) the current handle before starting anything else.
#[trait_variant::make(RenderBackend: Send)]
pub trait LocalRenderBackend {
    /// A live demo process
    type Handle: Send;

    /// Select a demo at random and start it in the background
    async fn start_demo(&mut self) -> Result<Self::Handle>;

    /// Run a text job in the foreground, returning once it has exited.
    ///
    /// If `stop` turns `true` first, the renderer is terminated and reaped
    /// before this returns.
    async fn run_text(
        &mut self,
        job: TextJob,
        stop: watch::Receiver<bool>,
    ) -> Result<ProcessStatus>;

    /// Stop a demo. Succeeds if it had already exited.
    async fn terminate(&mut self, handle: &mut Self::Handle) -> Result<()>;

    /// Non-blocking status check
    fn poll(&mut self, handle: &mut Self::Handle) -> ProcessStatus;
}

/// Backend that spawns the renderer executables as child processes
pub struct ProcessBackend {
    config: RenderConfig,
    rng: StdRng,
    terminate_grace: Duration,
}

impl ProcessBackend {
    pub fn new(config: RenderConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Use a caller-provided RNG, e.g. a seeded one for reproducible runs
    pub fn with_rng(config: RenderConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            terminate_grace: DEFAULT_TERMINATE_GRACE,
        }
    }

    pub fn with_terminate_grace(mut self, grace: Duration) -> Self {
        self.terminate_grace = grace;
        self
    }
}

/// Resolves once `stop` reads `true`. Never resolves if the sender is gone.
pub(crate) async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    let closed = stop.wait_for(|stop| *stop).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

impl RenderBackend for ProcessBackend {
    type Handle = RenderProcess;

    async fn start_demo(&mut self) -> Result<RenderProcess> {
        let job = select_demo(&mut self.rng, &self.config.paths)?;
        info!("Starting {} demo: {}", job.category(), job);
        RenderProcess::spawn(&demo_command(&job, &self.config))
    }

    async fn run_text(
        &mut self,
        job: TextJob,
        mut stop: watch::Receiver<bool>,
    ) -> Result<ProcessStatus> {
        let mut process = RenderProcess::spawn(&text_command(&job, &self.config))?;
        let status = tokio::select! {
            status = process.wait() => status,
            _ = stop_requested(&mut stop) => {
                info!("Stop requested, taking text off the display");
                return process.terminate(self.terminate_grace).await;
            }
        };
        match status {
            ProcessStatus::Exited(Some(0)) => debug!("Text renderer finished"),
            other => warn!("Text renderer ended with {:?}", other),
        }
        Ok(status)
    }

    async fn terminate(&mut self, handle: &mut RenderProcess) -> Result<()> {
        handle.terminate(self.terminate_grace).await.map(|_| ())
    }

    fn poll(&mut self, handle: &mut RenderProcess) -> ProcessStatus {
        handle.status()
    }
}
