//! Display arbitration: decides whether the matrix shows queued text or a demo
//!
//! The [`Arbiter`] is the only owner of the render backend and of the live
//! demo handle. It is evaluated on a fixed tick and whenever the queue wakes
//! it:
//!
//! - `DEMO_RUNNING` with text waiting: terminate the demo, go to
//!   `TEXT_DRAINING`.
//! - `TEXT_DRAINING`: render every queued request in order, each to
//!   completion, until the queue stays empty; then start a fresh demo and go
//!   back to `DEMO_RUNNING`.
//! - `DEMO_RUNNING` with an empty queue: terminate a demo older than the demo
//!   timeout, and replace any demo that has exited.
//!
//! Time is read only through [`tokio::time::Instant`], so tests drive it with
//! a paused clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use marquee_core::prelude::*;
use marquee_core::{DisplayState, ProcessStatus, TextJob};
use marquee_daemon::RenderBackend;

use crate::queue::MessageQueue;

/// Timing knobs of the arbitration loop
#[derive(Debug, Clone, PartialEq)]
pub struct ArbiterSettings {
    /// Evaluation cadence
    pub tick: Duration,
    /// Maximum age of a demo before it is replaced
    pub demo_timeout: Duration,
    /// Demo selections tried before backing off
    pub demo_attempts: u32,
    /// First back-off delay after a failed start cycle
    pub backoff_initial: Duration,
    /// Back-off ceiling
    pub backoff_max: Duration,
}

impl Default for ArbiterSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            demo_timeout: Duration::from_secs(30),
            demo_attempts: 6,
            backoff_initial: Duration::from_secs(1),
            backoff_max: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Backoff {
    until: Instant,
    delay: Duration,
}

/// The display arbitration state machine
pub struct Arbiter<B: RenderBackend> {
    backend: B,
    queue: Arc<MessageQueue>,
    settings: ArbiterSettings,
    state: DisplayState,
    demo: Option<B::Handle>,
    demo_started: Instant,
    backoff: Option<Backoff>,
    /// Shutdown signal handed to every text render
    stop: watch::Receiver<bool>,
}

impl<B: RenderBackend> Arbiter<B> {
    pub fn new(backend: B, queue: Arc<MessageQueue>, settings: ArbiterSettings) -> Self {
        Self {
            backend,
            queue,
            settings,
            state: DisplayState::DemoRunning,
            demo: None,
            demo_started: Instant::now(),
            backoff: None,
            // replaced in `run`; a receiver without a sender never fires
            stop: watch::channel(false).1,
        }
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    /// Whether a demo handle is currently held
    pub fn has_demo(&self) -> bool {
        self.demo.is_some()
    }

    /// How long the current demo has been running
    pub fn demo_age(&self) -> Option<Duration> {
        self.demo.as_ref().map(|_| self.demo_started.elapsed())
    }

    /// Whether demo starts are paused after repeated failures
    pub fn is_backing_off(&self) -> bool {
        self.backoff.is_some()
    }

    /// Show the first demo
    pub async fn start(&mut self) {
        info!("Arbiter starting in {}", self.state);
        self.start_demo_cycle().await;
    }

    /// Evaluate the transitions once
    pub async fn step(&mut self) {
        if self.state == DisplayState::DemoRunning && !self.queue.is_empty() {
            info!("{} message(s) waiting, interrupting demo", self.queue.len());
            if !self.stop_demo().await {
                warn!("Demo did not stop, text postponed to the next tick");
                return;
            }
            self.set_state(DisplayState::TextDraining);
        }

        if self.state == DisplayState::TextDraining {
            self.drain_text().await;
            self.set_state(DisplayState::DemoRunning);
            if !self.stopping() {
                self.start_demo_cycle().await;
            }
            return;
        }

        let Some(handle) = self.demo.as_mut() else {
            match self.backoff {
                Some(backoff) if Instant::now() < backoff.until => {
                    trace!("Demo start backing off");
                }
                _ => self.start_demo_cycle().await,
            }
            return;
        };

        let mut status = self.backend.poll(handle);
        if status == ProcessStatus::Running && self.demo_started.elapsed() >= self.settings.demo_timeout
        {
            debug!("Demo reached {:?}, replacing it", self.settings.demo_timeout);
            if !self.stop_demo().await {
                return;
            }
            status = ProcessStatus::Exited(None);
        }

        if let ProcessStatus::Exited(code) = status {
            debug!("Demo ended ({:?}), starting the next one", code);
            self.demo = None;
            self.start_demo_cycle().await;
        }
    }

    /// Run until `shutdown_rx` flips to `true` (or its sender is dropped),
    /// then stop whatever is on the display.
    ///
    /// A text render in progress when shutdown arrives is terminated and
    /// reaped before this returns.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        self.stop = shutdown_rx.clone();
        let queue = Arc::clone(&self.queue);
        let mut ticker = tokio::time::interval(self.settings.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if !*shutdown_rx.borrow() {
            self.start().await;
        }

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        debug!("Shutdown sender dropped");
                        break;
                    }
                    continue;
                }
                _ = queue.notified() => trace!("Woken by queue"),
                _ = ticker.tick() => {}
            }

            self.step().await;
        }

        self.shutdown().await;
    }

    /// Take the current demo off the display
    pub async fn shutdown(&mut self) {
        info!("Arbiter shutting down");
        if !self.stop_demo().await {
            warn!("Demo still running at shutdown");
        }
    }

    fn stopping(&self) -> bool {
        *self.stop.borrow()
    }

    fn set_state(&mut self, state: DisplayState) {
        if self.state != state {
            info!("Display state: {} -> {}", self.state, state);
            self.state = state;
        }
    }

    /// Terminate the current demo. Returns `false` if it is still holding
    /// the display, in which case the handle is kept for another try.
    async fn stop_demo(&mut self) -> bool {
        let Some(mut handle) = self.demo.take() else {
            return true;
        };

        match self.backend.terminate(&mut handle).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to terminate demo: {}", e);
                if self.backend.poll(&mut handle).has_exited() {
                    true
                } else {
                    self.demo = Some(handle);
                    false
                }
            }
        }
    }

    /// Render queued text until the queue stays empty or shutdown begins
    async fn drain_text(&mut self) {
        loop {
            let batch = self.queue.drain_all();
            if batch.is_empty() {
                break;
            }

            for request in batch {
                if self.stopping() {
                    debug!("Shutting down, skipping remaining messages");
                    return;
                }
                debug!(
                    "Rendering message ({} chars, args {:?})",
                    request.text().chars().count(),
                    request.extra_args()
                );
                let text = request.text().to_string();
                let job = TextJob::from(request);
                match self.backend.run_text(job, self.stop.clone()).await {
                    Ok(ProcessStatus::Exited(Some(0))) => {}
                    Ok(status) => warn!("Text renderer for {:?} ended with {:?}", text, status),
                    Err(e) => warn!("Dropping message {:?}: {}", text, e),
                }
            }
        }
    }

    /// Try up to `demo_attempts` selections, then back off
    async fn start_demo_cycle(&mut self) {
        let attempts = self.settings.demo_attempts.max(1);
        for attempt in 1..=attempts {
            match self.backend.start_demo().await {
                Ok(handle) => {
                    self.demo = Some(handle);
                    self.demo_started = Instant::now();
                    self.backoff = None;
                    return;
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Demo start attempt {}/{} failed: {}", attempt, attempts, e)
                }
                Err(e) => {
                    error!("Demo start failed: {}", e);
                    break;
                }
            }
        }

        let delay = match self.backoff {
            None => self.settings.backoff_initial,
            Some(previous) => (previous.delay * 2).min(self.settings.backoff_max),
        };
        error!("No demo could be started, retrying in {:?}", delay);
        self.backoff = Some(Backoff {
            until: Instant::now() + delay,
            delay,
        });
    }
}
