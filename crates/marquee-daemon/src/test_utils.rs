//! Test utilities for render backends
//!
//! [`FakeBackend`] stands in for the renderer executables. It records every
//! call, hands out numbered demo handles, and lets a test decide when a demo
//! exits or a launch fails through the cloneable [`FakeController`]. It also
//! enforces the single-writer rule: starting anything while another handle is
//! live panics the test.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use marquee_core::prelude::*;
use marquee_core::{ProcessStatus, TextJob};

use crate::backend::{stop_requested, RenderBackend};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeEvent {
    DemoStarted(u64),
    DemoStartFailed,
    Terminated(u64),
    TextStarted(String),
    TextFinished(String),
    /// Taken off the display by a stop request before it finished
    TextStopped(String),
    TextFailed(String),
}

/// Handle to a fake demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeHandle {
    pub id: u64,
}

#[derive(Debug, Default)]
struct FakeState {
    events: Vec<FakeEvent>,
    next_id: u64,
    /// Demo id -> exit status, for every demo ever started
    demos: BTreeMap<u64, ProcessStatus>,
    /// Scripted outcomes for upcoming `start_demo` calls, `true` = fail
    demo_failures: VecDeque<bool>,
    /// Texts whose launch should fail
    failing_texts: Vec<String>,
    text_duration: Duration,
}

impl FakeState {
    fn live_demo(&self) -> Option<u64> {
        self.demos
            .iter()
            .find(|(_, status)| !status.has_exited())
            .map(|(id, _)| *id)
    }

    fn assert_display_free(&self, what: &str) {
        if let Some(id) = self.live_demo() {
            panic!("{} while demo {} still holds the display", what, id);
        }
    }
}

/// Scripted, recording render backend
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

/// Test-side view of a [`FakeBackend`]; shares its state
#[derive(Debug, Clone)]
pub struct FakeController {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every text job take `duration` (in tokio time) to render
    pub fn with_text_duration(self, duration: Duration) -> Self {
        self.lock().text_duration = duration;
        self
    }

    pub fn controller(&self) -> FakeController {
        FakeController {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend state poisoned")
    }
}

impl FakeController {
    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend state poisoned")
    }

    /// All calls recorded so far
    pub fn events(&self) -> Vec<FakeEvent> {
        self.lock().events.clone()
    }

    /// Texts that have finished rendering, in order
    pub fn finished_texts(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                FakeEvent::TextFinished(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of demos successfully started
    pub fn demos_started(&self) -> usize {
        self.lock().demos.len()
    }

    /// The currently running demo, if any
    pub fn live_demo(&self) -> Option<u64> {
        self.lock().live_demo()
    }

    /// Simulate the live demo finishing on its own
    pub fn exit_live_demo(&self, code: i32) {
        let mut state = self.lock();
        if let Some(id) = state.live_demo() {
            state.demos.insert(id, ProcessStatus::Exited(Some(code)));
        }
    }

    /// Make the next `count` demo starts fail
    pub fn fail_next_demo_starts(&self, count: usize) {
        let mut state = self.lock();
        for _ in 0..count {
            state.demo_failures.push_back(true);
        }
    }

    /// Make the launch of a text job with this (escaped) text fail
    pub fn fail_text(&self, text: impl Into<String>) {
        self.lock().failing_texts.push(text.into());
    }
}

impl RenderBackend for FakeBackend {
    type Handle = FakeHandle;

    async fn start_demo(&mut self) -> Result<FakeHandle> {
        let mut state = self.lock();
        state.assert_display_free("start_demo");

        if state.demo_failures.pop_front().unwrap_or(false) {
            state.events.push(FakeEvent::DemoStartFailed);
            return Err(Error::no_media_found("/fake/videos"));
        }

        state.next_id += 1;
        let id = state.next_id;
        state.demos.insert(id, ProcessStatus::Running);
        state.events.push(FakeEvent::DemoStarted(id));
        Ok(FakeHandle { id })
    }

    async fn run_text(
        &mut self,
        job: TextJob,
        mut stop: watch::Receiver<bool>,
    ) -> Result<ProcessStatus> {
        let duration = {
            let mut state = self.lock();
            state.assert_display_free("run_text");

            if state.failing_texts.contains(&job.escaped_text) {
                state.events.push(FakeEvent::TextFailed(job.escaped_text.clone()));
                return Err(Error::process_launch("/fake/scrolling-text", "scripted failure"));
            }
            state.events.push(FakeEvent::TextStarted(job.escaped_text.clone()));
            state.text_duration
        };

        let stopped = if duration.is_zero() {
            false
        } else {
            tokio::select! {
                biased;
                _ = stop_requested(&mut stop) => true,
                _ = tokio::time::sleep(duration) => false,
            }
        };

        let mut state = self.lock();
        if stopped {
            state.events.push(FakeEvent::TextStopped(job.escaped_text));
            return Ok(ProcessStatus::Exited(None));
        }
        state.events.push(FakeEvent::TextFinished(job.escaped_text));
        Ok(ProcessStatus::Exited(Some(0)))
    }

    async fn terminate(&mut self, handle: &mut FakeHandle) -> Result<()> {
        let mut state = self.lock();
        let running = state
            .demos
            .get(&handle.id)
            .map(|s| !s.has_exited())
            .unwrap_or(false);
        if running {
            state.demos.insert(handle.id, ProcessStatus::Exited(None));
            state.events.push(FakeEvent::Terminated(handle.id));
        }
        Ok(())
    }

    fn poll(&mut self, handle: &mut FakeHandle) -> ProcessStatus {
        self.lock()
            .demos
            .get(&handle.id)
            .copied()
            .unwrap_or(ProcessStatus::Exited(None))
    }
}
