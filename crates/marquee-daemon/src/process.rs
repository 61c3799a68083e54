//! Render process management

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Notify};

use crate::command::RenderCommand;
use marquee_core::prelude::*;
use marquee_core::ProcessStatus;

/// Exit state written once by the wait task
#[derive(Debug, Default)]
struct ExitState {
    exited: AtomicBool,
    code: Mutex<Option<i32>>,
    notify: Notify,
}

/// One renderer child process driving the display.
///
/// The `Child` handle is moved into a dedicated `wait_for_exit` background task
/// that calls `child.wait()`, so the process is always reaped and its exit code
/// recorded. `RenderProcess` keeps a kill channel to request termination and
/// shared [`ExitState`] for non-blocking `status()` checks and for awaiting
/// exit without holding a lock across `.await`.
pub struct RenderProcess {
    /// Program name for logging
    program: String,
    /// Process ID for logging
    pid: Option<u32>,
    /// One-shot sender that tells the wait task to kill the process.
    /// Consumed on first use (or on drop).
    kill_tx: Option<oneshot::Sender<()>>,
    exit: Arc<ExitState>,
}

impl RenderProcess {
    /// Spawn `command` with no stdin and inherited stdout/stderr.
    pub fn spawn(command: &RenderCommand) -> Result<Self> {
        info!("Spawning renderer: {}", command);

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true) // Critical: the display must never be left to an orphan
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::ExecutableNotFound {
                        program: command.program.clone(),
                    }
                } else {
                    Error::process_launch(&command.program, e.to_string())
                }
            })?;

        let program = command
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| command.program.display().to_string());

        Ok(Self::from_child(child, program))
    }

    /// Wrap an already spawned child and start its wait task.
    fn from_child(child: Child, program: String) -> Self {
        let pid = child.id();
        debug!("{} started with PID: {:?}", program, pid);

        let exit = Arc::new(ExitState::default());

        // Kill channel: RenderProcess holds the sender, wait task holds the receiver.
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        tokio::spawn(Self::wait_for_exit(
            child,
            kill_rx,
            program.clone(),
            Arc::clone(&exit),
        ));

        Self {
            program,
            pid,
            kill_tx: Some(kill_tx),
            exit,
        }
    }

    /// Background task: owns `child`, waits for it to exit, records the code.
    ///
    /// Two ways the task can end:
    /// 1. The renderer exits on its own - `child.wait()` resolves.
    /// 2. `kill_rx` fires - we kill the child first, then wait for it.
    async fn wait_for_exit(
        mut child: Child,
        kill_rx: oneshot::Receiver<()>,
        program: String,
        exit: Arc<ExitState>,
    ) {
        let code: Option<i32> = tokio::select! {
            result = child.wait() => {
                match result {
                    Ok(status) => {
                        info!("{} exited with status: {}", program, status);
                        status.code()
                    }
                    Err(e) => {
                        error!("Error waiting for {}: {}", program, e);
                        None
                    }
                }
            }
            // Kill path: kill_tx was sent (by terminate or drop)
            _ = kill_rx => {
                debug!("Kill requested, killing {}", program);
                if let Err(e) = child.kill().await {
                    // Already exited between the decision and the signal
                    debug!("Kill of {} failed: {}", program, e);
                }
                match child.wait().await {
                    Ok(status) => {
                        info!("{} terminated, exit status: {}", program, status);
                        status.code()
                    }
                    Err(e) => {
                        error!("Error waiting after kill of {}: {}", program, e);
                        None
                    }
                }
            }
        };

        // Record the code before raising the flag so a reader that sees
        // `exited == true` also sees the code.
        if let Ok(mut slot) = exit.code.lock() {
            *slot = code;
        }
        exit.exited.store(true, Ordering::Release);
        exit.notify.notify_waiters();
    }

    /// Non-blocking status check
    pub fn status(&self) -> ProcessStatus {
        if self.has_exited() {
            let code = self.exit.code.lock().map(|c| *c).unwrap_or(None);
            ProcessStatus::Exited(code)
        } else {
            ProcessStatus::Running
        }
    }

    /// Check if the process has already exited (and been reaped).
    pub fn has_exited(&self) -> bool {
        self.exit.exited.load(Ordering::Acquire)
    }

    /// Check if the process is still running.
    pub fn is_running(&self) -> bool {
        !self.has_exited()
    }

    /// Get the process ID
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Program file name, for logging
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Wait until the process has exited and return its status.
    pub async fn wait(&self) -> ProcessStatus {
        // Race-free pattern: create the `notified()` future BEFORE the
        // `has_exited()` check, so we cannot miss a notification that fires
        // between the check and the await.
        let notified = self.exit.notify.notified();
        if self.has_exited() {
            return self.status();
        }
        notified.await;
        self.status()
    }

    /// Request a kill without waiting. Idempotent.
    pub fn kill(&mut self) {
        if let Some(tx) = self.kill_tx.take() {
            // Ignore send error - the wait task may have already exited naturally.
            let _ = tx.send(());
        }
    }

    /// Kill the process and wait up to `grace` for it to be reaped.
    ///
    /// Safe to call on a process that already exited, or twice.
    pub async fn terminate(&mut self, grace: Duration) -> Result<ProcessStatus> {
        if self.has_exited() {
            debug!("{} already exited, nothing to terminate", self.program);
            return Ok(self.status());
        }

        info!("Terminating {} (PID {:?})", self.program, self.pid);
        self.kill();

        match tokio::time::timeout(grace, self.wait()).await {
            Ok(status) => Ok(status),
            Err(_) => Err(Error::process(format!(
                "{} (PID {:?}) not reaped within {:?}",
                self.program, self.pid, grace
            ))),
        }
    }
}

impl Drop for RenderProcess {
    fn drop(&mut self) {
        if !self.has_exited() {
            warn!("RenderProcess for {} dropped while still running", self.program);
            // If kill_tx was already consumed by terminate(), this is a no-op.
            self.kill();
        }
        // kill_on_drop(true) on the Child is the final safety net if the
        // wait task is torn down with the runtime.
    }
}
