//! Bounded FIFO of display requests shared by the intake and the arbiter

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::Notify;

use marquee_core::prelude::*;
use marquee_core::DisplayRequest;

/// Default number of requests that may wait for the display
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Thread-safe bounded queue.
///
/// Any number of producers may [`enqueue`](Self::enqueue); only the arbiter
/// removes, and always everything at once via [`drain_all`](Self::drain_all).
/// Each successful enqueue wakes the arbiter through [`notified`](Self::notified).
#[derive(Debug)]
pub struct MessageQueue {
    items: Mutex<VecDeque<DisplayRequest>>,
    capacity: usize,
    notify: Notify,
}

impl MessageQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            notify: Notify::new(),
        }
    }

    /// Append at the tail, or fail with [`Error::QueueFull`] when
    /// `capacity` requests are already waiting.
    pub fn enqueue(&self, request: DisplayRequest) -> Result<()> {
        {
            let mut items = self.lock();
            if items.len() >= self.capacity {
                return Err(Error::queue_full(self.capacity));
            }
            items.push_back(request);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Remove and return every queued request in FIFO order
    pub fn drain_all(&self) -> Vec<DisplayRequest> {
        self.lock().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resolves after the next enqueue, or immediately if one happened
    /// since the last wake-up.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<DisplayRequest>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
