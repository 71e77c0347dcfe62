//! Unbounded FIFO queue of progress events.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use loopcast_models::ProgressEvent;

/// Thread-safe, unbounded FIFO of progress events.
///
/// Cheaply cloneable; all clones share the same queue. The producer (the
/// supervisor's stderr reader) never blocks on a slow or absent consumer,
/// at the cost of unbounded growth while nobody is subscribed. That is
/// accepted here: jobs are short-lived and at most one runs at a time.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<ProgressEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the back of the queue.
    pub fn push(&self, event: ProgressEvent) {
        self.lock().push_back(event);
    }

    /// Pop the oldest event, or `None` when the queue is empty. Never blocks.
    pub fn try_pop(&self) -> Option<ProgressEvent> {
        self.lock().pop_front()
    }

    /// Drop all queued events. Called before each new job so stale events
    /// from a previous job cannot reach a new subscriber.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<ProgressEvent>> {
        self.inner.lock().expect("event queue lock poisoned")
    }
}
