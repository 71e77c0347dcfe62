//! SSE delivery loop.
//!
//! Drains the event queue at a fixed poll interval and turns queue items
//! into framed stream events. Completion is declared either by an explicit
//! `ProcessExited` queue item or, as a fallback, after a bounded period of
//! queue silence.

use std::time::Duration;

use futures_util::Stream;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::debug;

use loopcast_models::{ProgressEvent, StreamEvent};

use crate::queue::EventQueue;

/// Tunable delivery behavior.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryPolicy {
    /// Time between queue polls; heartbeats are emitted at this cadence
    /// while the queue is idle.
    pub poll_interval: Duration,
    /// Queue silence after which the stream is declared complete.
    pub idle_threshold: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            idle_threshold: Duration::from_secs(2),
        }
    }
}

/// The per-subscriber push loop.
///
/// One instance serves one stream connection. Each [`next_event`] call is
/// one tick: an available item is emitted immediately, an idle tick emits a
/// heartbeat, and the idle threshold (or an explicit process-exit item)
/// emits exactly one completion event after which the loop yields `None`.
///
/// [`next_event`]: DeliveryLoop::next_event
pub struct DeliveryLoop {
    queue: EventQueue,
    policy: DeliveryPolicy,
    last_emit: Instant,
    started: bool,
    done: bool,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl DeliveryLoop {
    pub fn new(queue: EventQueue) -> Self {
        Self::with_policy(queue, DeliveryPolicy::default())
    }

    pub fn with_policy(queue: EventQueue, policy: DeliveryPolicy) -> Self {
        Self {
            queue,
            policy,
            last_emit: Instant::now(),
            started: false,
            done: false,
            cancel_rx: None,
        }
    }

    /// Set a cancellation signal. When it flips to `true` the loop ends
    /// without emitting a completion event.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Produce the next stream event, or `None` once the stream has ended.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        if self.done {
            return None;
        }

        // The idle clock starts at loop entry; the first tick polls
        // immediately, every later tick waits out the poll interval first.
        if self.started {
            sleep(self.policy.poll_interval).await;
        } else {
            self.started = true;
        }

        if let Some(cancel_rx) = &self.cancel_rx {
            if *cancel_rx.borrow() {
                debug!("delivery loop cancelled");
                self.done = true;
                return None;
            }
        }

        match self.queue.try_pop() {
            Some(ProgressEvent::Line(line)) => {
                self.last_emit = Instant::now();
                Some(StreamEvent::output(line))
            }
            Some(ProgressEvent::ProcessExited { success }) => {
                debug!(success, "process exited, completing stream");
                self.done = true;
                Some(StreamEvent::complete())
            }
            None => {
                if self.last_emit.elapsed() > self.policy.idle_threshold {
                    debug!("idle threshold exceeded, completing stream");
                    self.done = true;
                    Some(StreamEvent::complete())
                } else {
                    Some(StreamEvent::heartbeat())
                }
            }
        }
    }

    /// Consume the loop as a stream of events, ending after the terminal
    /// completion event (or on cancellation).
    pub fn into_stream(self) -> impl Stream<Item = StreamEvent> {
        futures_util::stream::unfold(self, |mut this| async move {
            this.next_event().await.map(|event| (event, this))
        })
    }
}
