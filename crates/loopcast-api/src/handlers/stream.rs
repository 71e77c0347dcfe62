//! Progress stream handler.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures_util::{Stream, StreamExt};
use tracing::debug;

use loopcast_queue::{DeliveryLoop, DeliveryPolicy};

use crate::state::AppState;

/// Stream conversion progress as server-sent events.
///
/// Each frame carries one JSON payload: an annotated engine line, a
/// heartbeat, or the terminal completion status after which the stream
/// closes. Heartbeats double as keep-alives, so no separate keep-alive
/// layer is attached.
pub async fn stream_output(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("progress stream subscriber connected");

    let policy = DeliveryPolicy {
        poll_interval: state.config.poll_interval,
        idle_threshold: state.config.idle_threshold,
    };

    let stream = DeliveryLoop::with_policy(state.events.clone(), policy)
        .into_stream()
        .map(|event| {
            let payload = serde_json::to_string(&event).unwrap_or_default();
            Ok(Event::default().data(payload))
        });

    Sse::new(stream)
}
