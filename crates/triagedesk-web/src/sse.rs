//! Server-Sent Events (SSE) stream of queue changes.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::state::{QueueEvent, SharedState};

fn event_name(event: &QueueEvent) -> &'static str {
    match event {
        QueueEvent::PatientAdded { .. }   => "patient_added",
        QueueEvent::Retriaged { .. }      => "retriaged",
        QueueEvent::MarkedSeen { .. }     => "marked_seen",
        QueueEvent::ProfileChanged { .. } => "profile_changed",
        QueueEvent::Escalated { .. }      => "escalated",
    }
}

/// GET /api/events
pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    // lagged receivers drop the missed events and carry on
    let stream = BroadcastStream::new(rx)
        .filter_map(|result| {
            result.ok().and_then(|event| {
                serde_json::to_string(&event).ok().map(|data| {
                    Ok(Event::default().event(event_name(&event)).data(data))
                })
            })
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
