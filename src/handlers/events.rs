use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tokio_stream::StreamExt;

use crate::state::AppState;

// GET /api/events — SSE of state-change signals (bookings, itinerary, chat,
// location). Clients re-fetch the affected slice on each signal rather than
// receiving payloads inline.
pub async fn stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events_tx.subscribe();

    let signals = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(signal) => {
            let data = serde_json::to_string(&signal).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("change")))
        }
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!(skipped, "event stream lagged");
            None
        }
    });

    let keepalive = IntervalStream::new(tokio::time::interval(Duration::from_secs(30)))
        .map(|_| Ok(Event::default().comment("keepalive")));

    Sse::new(signals.merge(keepalive))
}
