use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::Json;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::services::tracking::TrackingSession;
use crate::state::AppState;
use crate::store;

// POST /api/tracking/:booking_id/start
//
// Fetches the route for a confirmed booking and spawns its tick loop. A
// session already running for this booking is replaced (and its timer
// aborted). Route fetch failure leaves tracking unloaded; the caller may
// retry manually.
pub async fn start(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let booking = store::load_bookings(state.store.as_ref())?
        .into_iter()
        .find(|b| b.id == booking_id)
        .ok_or_else(|| AppError::NotFound(format!("no booking with id {booking_id}")))?;

    let route = state
        .routes
        .fetch_route(booking.start_coords, booking.end_coords)
        .await
        .map_err(|e| {
            tracing::warn!(booking_id = %booking_id, error = %e, "route fetch failed");
            AppError::Routing(e.to_string())
        })?;

    tracing::info!(
        booking_id = %booking_id,
        points = route.geometry.len(),
        distance_km = route.distance_km,
        "route loaded, starting simulation"
    );

    let session = TrackingSession::spawn(booking_id.clone(), route);
    let response = serde_json::json!({
        "booking_id": booking_id,
        "distance_km": session.distance_km,
        "eta_min": session.initial_eta_min,
    });

    // Replacing an existing session drops it, which aborts its timer.
    state.tracking.lock().unwrap().insert(booking_id, session);

    Ok(Json(response))
}

// GET /api/tracking/:booking_id/events — SSE of tick updates.
pub async fn events(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    let rx = {
        let sessions = state.tracking.lock().unwrap();
        let session = sessions
            .get(&booking_id)
            .ok_or_else(|| AppError::NotFound(format!("no tracking session for {booking_id}")))?;
        session.subscribe()
    };

    let updates = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(update) => {
            let data = serde_json::to_string(&update).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("tick")))
        }
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive =
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30)))
            .map(|_| Ok(Event::default().comment("keepalive")));

    Ok(Sse::new(updates.merge(keepalive)))
}

// POST /api/tracking/:booking_id/stop
pub async fn stop(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = state.tracking.lock().unwrap().remove(&booking_id);
    if removed.is_none() {
        return Err(AppError::NotFound(format!(
            "no tracking session for {booking_id}"
        )));
    }
    tracing::info!(booking_id = %booking_id, "tracking session stopped");
    Ok(Json(serde_json::json!({ "ok": true })))
}
