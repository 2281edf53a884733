use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::ConfirmedBooking;
use crate::services::booking;
use crate::state::AppState;
use crate::store;

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub tenant_id: String,
}

// POST /api/booking/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConfirmRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!(tenant = %body.tenant_id, "booking confirmation requested");

    let outcome = booking::confirm(
        state.store.as_ref(),
        state.geocoder.as_ref(),
        &state.events_tx,
    )
    .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "reference_id": outcome.reference_id,
        "already_confirmed": outcome.already_confirmed,
        "tracking_available": outcome.booking.is_some(),
        "booking": outcome.booking,
    })))
}

// GET /api/bookings
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConfirmedBooking>>, AppError> {
    Ok(Json(store::load_bookings(state.store.as_ref())?))
}

// DELETE /api/bookings/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !booking::remove_booking(state.store.as_ref(), &state.events_tx, &id)? {
        return Err(AppError::NotFound(format!("no booking with id {id}")));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}
