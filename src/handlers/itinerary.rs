use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::{self, keys, ChangeSignal};

// GET /api/itinerary
pub async fn current(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let plan = store::load_itinerary(state.store.as_ref())?;
    Ok(Json(serde_json::to_value(plan).unwrap_or_default()))
}

// DELETE /api/itinerary
pub async fn clear(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.delete(keys::CURRENT_ITINERARY)?;
    let _ = state.events_tx.send(ChangeSignal::ItineraryUpdated);
    Ok(Json(serde_json::json!({ "ok": true })))
}
