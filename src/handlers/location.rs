use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::Coordinate;
use crate::state::AppState;
use crate::store::{self, ChangeSignal};

#[derive(Deserialize)]
pub struct LocationUpdate {
    pub lat: f64,
    pub lng: f64,
}

// POST /api/location — record the last known device coordinate.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocationUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let coords = Coordinate::new(body.lat, body.lng);
    store::save_location(state.store.as_ref(), &coords)?;
    let _ = state.events_tx.send(ChangeSignal::LocationUpdated);
    Ok(Json(serde_json::json!({ "ok": true })))
}
