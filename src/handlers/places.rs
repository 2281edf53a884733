use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Coordinate, Place};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
}

// GET /api/places/nearby?lat=..&lng=..
pub async fn nearby(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<Place>>, AppError> {
    let center = Coordinate::new(query.lat, query.lng);
    let places = state.places.nearby(center).await?;
    Ok(Json(places))
}
