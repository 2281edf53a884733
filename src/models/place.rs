use serde::{Deserialize, Serialize};

use crate::models::geo::Coordinate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    Restaurant,
    Hotel,
}

/// One discovery result near a query point. Ephemeral: recomputed on every
/// query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub coords: Coordinate,
    #[serde(rename = "type")]
    pub kind: PlaceKind,
    pub cuisine: Option<String>,
    pub stars: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub price_range: String,
    /// Great-circle distance from the query point in kilometres.
    pub distance_km: f64,
}
