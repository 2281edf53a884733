use serde::{Deserialize, Serialize};

use crate::models::directive::BookingDirective;
use crate::models::geo::Coordinate;

/// A booking the user has confirmed, with both endpoints resolved to
/// coordinates. Lives only in the persisted newest-first list (cap 10);
/// no in-memory master copy outlives a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedBooking {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub pickup: String,
    pub dropoff: String,
    pub time: String,
    pub confirmed_at: String,
    pub start_coords: Coordinate,
    pub end_coords: Coordinate,
}

/// The persisted booking draft: the latest directive from the assistant plus
/// the reference id issued on confirmation. Holding the reference id here is
/// what makes re-confirming a no-op that returns the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveBooking {
    pub directive: BookingDirective,
    #[serde(default)]
    pub reference_id: Option<String>,
}
