//! The ready → confirmed booking transition.
//!
//! Everything before "confirmed" is driven by the assistant (each new
//! directive simply replaces the draft); confirmation is the one transition
//! owned locally: resolve endpoints, persist the record, ring the bus.

use tokio::sync::broadcast;

use crate::errors::AppError;
use crate::models::{ActiveBooking, BookingStatus, ConfirmedBooking, Coordinate};
use crate::services::geocoding::{resolve_location, Geocoder};
use crate::store::{self, ChangeSignal, StateStore};

/// The persisted list keeps only this many bookings, newest first.
pub const MAX_CONFIRMED_BOOKINGS: usize = 10;

#[derive(Debug)]
pub struct ConfirmationOutcome {
    pub reference_id: String,
    /// Present only when both endpoints resolved and a record was persisted;
    /// absent for non-ride bookings and for the degraded path.
    pub booking: Option<ConfirmedBooking>,
    pub already_confirmed: bool,
}

/// Confirms the active booking draft. Idempotent: once confirmed, further
/// calls return the same reference id and change nothing.
pub async fn confirm(
    store: &dyn StateStore,
    geocoder: &dyn Geocoder,
    events: &broadcast::Sender<ChangeSignal>,
) -> Result<ConfirmationOutcome, AppError> {
    let Some(mut active) = store::load_active_booking(store)? else {
        return Err(AppError::NotFound("no active booking to confirm".to_string()));
    };

    if active.directive.status == BookingStatus::Confirmed {
        let reference_id = active
            .reference_id
            .unwrap_or_else(|| "BK-UNKNOWN".to_string());
        return Ok(ConfirmationOutcome {
            reference_id,
            booking: None,
            already_confirmed: true,
        });
    }

    let reference_id = new_reference_id();
    active.directive.status = BookingStatus::Confirmed;
    active.reference_id = Some(reference_id.clone());
    store::save_active_booking(store, &active)?;

    tracing::info!(reference_id = %reference_id, kind = %active.directive.kind, "booking confirmed");

    // Only ride bookings with both endpoints get a tracked record.
    let directive = &active.directive;
    let (Some(pickup), Some(dropoff)) = (directive.pickup.clone(), directive.dropoff.clone())
    else {
        return Ok(ConfirmationOutcome {
            reference_id,
            booking: None,
            already_confirmed: false,
        });
    };
    if !directive.is_ride_hailing() {
        return Ok(ConfirmationOutcome {
            reference_id,
            booking: None,
            already_confirmed: false,
        });
    }

    // Pickup resolves first; its failure still lets the dropoff lookup run.
    let start = resolve_location(geocoder, store, &pickup).await;
    let end = resolve_location(geocoder, store, &dropoff).await;

    let (Some(start), Some(end)) = (start, end) else {
        // Degraded success: the booking stays confirmed, but with no
        // coordinates there is no record and no live tracking for it.
        tracing::warn!(
            reference_id = %reference_id,
            pickup = %pickup,
            dropoff = %dropoff,
            "could not resolve both endpoints, booking confirmed without tracking"
        );
        return Ok(ConfirmationOutcome {
            reference_id,
            booking: None,
            already_confirmed: false,
        });
    };

    let booking = build_record(directive.kind.clone(), pickup, dropoff, directive.time.clone(), start, end);

    let mut bookings = store::load_bookings(store)?;
    bookings.insert(0, booking.clone());
    bookings.truncate(MAX_CONFIRMED_BOOKINGS);
    store::save_bookings(store, &bookings)?;

    // Other views resynchronize off this; no subscriber is fine.
    let _ = events.send(ChangeSignal::BookingsUpdated);

    Ok(ConfirmationOutcome {
        reference_id,
        booking: Some(booking),
        already_confirmed: false,
    })
}

fn new_reference_id() -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("BK-{}", token[..8].to_uppercase())
}

fn build_record(
    kind: String,
    pickup: String,
    dropoff: String,
    time: Option<String>,
    start: Coordinate,
    end: Coordinate,
) -> ConfirmedBooking {
    ConfirmedBooking {
        id: chrono::Utc::now().timestamp_millis().to_string(),
        kind,
        pickup,
        dropoff,
        time: time.unwrap_or_else(|| "Now".to_string()),
        confirmed_at: chrono::Utc::now().to_rfc3339(),
        start_coords: start,
        end_coords: end,
    }
}

/// Removes one confirmed booking by id, signalling the bus on change.
pub fn remove_booking(
    store: &dyn StateStore,
    events: &broadcast::Sender<ChangeSignal>,
    id: &str,
) -> Result<bool, AppError> {
    let mut bookings = store::load_bookings(store)?;
    let before = bookings.len();
    bookings.retain(|b| b.id != id);
    if bookings.len() == before {
        return Ok(false);
    }
    store::save_bookings(store, &bookings)?;
    let _ = events.send(ChangeSignal::BookingsUpdated);
    Ok(true)
}
