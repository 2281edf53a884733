pub mod memory;
pub mod sqlite;

use serde::{Deserialize, Serialize};

use crate::models::{ActiveBooking, ChatMessage, ConfirmedBooking, Coordinate, ItineraryPlan};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persisted state keys. Every value is replaced whole on write; writers
/// publish the matching [`ChangeSignal`] so other views can resynchronize.
pub mod keys {
    pub const CONFIRMED_BOOKINGS: &str = "confirmed_bookings";
    pub const ACTIVE_BOOKING: &str = "active_booking";
    pub const CURRENT_ITINERARY: &str = "current_itinerary";
    pub const CHAT_HISTORY: &str = "chat_history";
    pub const CURRENT_USER_LOCATION: &str = "current_user_location";
}

/// Process-wide key-value persistence port. Components depend on this trait,
/// never on a concrete database, so tests can run against [`MemoryStore`].
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// Cross-view invalidation signal, broadcast after each store write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSignal {
    BookingsUpdated,
    ItineraryUpdated,
    ChatUpdated,
    LocationUpdated,
}

// ── Typed helpers over the raw key-value contract ──

pub fn load_bookings(store: &dyn StateStore) -> anyhow::Result<Vec<ConfirmedBooking>> {
    match store.get(keys::CONFIRMED_BOOKINGS)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

pub fn save_bookings(store: &dyn StateStore, bookings: &[ConfirmedBooking]) -> anyhow::Result<()> {
    store.set(keys::CONFIRMED_BOOKINGS, &serde_json::to_string(bookings)?)
}

pub fn load_active_booking(store: &dyn StateStore) -> anyhow::Result<Option<ActiveBooking>> {
    match store.get(keys::ACTIVE_BOOKING)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn save_active_booking(store: &dyn StateStore, active: &ActiveBooking) -> anyhow::Result<()> {
    store.set(keys::ACTIVE_BOOKING, &serde_json::to_string(active)?)
}

pub fn load_itinerary(store: &dyn StateStore) -> anyhow::Result<Option<ItineraryPlan>> {
    match store.get(keys::CURRENT_ITINERARY)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn save_itinerary(store: &dyn StateStore, plan: &ItineraryPlan) -> anyhow::Result<()> {
    store.set(keys::CURRENT_ITINERARY, &serde_json::to_string(plan)?)
}

pub fn load_transcript(store: &dyn StateStore) -> anyhow::Result<Vec<ChatMessage>> {
    match store.get(keys::CHAT_HISTORY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

pub fn save_transcript(store: &dyn StateStore, messages: &[ChatMessage]) -> anyhow::Result<()> {
    store.set(keys::CHAT_HISTORY, &serde_json::to_string(messages)?)
}

/// Last known device coordinate, stored as a bare `"lat, lng"` string.
pub fn last_known_location(store: &dyn StateStore) -> anyhow::Result<Option<Coordinate>> {
    Ok(store
        .get(keys::CURRENT_USER_LOCATION)?
        .and_then(|raw| Coordinate::parse_pair(&raw)))
}

pub fn save_location(store: &dyn StateStore, coords: &Coordinate) -> anyhow::Result<()> {
    store.set(keys::CURRENT_USER_LOCATION, &coords.to_string())
}
