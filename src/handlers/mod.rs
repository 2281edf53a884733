pub mod booking;
pub mod chat;
pub mod events;
pub mod health;
pub mod itinerary;
pub mod location;
pub mod places;
pub mod tracking;
