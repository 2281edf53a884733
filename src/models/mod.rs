pub mod booking;
pub mod chat;
pub mod directive;
pub mod geo;
pub mod itinerary;
pub mod place;

pub use booking::{ActiveBooking, ConfirmedBooking};
pub use chat::ChatMessage;
pub use directive::{BookingDirective, BookingStatus, Recommendation};
pub use geo::Coordinate;
pub use itinerary::{DayPlan, ItineraryItem, ItineraryPlan};
pub use place::{Place, PlaceKind};
