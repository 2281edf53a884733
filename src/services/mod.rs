pub mod assistant;
pub mod booking;
pub mod directives;
pub mod geocoding;
pub mod places;
pub mod tracking;
