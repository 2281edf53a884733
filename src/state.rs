use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::services::assistant::AssistantProvider;
use crate::services::geocoding::Geocoder;
use crate::services::places::NearbyPlacesClient;
use crate::services::tracking::{RouteClient, TrackingSession};
use crate::store::{ChangeSignal, StateStore};

pub struct AppState {
    pub store: Arc<dyn StateStore>,
    pub config: AppConfig,
    pub assistant: Box<dyn AssistantProvider>,
    pub geocoder: Box<dyn Geocoder>,
    pub places: NearbyPlacesClient,
    pub routes: RouteClient,
    /// Cross-view invalidation bus; handlers publish after each store write.
    pub events_tx: broadcast::Sender<ChangeSignal>,
    /// Live ride-tracking sessions by booking id. Inserting over an existing
    /// id drops (and thereby aborts) the old session.
    pub tracking: Mutex<HashMap<String, TrackingSession>>,
}
