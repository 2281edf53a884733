use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::routing::{delete, get, post};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use concierge::config::AppConfig;
use concierge::handlers;
use concierge::services::assistant::nvidia::NvidiaProvider;
use concierge::services::geocoding::NominatimGeocoder;
use concierge::services::places::NearbyPlacesClient;
use concierge::services::tracking::RouteClient;
use concierge::state::AppState;
use concierge::store::sqlite::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    anyhow::ensure!(
        !config.nvidia_api_key.is_empty(),
        "NVIDIA_API_KEY must be set"
    );

    let store = SqliteStore::open(&config.database_url)?;
    tracing::info!("state store ready at {}", config.database_url);

    let assistant = NvidiaProvider::new(
        config.nvidia_api_key.clone(),
        config.nvidia_model.clone(),
        config.nvidia_base_url.clone(),
    );
    tracing::info!("assistant model: {}", config.nvidia_model);

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        store: Arc::new(store),
        assistant: Box::new(assistant),
        geocoder: Box::new(NominatimGeocoder::new(config.nominatim_url.clone())),
        places: NearbyPlacesClient::new(config.overpass_mirrors.clone()),
        routes: RouteClient::new(config.osrm_url.clone()),
        events_tx,
        tracking: Mutex::new(HashMap::new()),
        config,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/chat/message", post(handlers::chat::send_message))
        .route("/api/chat/reset", post(handlers::chat::reset))
        .route("/api/chat/history", get(handlers::chat::history))
        .route("/api/location", post(handlers::location::update))
        .route("/api/booking/confirm", post(handlers::booking::confirm))
        .route("/api/bookings", get(handlers::booking::list))
        .route("/api/bookings/:id", delete(handlers::booking::remove))
        .route("/api/places/nearby", get(handlers::places::nearby))
        .route(
            "/api/itinerary",
            get(handlers::itinerary::current).delete(handlers::itinerary::clear),
        )
        .route(
            "/api/tracking/:booking_id/start",
            post(handlers::tracking::start),
        )
        .route(
            "/api/tracking/:booking_id/events",
            get(handlers::tracking::events),
        )
        .route(
            "/api/tracking/:booking_id/stop",
            post(handlers::tracking::stop),
        )
        .route("/api/events", get(handlers::events::stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    let addr = format!("0.0.0.0:{}", state.config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
