//! Free-text place resolution, with live-location sentinel handling.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::models::Coordinate;
use crate::store::{self, StateStore};

/// Marker substrings the assistant uses in place of a real address when it
/// wants the live device position.
const LIVE_LOCATION_MARKERS: [&str; 3] = ["Current Location", "Live GPS", "[SYSTEM DATA]"];

/// True when `raw` is a live-location sentinel: any marker substring, or a
/// bare `"lat, lng"` numeric pair.
pub fn is_live_location(raw: &str) -> bool {
    LIVE_LOCATION_MARKERS.iter().any(|m| raw.contains(m))
        || Coordinate::parse_pair(raw.trim()).is_some()
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Single best-match lookup; `None` when the place is unknown.
    async fn lookup(&self, query: &str) -> anyhow::Result<Option<Coordinate>>;
}

/// Resolves a pickup/dropoff string to coordinates. Sentinels read the last
/// known device coordinate from the store and never hit the network; a
/// missing device coordinate is a resolution failure, not an error. Remote
/// lookup failures likewise degrade to `None`.
pub async fn resolve_location(
    geocoder: &dyn Geocoder,
    store: &dyn StateStore,
    raw: &str,
) -> Option<Coordinate> {
    if is_live_location(raw) {
        return match store::last_known_location(store) {
            Ok(coords) => coords,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read last known location");
                None
            }
        };
    }

    match geocoder.lookup(raw).await {
        Ok(coords) => coords,
        Err(e) => {
            tracing::warn!(place = %raw, error = %e, "geocoding failed");
            None
        }
    }
}

#[derive(Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, query: &str) -> anyhow::Result<Option<Coordinate>> {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC);
        let url = format!("{}/search?q={}&format=json&limit=1", self.base_url, encoded);

        let hits: Vec<NominatimHit> = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, "concierge/0.1")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let lat: f64 = hit.lat.parse()?;
        let lng: f64 = hit.lon.parse()?;
        Ok(Some(Coordinate::new(lat, lng)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct FixedGeocoder(Option<Coordinate>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn lookup(&self, _query: &str) -> anyhow::Result<Option<Coordinate>> {
            Ok(self.0)
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl Geocoder for FailingGeocoder {
        async fn lookup(&self, _query: &str) -> anyhow::Result<Option<Coordinate>> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn test_sentinel_detection() {
        assert!(is_live_location("Current Location (Live GPS)"));
        assert!(is_live_location("[SYSTEM DATA] 13.7, 100.5"));
        assert!(is_live_location("13.75, 100.50"));
        assert!(is_live_location("-12.5,44.1"));
        assert!(!is_live_location("Grand Palace, Bangkok"));
        assert!(!is_live_location("Location Street 5"));
    }

    #[tokio::test]
    async fn test_sentinel_resolves_from_store() {
        let store = MemoryStore::new();
        store::save_location(&store, &Coordinate::new(13.75, 100.50)).unwrap();

        // The geocoder would return something else; it must not be consulted.
        let geocoder = FixedGeocoder(Some(Coordinate::new(0.0, 0.0)));
        let coords = resolve_location(&geocoder, &store, "Current Location (Live GPS)").await;
        assert_eq!(coords, Some(Coordinate::new(13.75, 100.50)));
    }

    #[tokio::test]
    async fn test_sentinel_without_known_location_fails_softly() {
        let store = MemoryStore::new();
        let geocoder = FixedGeocoder(Some(Coordinate::new(0.0, 0.0)));
        let coords = resolve_location(&geocoder, &store, "Live GPS").await;
        assert_eq!(coords, None);
    }

    #[tokio::test]
    async fn test_plain_name_uses_geocoder() {
        let store = MemoryStore::new();
        let geocoder = FixedGeocoder(Some(Coordinate::new(13.75, 100.49)));
        let coords = resolve_location(&geocoder, &store, "Grand Palace").await;
        assert_eq!(coords, Some(Coordinate::new(13.75, 100.49)));
    }

    #[tokio::test]
    async fn test_lookup_error_degrades_to_none() {
        let store = MemoryStore::new();
        let coords = resolve_location(&FailingGeocoder, &store, "Grand Palace").await;
        assert_eq!(coords, None);
    }
}
