//! Nearby restaurant/hotel discovery against a ranked list of Overpass
//! mirrors, with per-mirror timeout and failover.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Coordinate, Place, PlaceKind};

/// Search radius around the query point, in metres.
const SEARCH_RADIUS_M: u32 = 5000;
/// Results are truncated to this many after sorting by distance.
const MAX_RESULTS: usize = 20;
/// Per-mirror request timeout.
const MIRROR_TIMEOUT: Duration = Duration::from_secs(15);

pub const DEFAULT_MIRRORS: [&str; 3] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter",
];

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

pub struct NearbyPlacesClient {
    client: reqwest::Client,
    mirrors: Vec<String>,
    timeout: Duration,
}

impl NearbyPlacesClient {
    pub fn new(mirrors: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            mirrors,
            timeout: MIRROR_TIMEOUT,
        }
    }

    /// Overrides the per-mirror timeout (tests use a short one).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Queries each mirror in order until one returns a parseable 2xx body,
    /// then normalizes and ranks that mirror's elements. Partial results are
    /// never merged across mirrors; exhausting the list is a single error.
    pub async fn nearby(&self, center: Coordinate) -> Result<Vec<Place>, AppError> {
        let query = overpass_query(center);

        for mirror in &self.mirrors {
            match self.query_mirror(mirror, &query).await {
                Ok(response) => {
                    tracing::debug!(mirror = %mirror, count = response.elements.len(), "overpass query succeeded");
                    return Ok(normalize(response.elements, center));
                }
                Err(e) => {
                    tracing::warn!(mirror = %mirror, error = %e, "overpass mirror failed, trying next");
                }
            }
        }

        Err(AppError::Discovery(
            "could not fetch nearby places from any mirror".to_string(),
        ))
    }

    async fn query_mirror(&self, mirror: &str, query: &str) -> anyhow::Result<OverpassResponse> {
        let response = self
            .client
            .post(mirror)
            .form(&[("data", query)])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<OverpassResponse>()
            .await?;
        Ok(response)
    }
}

/// Overpass QL for named eateries and lodgings within the search radius.
fn overpass_query(center: Coordinate) -> String {
    let Coordinate { lat, lng } = center;
    let r = SEARCH_RADIUS_M;
    format!(
        "[out:json][timeout:25];(\
         node[\"amenity\"=\"restaurant\"](around:{r},{lat},{lng});\
         node[\"amenity\"=\"cafe\"](around:{r},{lat},{lng});\
         node[\"amenity\"=\"fast_food\"](around:{r},{lat},{lng});\
         node[\"tourism\"=\"hotel\"](around:{r},{lat},{lng});\
         node[\"tourism\"=\"guest_house\"](around:{r},{lat},{lng});\
         way[\"amenity\"=\"restaurant\"](around:{r},{lat},{lng});\
         way[\"tourism\"=\"hotel\"](around:{r},{lat},{lng});\
         );out center 30;"
    )
}

fn normalize(elements: Vec<OverpassElement>, center: Coordinate) -> Vec<Place> {
    let mut places: Vec<Place> = elements
        .into_iter()
        .filter_map(|e| {
            let name = e.tags.get("name")?.clone();

            // Nodes carry their own lat/lon; ways only a centroid.
            let coords = match (e.lat, e.lon) {
                (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
                _ => e
                    .center
                    .as_ref()
                    .map(|c| Coordinate::new(c.lat, c.lon))
                    .unwrap_or(center),
            };

            let tourism = e.tags.get("tourism").map(String::as_str).unwrap_or("");
            let kind = if tourism == "hotel" || tourism == "guest_house" {
                PlaceKind::Hotel
            } else {
                PlaceKind::Restaurant
            };

            Some(Place {
                id: e.id,
                name,
                coords,
                kind,
                cuisine: e.tags.get("cuisine").cloned(),
                stars: e.tags.get("stars").cloned(),
                phone: e
                    .tags
                    .get("phone")
                    .or_else(|| e.tags.get("contact:phone"))
                    .cloned(),
                website: e
                    .tags
                    .get("website")
                    .or_else(|| e.tags.get("contact:website"))
                    .cloned(),
                price_range: guess_price(&e.tags, kind),
                distance_km: center.haversine_km(&coords),
            })
        })
        .collect();

    // Stable sort keeps the mirror's original order for equal distances.
    places.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
    places.truncate(MAX_RESULTS);
    places
}

/// Price label from explicit tags when present, else guessed from the star
/// rating (hotels) or cuisine (restaurants).
fn guess_price(tags: &HashMap<String, String>, kind: PlaceKind) -> String {
    if let Some(range) = tags.get("price_range") {
        let label = match range.as_str() {
            "1" => "₹ Budget",
            "2" => "₹₹ Mid-range",
            "3" => "₹₹₹ Premium",
            "4" => "₹₹₹₹ Luxury",
            other => other,
        };
        return label.to_string();
    }

    if kind == PlaceKind::Hotel {
        let stars: u32 = tags
            .get("stars")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        return match stars {
            5.. => "₹₹₹₹ Luxury (₹15,000+/night)",
            4 => "₹₹₹ Premium (₹5,000–15,000/night)",
            3 => "₹₹ Mid-range (₹2,000–5,000/night)",
            _ => "₹ Budget (Under ₹2,000/night)",
        }
        .to_string();
    }

    let cuisine = tags
        .get("cuisine")
        .map(|c| c.to_lowercase())
        .unwrap_or_default();
    if cuisine.contains("fast_food") || cuisine.contains("pizza") {
        "₹ Budget (₹100–300)".to_string()
    } else if cuisine.contains("indian") || cuisine.contains("chinese") {
        "₹₹ Mid-range (₹300–800)".to_string()
    } else {
        "₹₹ Mid-range (₹400–1,200)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: i64, name: &str, lat: f64, lon: f64, tags: &[(&str, &str)]) -> OverpassElement {
        let mut map: HashMap<String, String> = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.insert("name".to_string(), name.to_string());
        OverpassElement {
            id,
            lat: Some(lat),
            lon: Some(lon),
            center: None,
            tags: map,
        }
    }

    #[test]
    fn test_unnamed_elements_are_dropped() {
        let center = Coordinate::new(13.75, 100.50);
        let unnamed = OverpassElement {
            id: 1,
            lat: Some(13.75),
            lon: Some(100.50),
            center: None,
            tags: HashMap::new(),
        };
        let named = element(2, "Som Tam Corner", 13.751, 100.501, &[("amenity", "restaurant")]);
        let places = normalize(vec![unnamed, named], center);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Som Tam Corner");
    }

    #[test]
    fn test_way_uses_centroid() {
        let center = Coordinate::new(13.75, 100.50);
        let mut tags = HashMap::new();
        tags.insert("name".to_string(), "Riverside Hotel".to_string());
        tags.insert("tourism".to_string(), "hotel".to_string());
        let way = OverpassElement {
            id: 7,
            lat: None,
            lon: None,
            center: Some(OverpassCenter {
                lat: 13.76,
                lon: 100.51,
            }),
            tags,
        };
        let places = normalize(vec![way], center);
        assert_eq!(places[0].kind, PlaceKind::Hotel);
        assert_eq!(places[0].coords, Coordinate::new(13.76, 100.51));
        assert!(places[0].distance_km > 0.0);
    }

    #[test]
    fn test_sorted_ascending_and_truncated_to_20() {
        let center = Coordinate::new(13.75, 100.50);
        // 25 restaurants at strictly increasing distances, inserted farthest
        // first so the sort has to do real work.
        let elements: Vec<OverpassElement> = (0..25)
            .rev()
            .map(|i| {
                element(
                    i,
                    &format!("Place {i}"),
                    13.75 + (i as f64 + 1.0) * 0.001,
                    100.50,
                    &[("amenity", "restaurant")],
                )
            })
            .collect();
        let places = normalize(elements, center);
        assert_eq!(places.len(), 20);
        for pair in places.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
        assert_eq!(places[0].name, "Place 0");
    }

    #[test]
    fn test_guest_house_counts_as_hotel() {
        let center = Coordinate::new(13.75, 100.50);
        let gh = element(1, "Mama's", 13.751, 100.5, &[("tourism", "guest_house")]);
        let cafe = element(2, "Bean There", 13.752, 100.5, &[("amenity", "cafe")]);
        let places = normalize(vec![gh, cafe], center);
        assert_eq!(places[0].kind, PlaceKind::Hotel);
        assert_eq!(places[1].kind, PlaceKind::Restaurant);
    }

    #[test]
    fn test_price_from_explicit_tag_wins() {
        let mut tags = HashMap::new();
        tags.insert("price_range".to_string(), "4".to_string());
        tags.insert("stars".to_string(), "2".to_string());
        assert_eq!(guess_price(&tags, PlaceKind::Hotel), "₹₹₹₹ Luxury");
    }

    #[test]
    fn test_price_from_hotel_stars() {
        let mut tags = HashMap::new();
        tags.insert("stars".to_string(), "5".to_string());
        assert!(guess_price(&tags, PlaceKind::Hotel).contains("Luxury"));
        tags.insert("stars".to_string(), "3".to_string());
        assert!(guess_price(&tags, PlaceKind::Hotel).contains("Mid-range"));
        tags.remove("stars");
        assert!(guess_price(&tags, PlaceKind::Hotel).contains("Budget"));
    }

    #[test]
    fn test_price_from_cuisine() {
        let mut tags = HashMap::new();
        tags.insert("cuisine".to_string(), "pizza".to_string());
        assert!(guess_price(&tags, PlaceKind::Restaurant).contains("Budget"));
        tags.insert("cuisine".to_string(), "indian".to_string());
        assert!(guess_price(&tags, PlaceKind::Restaurant).contains("₹300–800"));
        tags.remove("cuisine");
        assert!(guess_price(&tags, PlaceKind::Restaurant).contains("₹400–1,200"));
    }

    #[test]
    fn test_overpass_query_mentions_all_categories() {
        let q = overpass_query(Coordinate::new(13.75, 100.50));
        for needle in ["restaurant", "cafe", "fast_food", "hotel", "guest_house"] {
            assert!(q.contains(needle), "query missing {needle}");
        }
        assert!(q.contains("around:5000,13.75,100.5"));
        assert!(q.contains("out center 30"));
    }
}
