use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// A place suggestion embedded in an assistant reply via the
/// `[RECOMMENDATIONS: ...]` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub price: String,
}

impl Recommendation {
    /// The image gallery to display: the model-provided list when non-empty,
    /// otherwise a single synthesized stock-photo URL from name + category.
    pub fn gallery(&self) -> Vec<String> {
        if !self.images.is_empty() {
            return self.images.clone();
        }
        if self.image_url.starts_with("http") {
            return vec![self.image_url.clone()];
        }
        let query = format!("{} {} travel", self.name, self.category);
        let encoded = utf8_percent_encode(&query, NON_ALPHANUMERIC).to_string();
        vec![format!("https://source.unsplash.com/400x300/?{encoded}")]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[serde(alias = "gathering_info")]
    Gathering,
    Ready,
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Gathering => "gathering",
            BookingStatus::Ready => "ready",
            BookingStatus::Confirmed => "confirmed",
        }
    }
}

/// In-progress booking intent emitted by the assistant via the
/// `[BOOKING_STATE: ...]` tag. Each new directive fully replaces the
/// previous one; there is no merging of fields across turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDirective {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pickup: Option<String>,
    #[serde(default)]
    pub dropoff: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    pub status: BookingStatus,
}

impl BookingDirective {
    pub fn is_ride_hailing(&self) -> bool {
        self.kind.eq_ignore_ascii_case("taxi")
    }
}
