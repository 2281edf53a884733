//! Extraction of structured directive blocks from free-form assistant text.
//!
//! The assistant embeds up to three JSON control-blocks in an otherwise
//! conversational reply. Extraction is best-effort and never fatal: a missing
//! tag or malformed payload yields "no directive" and leaves the text alone.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{BookingDirective, ItineraryPlan, Recommendation};

static RECOMMENDATIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\[RECOMMENDATIONS:\s*(\[.*?\])\]").unwrap());

static BOOKING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\[BOOKING_STATE:\s*(\{.*?\})\]").unwrap());

const ITINERARY_MARKER: &str = "[ITINERARY_PLAN:";

#[derive(Debug, Default)]
pub struct ExtractedReply {
    pub clean_text: String,
    pub recommendations: Vec<Recommendation>,
    pub booking: Option<BookingDirective>,
    pub itinerary: Option<ItineraryPlan>,
}

/// Scans assistant text for the three directive blocks, in a fixed order
/// (recommendations, booking, itinerary) against successively cleaned text,
/// so an earlier stripped block cannot interfere with a later scan.
pub fn extract(raw: &str) -> ExtractedReply {
    let (text, recommendations) = parse_recommendations(raw);
    let (text, booking) = parse_booking_state(&text);
    let (text, itinerary) = parse_itinerary_plan(&text);

    ExtractedReply {
        clean_text: text,
        recommendations,
        booking,
        itinerary,
    }
}

fn parse_recommendations(text: &str) -> (String, Vec<Recommendation>) {
    if let Some(caps) = RECOMMENDATIONS_RE.captures(text) {
        let full = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let json = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        match serde_json::from_str::<Vec<Recommendation>>(json) {
            Ok(recs) => return (text.replacen(full, "", 1).trim().to_string(), recs),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparseable RECOMMENDATIONS block");
            }
        }
    }
    (text.to_string(), Vec::new())
}

fn parse_booking_state(text: &str) -> (String, Option<BookingDirective>) {
    if let Some(caps) = BOOKING_RE.captures(text) {
        let full = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let json = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        match serde_json::from_str::<BookingDirective>(json) {
            Ok(directive) => {
                return (text.replacen(full, "", 1).trim().to_string(), Some(directive))
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparseable BOOKING_STATE block");
            }
        }
    }
    (text.to_string(), None)
}

/// The itinerary payload nests objects and arrays to arbitrary depth, so a
/// non-greedy regex cannot find its end. Instead, walk forward from the first
/// `{` after the marker with a single depth counter over `{`/`[` and `}`/`]`;
/// the payload ends where the counter returns to zero.
fn parse_itinerary_plan(text: &str) -> (String, Option<ItineraryPlan>) {
    let Some(marker_idx) = text.find(ITINERARY_MARKER) else {
        return (text.to_string(), None);
    };
    let after_marker = marker_idx + ITINERARY_MARKER.len();
    let Some(brace_start) = text[after_marker..].find('{').map(|i| after_marker + i) else {
        return (text.to_string(), None);
    };

    let mut depth = 0usize;
    let mut brace_end = None;
    for (i, ch) in text[brace_start..].char_indices() {
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    brace_end = Some(brace_start + i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(brace_end) = brace_end else {
        // Truncated payload: nothing stripped, directive absent.
        return (text.to_string(), None);
    };

    let json = &text[brace_start..=brace_end];

    // The full tag runs from the marker through the next `]` after the payload.
    let Some(tag_end) = text[brace_end..].find(']').map(|i| brace_end + i) else {
        return (text.to_string(), None);
    };
    let full_tag = &text[marker_idx..=tag_end];

    match serde_json::from_str::<ItineraryPlan>(json) {
        Ok(plan) => (text.replacen(full_tag, "", 1).trim().to_string(), Some(plan)),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unparseable ITINERARY_PLAN block");
            (text.to_string(), None)
        }
    }
}
