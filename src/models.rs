//! Data models for parsed travel bookings
//!
//! This module contains the structures the parsing pipeline emits: the
//! draft travel event, its location, and the multi-event parse result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Title used whenever nothing better can be recovered from the email.
pub const DEFAULT_EVENT_TITLE: &str = "Travel Booking";

/// Booking category of a travel event.
///
/// Covers the normalized vocabulary plus `Custom` for free-form type
/// strings a parsing path chose not to normalize. A blank type string
/// always maps to `Other`, so the type is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    Flight,
    Hotel,
    Car,
    Restaurant,
    Activity,
    Train,
    Bus,
    Other,
    Custom(String),
}

impl EventType {
    /// Interpret a raw type string, mapping blank input to `Other` and
    /// preserving unknown non-empty strings as `Custom`.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Other;
        }
        match trimmed.to_lowercase().as_str() {
            "flight" => Self::Flight,
            "hotel" => Self::Hotel,
            "car" => Self::Car,
            "restaurant" => Self::Restaurant,
            "activity" => Self::Activity,
            "train" => Self::Train,
            "bus" => Self::Bus,
            "other" => Self::Other,
            _ => Self::Custom(trimmed.to_string()),
        }
    }

    /// String form of the type, always non-empty.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Flight => "flight",
            Self::Hotel => "hotel",
            Self::Car => "car",
            Self::Restaurant => "restaurant",
            Self::Activity => "activity",
            Self::Train => "train",
            Self::Bus => "bus",
            Self::Other => "other",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_raw(&raw))
    }
}

/// Place a travel event happens at. All fields are optional; a location
/// only needs to describe one place in some way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Street address or free-form address line
    pub address: Option<String>,
    /// City name
    pub city: Option<String>,
    /// Country name
    pub country: Option<String>,
    /// IATA-style airport code, when applicable
    pub airport: Option<String>,
    /// Latitude/longitude pair
    pub coordinates: Option<(f64, f64)>,
}

impl Location {
    /// Location carrying only an address line.
    #[must_use]
    pub fn from_address<S: Into<String>>(address: S) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }
}

/// Draft travel event produced by the parsing pipeline.
///
/// Drafts are created fresh per email and never mutated after being
/// returned; the persistence layer assigns durable identity downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelEvent {
    /// Booking category, never blank
    pub event_type: EventType,
    /// Human-readable title, never empty
    pub title: String,
    /// Start of the event's time window
    pub start_date_time: Option<DateTime<Utc>>,
    /// End of the event's time window
    pub end_date_time: Option<DateTime<Utc>>,
    /// Where the event takes place
    pub location: Option<Location>,
    /// Booking confirmation code
    pub confirmation_number: Option<String>,
    /// Company providing the service (airline, hotel chain, restaurant)
    pub provider: Option<String>,
    /// Auxiliary extracted fields; contents vary by booking category
    pub parsed_data: serde_json::Map<String, serde_json::Value>,
    /// How much the producing path trusts this event, in [0, 1]
    pub confidence: f64,
}

impl TravelEvent {
    /// New draft of the given category with a title and path confidence.
    /// The confidence is clamped into [0, 1]; a blank title falls back to
    /// the generic label.
    #[must_use]
    pub fn new<S: Into<String>>(event_type: EventType, title: S, confidence: f64) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            DEFAULT_EVENT_TITLE.to_string()
        } else {
            title
        };
        Self {
            event_type,
            title,
            start_date_time: None,
            end_date_time: None,
            location: None,
            confirmation_number: None,
            provider: None,
            parsed_data: serde_json::Map::new(),
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Outcome of parsing one email: zero or more draft events plus an
/// overall trust level and a short description of what happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    /// Extracted draft events, in message order (possibly empty)
    pub events: Vec<TravelEvent>,
    /// Overall confidence in [0, 1]
    pub confidence: f64,
    /// Non-empty description of the parse outcome
    pub summary: String,
}

/// Force a confidence value into [0, 1], treating NaN and other
/// non-finite values as the neutral 0.5 default.
#[must_use]
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_from_raw_known_values() {
        assert_eq!(EventType::from_raw("flight"), EventType::Flight);
        assert_eq!(EventType::from_raw("Hotel"), EventType::Hotel);
        assert_eq!(EventType::from_raw("  TRAIN  "), EventType::Train);
    }

    #[test]
    fn test_event_type_blank_defaults_to_other() {
        assert_eq!(EventType::from_raw(""), EventType::Other);
        assert_eq!(EventType::from_raw("   "), EventType::Other);
    }

    #[test]
    fn test_event_type_preserves_free_form_strings() {
        let t = EventType::from_raw("ferry crossing");
        assert_eq!(t, EventType::Custom("ferry crossing".to_string()));
        assert_eq!(t.as_str(), "ferry crossing");
    }

    #[test]
    fn test_event_type_serializes_as_lowercase_string() {
        let json = serde_json::to_string(&EventType::Flight).unwrap();
        assert_eq!(json, "\"flight\"");
        let back: EventType = serde_json::from_str("\"restaurant\"").unwrap();
        assert_eq!(back, EventType::Restaurant);
    }

    #[test]
    fn test_new_event_clamps_confidence() {
        let event = TravelEvent::new(EventType::Other, "Trip", 1.7);
        assert!((event.confidence - 1.0).abs() < f64::EPSILON);
        let event = TravelEvent::new(EventType::Other, "Trip", -0.2);
        assert!(event.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_event_defaults_blank_title() {
        let event = TravelEvent::new(EventType::Hotel, "  ", 0.8);
        assert_eq!(event.title, DEFAULT_EVENT_TITLE);
    }

    #[test]
    fn test_clamp_confidence_handles_nan() {
        assert!((clamp_confidence(f64::NAN) - 0.5).abs() < f64::EPSILON);
        assert!((clamp_confidence(f64::INFINITY) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_location_from_address() {
        let loc = Location::from_address("123 Main Street, Springfield 12345");
        assert_eq!(
            loc.address.as_deref(),
            Some("123 Main Street, Springfield 12345")
        );
        assert!(loc.city.is_none());
        assert!(loc.airport.is_none());
    }
}
