//! Validation and normalization of assisted-extractor payloads
//!
//! The extractor's output is untrusted: fields can be missing, blank, or
//! the wrong type. `normalize` is a total function from any raw payload
//! to a `ParseResult` that satisfies every data-model invariant; nothing
//! in here can fail.

use crate::models::{
    DEFAULT_EVENT_TITLE, EventType, Location, ParseResult, TravelEvent, clamp_confidence,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Default summary when the extractor did not supply one.
const DEFAULT_SUMMARY: &str = "Travel booking information extracted";
/// Neutral confidence used when the payload's confidence is absent or
/// not a number.
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Raw multi-event payload as the assisted extractor claims it.
/// Every field is optional so any JSON object deserializes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAssistedResult {
    pub events: Option<Vec<RawAssistedEvent>>,
    /// Kept as a raw value: extractors have been seen returning strings
    /// or null here
    pub confidence: Option<Value>,
    pub summary: Option<String>,
}

/// Raw single event from the assisted extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAssistedEvent {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub title: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub location: Option<RawLocation>,
    pub confirmation_number: Option<String>,
    pub provider: Option<String>,
    pub details: Option<serde_json::Map<String, Value>>,
}

/// Raw location payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub airport: Option<String>,
    pub coordinates: Option<Vec<f64>>,
}

/// Normalize a raw assisted payload into a valid `ParseResult`.
///
/// Missing events become an empty sequence, blank types/titles are
/// defaulted, unparsable date strings are dropped rather than kept as
/// garbage, and confidence is coerced into [0, 1].
#[must_use]
pub fn normalize(raw: RawAssistedResult) -> ParseResult {
    let summary = raw
        .summary
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

    let confidence = coerce_confidence(raw.confidence.as_ref());

    let events = raw
        .events
        .unwrap_or_default()
        .into_iter()
        .map(|event| normalize_event(event, confidence, &summary))
        .collect();

    ParseResult {
        events,
        confidence,
        summary,
    }
}

fn normalize_event(raw: RawAssistedEvent, confidence: f64, summary: &str) -> TravelEvent {
    let event_type = EventType::from_raw(raw.event_type.as_deref().unwrap_or(""));
    let title = raw
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EVENT_TITLE.to_string());

    let mut event = TravelEvent::new(event_type, title, confidence);
    event.start_date_time = raw.start_date_time.as_deref().and_then(parse_instant);
    event.end_date_time = raw.end_date_time.as_deref().and_then(parse_instant);
    event.location = raw.location.map(normalize_location);
    event.confirmation_number = raw.confirmation_number.filter(|c| !c.trim().is_empty());
    event.provider = raw.provider.filter(|p| !p.trim().is_empty());

    event.parsed_data = raw.details.unwrap_or_default();
    event
        .parsed_data
        .insert("aiSummary".to_string(), Value::String(summary.to_string()));

    event
}

fn normalize_location(raw: RawLocation) -> Location {
    let coordinates = raw.coordinates.and_then(|c| {
        if c.len() >= 2 {
            Some((c[0], c[1]))
        } else {
            None
        }
    });
    Location {
        address: raw.address.filter(|s| !s.trim().is_empty()),
        city: raw.city.filter(|s| !s.trim().is_empty()),
        country: raw.country.filter(|s| !s.trim().is_empty()),
        airport: raw.airport.filter(|s| !s.trim().is_empty()),
        coordinates,
    }
}

/// Parse an assisted date string into a calendar instant; `None` drops
/// the field entirely.
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn coerce_confidence(raw: Option<&Value>) -> f64 {
    match raw.and_then(Value::as_f64) {
        Some(value) => clamp_confidence(value),
        None => DEFAULT_CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_empty_payload() {
        let result = normalize(RawAssistedResult::default());
        assert!(result.events.is_empty());
        assert!((result.confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(result.summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_normalize_missing_events_array_becomes_empty() {
        let raw: RawAssistedResult =
            serde_json::from_str(r#"{"confidence": 0.9, "summary": "two flights"}"#).unwrap();
        let result = normalize(raw);
        assert!(result.events.is_empty());
        assert_eq!(result.summary, "two flights");
    }

    #[test]
    fn test_normalize_drops_invalid_date_strings() {
        let raw: RawAssistedResult = serde_json::from_str(
            r#"{
                "events": [{
                    "type": "flight",
                    "title": "SFO hop",
                    "startDateTime": "not-a-date",
                    "endDateTime": "2025-06-01T10:00:00Z"
                }],
                "confidence": 0.9,
                "summary": "one flight"
            }"#,
        )
        .unwrap();
        let result = normalize(raw);
        let event = &result.events[0];
        assert!(event.start_date_time.is_none());
        assert!(event.end_date_time.is_some());
    }

    #[test]
    fn test_normalize_defaults_blank_type_and_title() {
        let raw: RawAssistedResult = serde_json::from_str(
            r#"{"events": [{"type": "", "title": "  "}], "confidence": 0.7, "summary": "s"}"#,
        )
        .unwrap();
        let event = &normalize(raw).events[0];
        assert_eq!(event.event_type, EventType::Other);
        assert_eq!(event.title, DEFAULT_EVENT_TITLE);
    }

    #[test]
    fn test_normalize_clamps_out_of_range_confidence() {
        let raw: RawAssistedResult =
            serde_json::from_str(r#"{"events": [], "confidence": 3.5, "summary": "s"}"#).unwrap();
        assert!((normalize(raw).confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_defaults_non_numeric_confidence() {
        let raw: RawAssistedResult =
            serde_json::from_str(r#"{"events": [], "confidence": "high", "summary": "s"}"#)
                .unwrap();
        assert!((normalize(raw).confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_merges_details_and_records_summary() {
        let raw: RawAssistedResult = serde_json::from_str(
            r#"{
                "events": [{
                    "type": "hotel",
                    "title": "Two nights downtown",
                    "details": {"roomType": "double", "guests": 2}
                }],
                "confidence": 0.85,
                "summary": "hotel stay"
            }"#,
        )
        .unwrap();
        let event = &normalize(raw).events[0];
        assert_eq!(event.parsed_data["roomType"], "double");
        assert_eq!(event.parsed_data["guests"], 2);
        assert_eq!(event.parsed_data["aiSummary"], "hotel stay");
    }

    #[test]
    fn test_normalize_location_coordinates() {
        let raw: RawAssistedResult = serde_json::from_str(
            r#"{
                "events": [{
                    "type": "flight",
                    "title": "t",
                    "location": {"city": "Paris", "coordinates": [48.85, 2.35]}
                }],
                "confidence": 0.9,
                "summary": "s"
            }"#,
        )
        .unwrap();
        let event = &normalize(raw).events[0];
        let location = event.location.as_ref().unwrap();
        assert_eq!(location.city.as_deref(), Some("Paris"));
        assert_eq!(location.coordinates, Some((48.85, 2.35)));
    }

    #[test]
    fn test_parse_instant_accepts_common_shapes() {
        assert!(parse_instant("2025-06-01T10:00:00Z").is_some());
        assert!(parse_instant("2025-06-01T10:00:00+02:00").is_some());
        assert!(parse_instant("2025-06-01 10:00:00").is_some());
        assert!(parse_instant("2025-06-01").is_some());
        assert!(parse_instant("tomorrow-ish").is_none());
        assert!(parse_instant("").is_none());
    }

    #[test]
    fn test_per_event_confidence_matches_overall() {
        let raw: RawAssistedResult = serde_json::from_str(
            r#"{"events": [{"type": "flight", "title": "t"}], "confidence": 0.42, "summary": "s"}"#,
        )
        .unwrap();
        let result = normalize(raw);
        assert!((result.events[0].confidence - 0.42).abs() < f64::EPSILON);
    }
}
