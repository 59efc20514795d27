//! Field extractors for booking emails
//!
//! Each extractor is a pure function over raw text returning an optional
//! value. They are independent of each other and of evaluation order, so
//! the parser strategies can invoke any subset. All regexes are compiled
//! once into `LazyLock` statics.

use crate::models::{DEFAULT_EVENT_TITLE, Location};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static CONFIRMATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)confirmation\s*(?:number|code|#)?\s*:?\s*([A-Z0-9]{6,})",
        r"(?i)booking\s*(?:reference|number|code|#)?\s*:?\s*([A-Z0-9]{6,})",
        r"(?i)reference\s*(?:number|code|#)?\s*:?\s*([A-Z0-9]{6,})",
        r"(?i)record\s*locator\s*:?\s*([A-Z0-9]{6,})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("confirmation pattern"))
    .collect()
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b\d{1,2}/\d{1,2}/\d{4}\b",
        r"\b\d{4}-\d{2}-\d{2}\b",
        r"(?i)\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2},?\s+\d{4}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("date pattern"))
    .collect()
});

static ADDRESS_LABEL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)address\s*:?\s*([^\r\n]+)",
        r"(?i)location\s*:?\s*([^\r\n]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("address label pattern"))
    .collect()
});

static STREET_ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d+\s+[A-Za-z\s]+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd)[A-Za-z\s,]*\d{5}",
    )
    .expect("street address pattern")
});

static PROVIDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)from\s*:?\s*([^\r\n<]+)").expect("provider pattern"));

static FLIGHT_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)flight\s*(?:number|#)?\s*:?\s*([A-Z]{2}\d+)").expect("flight number pattern")
});

static AIRPORT_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{3}\b").expect("airport code pattern"));

static CLOCK_TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,2}:\d{2}\s*(?:AM|PM)?\b").expect("clock time pattern")
});

static RESTAURANT_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:reservation\s+at|table\s+at)\s+([A-Za-z\s]+)").expect("restaurant pattern")
});

static PARTY_SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)party\s+of\s+(\d+)").expect("party size pattern"));

static SUBJECT_PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(re:|fwd?:|confirmation|booking)").expect("subject prefix pattern")
});

static BRACKET_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("bracket tag pattern"));

/// Extract a booking confirmation code: first match among the ordered
/// label patterns, each requiring a 6+ character alphanumeric token.
#[must_use]
pub fn extract_confirmation_number(text: &str) -> Option<String> {
    CONFIRMATION_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .map(|caps| caps[1].to_string())
}

/// Extract every parseable calendar date from the text, sorted ascending.
///
/// Recognizes `MM/DD/YYYY`, `YYYY-MM-DD` and `Month DD, YYYY` shapes;
/// tokens that match a shape but are not valid calendar dates (13/45/2024,
/// misspelled month names) are silently discarded.
#[must_use]
pub fn extract_dates(text: &str) -> Vec<DateTime<Utc>> {
    let mut dates: Vec<DateTime<Utc>> = DATE_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .filter_map(|m| parse_date_token(m.as_str()))
        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc())
        .collect();
    dates.sort();
    dates
}

fn parse_date_token(token: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%m/%d/%Y", "%Y-%m-%d", "%B %d, %Y", "%B %d %Y", "%b %d, %Y", "%b %d %Y",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

/// Extract a postal-style location: labelled `address:`/`location:` lines
/// first, then a street-address-shaped token ending in a 5-digit code.
/// Only the `address` field of the result is ever populated.
#[must_use]
pub fn extract_location(text: &str) -> Option<Location> {
    for pattern in ADDRESS_LABEL_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            return Some(Location::from_address(caps[1].trim()));
        }
    }
    STREET_ADDRESS_PATTERN
        .find(text)
        .map(|m| Location::from_address(m.as_str().trim()))
}

/// Best-effort provider extraction from a `from:` label line in the body.
/// Weak by design; returns `None` when no such line exists.
#[must_use]
pub fn extract_provider(text: &str) -> Option<String> {
    PROVIDER_PATTERN
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|p| !p.is_empty())
}

/// Extract a flight number of the form `<2 letters><digits>` following a
/// "flight" label.
#[must_use]
pub fn extract_flight_number(text: &str) -> Option<String> {
    FLIGHT_NUMBER_PATTERN
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Extract the first two distinct 3-uppercase-letter tokens, assigned
/// positionally as (departure, arrival). An approximation, not a real
/// airport-code validator.
#[must_use]
pub fn extract_airports(text: &str) -> Option<(String, String)> {
    let mut codes = AIRPORT_CODE_PATTERN.find_iter(text).map(|m| m.as_str());
    let departure = codes.next()?;
    let arrival = codes.find(|code| *code != departure)?;
    Some((departure.to_string(), arrival.to_string()))
}

/// Extract the first two `H:MM[AM|PM]`-shaped tokens, positionally
/// departure then arrival. Raw tokens only; combining with a calendar
/// date is the caller's job.
#[must_use]
pub fn extract_clock_times(text: &str) -> Option<(String, String)> {
    let mut times = CLOCK_TIME_PATTERN.find_iter(text).map(|m| m.as_str());
    let departure = times.next()?;
    let arrival = times.next()?;
    Some((departure.to_string(), arrival.to_string()))
}

/// Combine a calendar date with a clock-time token into a UTC instant.
/// Returns `None` when the token is not a readable clock time.
#[must_use]
pub fn combine_date_and_time(date: NaiveDate, token: &str) -> Option<DateTime<Utc>> {
    let normalized = token.trim().to_uppercase();
    const FORMATS: &[&str] = &["%I:%M %p", "%I:%M%p", "%H:%M"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&normalized, fmt).ok())
        .map(|time| date.and_time(time).and_utc())
}

/// Membership test against a static airline name list.
#[must_use]
pub fn extract_airline(text: &str, subject: &str, airlines: &[String]) -> Option<String> {
    find_known_name(text, subject, airlines)
}

/// Membership test against a static hotel chain name list.
#[must_use]
pub fn extract_hotel_name(text: &str, subject: &str, chains: &[String]) -> Option<String> {
    find_known_name(text, subject, chains)
}

fn find_known_name(text: &str, subject: &str, names: &[String]) -> Option<String> {
    let content = format!("{text} {subject}");
    names
        .iter()
        .find(|name| content.contains(name.as_str()))
        .cloned()
}

/// Extract a restaurant name from a `reservation at <name>` or
/// `table at <name>` phrase.
#[must_use]
pub fn extract_restaurant_name(text: &str, subject: &str) -> Option<String> {
    let content = format!("{text} {subject}");
    RESTAURANT_NAME_PATTERN
        .captures(&content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Extract a `party of <N>` party size.
#[must_use]
pub fn extract_party_size(text: &str) -> Option<u32> {
    PARTY_SIZE_PATTERN
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Build an event title from the subject line, falling back to the first
/// non-empty body line (truncated to 100 characters), then to the generic
/// label.
#[must_use]
pub fn extract_title(subject: &str, body: &str) -> String {
    let cleaned = SUBJECT_PREFIX_PATTERN.replace(subject, "");
    let cleaned = BRACKET_TAG_PATTERN.replace_all(&cleaned, "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() > 5 {
        return cleaned.to_string();
    }

    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(100).collect())
        .unwrap_or_else(|| DEFAULT_EVENT_TITLE.to_string())
}
