//! Booking-type classifier
//!
//! Decides which booking category an email belongs to by evaluating
//! fixed, ordered keyword sets over the case-folded body + subject.
//! Evaluation order is significant: flight is checked before hotel
//! before restaurant, so an email matching several sets resolves to the
//! more time-critical category.

use crate::config::KeywordConfig;
use crate::models::EventType;

/// Booking categories with a dedicated template parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingCategory {
    Flight,
    Hotel,
    Restaurant,
}

impl BookingCategory {
    /// The event type this category maps to.
    #[must_use]
    pub fn event_type(self) -> EventType {
        match self {
            Self::Flight => EventType::Flight,
            Self::Hotel => EventType::Hotel,
            Self::Restaurant => EventType::Restaurant,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Hotel => "hotel",
            Self::Restaurant => "restaurant",
        }
    }
}

/// Classify an email into a template category, or `None` when no keyword
/// set matches and classification is deferred to the generic heuristics.
#[must_use]
pub fn classify(body: &str, subject: &str, keywords: &KeywordConfig) -> Option<BookingCategory> {
    let content = format!("{body} {subject}").to_lowercase();

    // Order is fixed: flight wins over hotel wins over restaurant
    let ordered = [
        (BookingCategory::Flight, &keywords.flight),
        (BookingCategory::Hotel, &keywords.hotel),
        (BookingCategory::Restaurant, &keywords.restaurant),
    ];

    ordered
        .into_iter()
        .find(|(_, set)| set.iter().any(|keyword| content.contains(keyword.as_str())))
        .map(|(category, _)| category)
}

/// Coarse type detection over the broader vocabulary, used by the
/// generic heuristic path when no template matched.
#[must_use]
pub fn detect_type(body: &str, subject: &str) -> EventType {
    let content = format!("{body} {subject}").to_lowercase();

    let table: [(&[&str], EventType); 7] = [
        (&["flight", "airline"], EventType::Flight),
        (&["hotel", "room"], EventType::Hotel),
        (&["car", "rental"], EventType::Car),
        (&["restaurant", "table"], EventType::Restaurant),
        (&["activity", "tour"], EventType::Activity),
        (&["train", "railway"], EventType::Train),
        (&["bus"], EventType::Bus),
    ];

    table
        .into_iter()
        .find(|(needles, _)| needles.iter().any(|n| content.contains(n)))
        .map_or(EventType::Other, |(_, event_type)| event_type)
}
