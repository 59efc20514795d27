//! Heuristic parser strategies
//!
//! The fallback engine is an explicit ordered list of strategies, each
//! exposing `try_apply`; the cascade runs them in priority order and the
//! first one that applies wins. The last stage always applies, so the
//! cascade is total and never fails.

use crate::config::TravelParseConfig;
use crate::models::{EventType, Location, TravelEvent};
use crate::parsing::classify::{BookingCategory, classify, detect_type};
use crate::parsing::fields;
use serde_json::json;

/// Confidence assigned when a recognized template (flight, hotel,
/// restaurant keyword hit) produced the event.
pub const TEMPLATE_CONFIDENCE: f64 = 0.8;
/// Confidence assigned when the generic heuristics recovered at least
/// one substantive field.
pub const HEURISTIC_CONFIDENCE: f64 = 0.6;
/// Confidence assigned by the last-resort fallback (title and provider
/// only).
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

/// One stage of the heuristic cascade.
pub trait ParseStrategy {
    /// Short name for logging and summaries.
    fn name(&self) -> &'static str;

    /// Attempt to parse the email; `None` means this stage does not
    /// apply and the cascade moves on.
    fn try_apply(&self, body: &str, subject: &str) -> Option<TravelEvent>;
}

/// Template parser for one classified booking category.
pub struct TemplateStrategy<'a> {
    category: BookingCategory,
    config: &'a TravelParseConfig,
}

impl<'a> TemplateStrategy<'a> {
    #[must_use]
    pub fn new(category: BookingCategory, config: &'a TravelParseConfig) -> Self {
        Self { category, config }
    }

    fn parse_flight(&self, body: &str, subject: &str) -> TravelEvent {
        let mut event = TravelEvent::new(
            EventType::Flight,
            fields::extract_title(subject, body),
            TEMPLATE_CONFIDENCE,
        );

        if let Some(flight_number) = fields::extract_flight_number(body) {
            event
                .parsed_data
                .insert("flightNumber".to_string(), json!(flight_number));
        }

        if let Some((departure, arrival)) = fields::extract_airports(body) {
            event
                .parsed_data
                .insert("departure".to_string(), json!(departure));
            event
                .parsed_data
                .insert("arrival".to_string(), json!(arrival.clone()));
            event.location = Some(Location {
                airport: Some(arrival.clone()),
                city: Some(arrival),
                ..Location::default()
            });
        }

        // Clock times are only meaningful when the message also names a
        // calendar date to anchor them to; without one they are dropped.
        let dates = fields::extract_dates(body);
        if let (Some(anchor), Some((dep_time, arr_time))) =
            (dates.first(), fields::extract_clock_times(body))
        {
            let anchor = anchor.date_naive();
            event.start_date_time = fields::combine_date_and_time(anchor, &dep_time);
            event.end_date_time = fields::combine_date_and_time(anchor, &arr_time);
        }

        event.confirmation_number = fields::extract_confirmation_number(body);
        event.provider = fields::extract_airline(body, subject, &self.config.providers.airlines);

        event
    }

    fn parse_hotel(&self, body: &str, subject: &str) -> TravelEvent {
        let mut event = TravelEvent::new(
            EventType::Hotel,
            fields::extract_title(subject, body),
            TEMPLATE_CONFIDENCE,
        );

        // First date is check-in, second is check-out
        let dates = fields::extract_dates(body);
        if dates.len() >= 2 {
            event.start_date_time = Some(dates[0]);
            event.end_date_time = Some(dates[1]);
        }

        event.location = fields::extract_location(body);
        event.confirmation_number = fields::extract_confirmation_number(body);
        event.provider =
            fields::extract_hotel_name(body, subject, &self.config.providers.hotel_chains);

        event
    }

    fn parse_restaurant(&self, body: &str, subject: &str) -> TravelEvent {
        let mut event = TravelEvent::new(
            EventType::Restaurant,
            fields::extract_title(subject, body),
            TEMPLATE_CONFIDENCE,
        );

        let dates = fields::extract_dates(body);
        event.start_date_time = dates.first().copied();

        event.location = fields::extract_location(body);
        event.confirmation_number = fields::extract_confirmation_number(body);
        event.provider = fields::extract_restaurant_name(body, subject);

        if let Some(party_size) = fields::extract_party_size(body) {
            event
                .parsed_data
                .insert("partySize".to_string(), json!(party_size));
        }

        event
    }
}

impl ParseStrategy for TemplateStrategy<'_> {
    fn name(&self) -> &'static str {
        match self.category {
            BookingCategory::Flight => "template:flight",
            BookingCategory::Hotel => "template:hotel",
            BookingCategory::Restaurant => "template:restaurant",
        }
    }

    fn try_apply(&self, body: &str, subject: &str) -> Option<TravelEvent> {
        if classify(body, subject, &self.config.keywords) != Some(self.category) {
            return None;
        }
        Some(match self.category {
            BookingCategory::Flight => self.parse_flight(body, subject),
            BookingCategory::Hotel => self.parse_hotel(body, subject),
            BookingCategory::Restaurant => self.parse_restaurant(body, subject),
        })
    }
}

/// Generic heuristic parser: no template recognized, but the common
/// extractors recovered at least one substantive field (confirmation
/// code, date, or location).
pub struct GenericHeuristicStrategy;

impl ParseStrategy for GenericHeuristicStrategy {
    fn name(&self) -> &'static str {
        "generic-heuristic"
    }

    fn try_apply(&self, body: &str, subject: &str) -> Option<TravelEvent> {
        let confirmation = fields::extract_confirmation_number(body);
        let dates = fields::extract_dates(body);
        let location = fields::extract_location(body);

        // Title and provider alone are the minimal fallback's territory
        if confirmation.is_none() && dates.is_empty() && location.is_none() {
            return None;
        }

        let mut event = TravelEvent::new(
            detect_type(body, subject),
            fields::extract_title(subject, body),
            HEURISTIC_CONFIDENCE,
        );
        event.confirmation_number = confirmation;
        // Earliest date starts the window, the next one ends it
        event.start_date_time = dates.first().copied();
        event.end_date_time = dates.get(1).copied();
        event.location = location;
        event.provider = fields::extract_provider(body);

        Some(event)
    }
}

/// Last-resort stage. Always applies, which is what guarantees the
/// cascade terminates with a result.
pub struct MinimalFallbackStrategy;

impl ParseStrategy for MinimalFallbackStrategy {
    fn name(&self) -> &'static str {
        "minimal-fallback"
    }

    fn try_apply(&self, body: &str, subject: &str) -> Option<TravelEvent> {
        let mut event = TravelEvent::new(
            EventType::Other,
            fields::extract_title(subject, body),
            FALLBACK_CONFIDENCE,
        );
        event.provider = fields::extract_provider(body);
        Some(event)
    }
}

/// The full cascade in priority order.
#[must_use]
pub fn cascade(config: &TravelParseConfig) -> Vec<Box<dyn ParseStrategy + '_>> {
    vec![
        Box::new(TemplateStrategy::new(BookingCategory::Flight, config)),
        Box::new(TemplateStrategy::new(BookingCategory::Hotel, config)),
        Box::new(TemplateStrategy::new(BookingCategory::Restaurant, config)),
        Box::new(GenericHeuristicStrategy),
        Box::new(MinimalFallbackStrategy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TravelParseConfig {
        TravelParseConfig::default()
    }

    #[test]
    fn test_flight_template_extracts_flight_fields() {
        let config = config();
        let strategy = TemplateStrategy::new(BookingCategory::Flight, &config);
        let body = "Flight AA1234 departs JFK on 03/10/2025 at 10:30 AM and lands LAX at 1:45 PM.\n\
                    Confirmation Number: XJ88291";
        let event = strategy.try_apply(body, "Your flight is booked").unwrap();

        assert_eq!(event.event_type, EventType::Flight);
        assert!((event.confidence - TEMPLATE_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(event.confirmation_number.as_deref(), Some("XJ88291"));
        assert_eq!(event.parsed_data["flightNumber"], "AA1234");
        assert_eq!(event.parsed_data["departure"], "JFK");
        assert_eq!(event.parsed_data["arrival"], "LAX");
        let start = event.start_date_time.unwrap();
        let end = event.end_date_time.unwrap();
        assert_eq!(start.format("%Y-%m-%d %H:%M").to_string(), "2025-03-10 10:30");
        assert_eq!(end.format("%Y-%m-%d %H:%M").to_string(), "2025-03-10 13:45");
    }

    #[test]
    fn test_flight_template_drops_times_without_anchor_date() {
        let config = config();
        let strategy = TemplateStrategy::new(BookingCategory::Flight, &config);
        let body = "Flight AA1234 departs JFK at 10:30 AM and lands LAX at 1:45 PM.";
        let event = strategy.try_apply(body, "Flight booked").unwrap();
        assert!(event.start_date_time.is_none());
        assert!(event.end_date_time.is_none());
    }

    #[test]
    fn test_flight_template_does_not_apply_to_hotel_text() {
        let config = config();
        let strategy = TemplateStrategy::new(BookingCategory::Flight, &config);
        assert!(strategy.try_apply("your hotel room awaits", "").is_none());
    }

    #[test]
    fn test_hotel_template_assigns_check_in_and_out() {
        let config = config();
        let strategy = TemplateStrategy::new(BookingCategory::Hotel, &config);
        let body = "Hotel stay from 06/01/2025 to 06/05/2025.\nAddress: 9 Harbor Road\n\
                    Booking reference: HH773321 at the Hilton";
        let event = strategy.try_apply(body, "Your stay").unwrap();

        assert_eq!(event.event_type, EventType::Hotel);
        assert_eq!(event.provider.as_deref(), Some("Hilton"));
        assert_eq!(event.confirmation_number.as_deref(), Some("HH773321"));
        assert_eq!(event.location.unwrap().address.as_deref(), Some("9 Harbor Road"));
        assert!(event.start_date_time.unwrap() < event.end_date_time.unwrap());
    }

    #[test]
    fn test_hotel_template_needs_two_dates_for_window() {
        let config = config();
        let strategy = TemplateStrategy::new(BookingCategory::Hotel, &config);
        let event = strategy
            .try_apply("Hotel night on 06/01/2025 only", "")
            .unwrap();
        assert!(event.start_date_time.is_none());
        assert!(event.end_date_time.is_none());
    }

    #[test]
    fn test_restaurant_template_records_party_size() {
        let config = config();
        let strategy = TemplateStrategy::new(BookingCategory::Restaurant, &config);
        let body = "Your table at Bella Vista, dinner on 03/12/2025, party of 4";
        let event = strategy.try_apply(body, "Dinner confirmed").unwrap();

        assert_eq!(event.event_type, EventType::Restaurant);
        assert_eq!(event.parsed_data["partySize"], 4);
        assert!(event.start_date_time.is_some());
        assert!(event.provider.is_some());
    }

    #[test]
    fn test_generic_heuristic_orders_two_dates() {
        let event = GenericHeuristicStrategy
            .try_apply("Trip window 03/15/2025 back from 03/10/2025", "Trip notes")
            .unwrap();
        assert!((event.confidence - HEURISTIC_CONFIDENCE).abs() < f64::EPSILON);
        let start = event.start_date_time.unwrap();
        let end = event.end_date_time.unwrap();
        assert!(start < end);
    }

    #[test]
    fn test_generic_heuristic_declines_without_substantive_fields() {
        assert!(
            GenericHeuristicStrategy
                .try_apply("From: Someone\nJust words, nothing extractable", "hello")
                .is_none()
        );
    }

    #[test]
    fn test_minimal_fallback_always_applies() {
        let event = MinimalFallbackStrategy.try_apply("", "").unwrap();
        assert_eq!(event.event_type, EventType::Other);
        assert!((event.confidence - FALLBACK_CONFIDENCE).abs() < f64::EPSILON);
        assert!(!event.title.is_empty());
    }

    #[test]
    fn test_cascade_order_and_termination() {
        let config = config();
        let stages = cascade(&config);
        let names: Vec<_> = stages.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "template:flight",
                "template:hotel",
                "template:restaurant",
                "generic-heuristic",
                "minimal-fallback"
            ]
        );
        // The last stage applies to anything
        assert!(stages.last().unwrap().try_apply("", "").is_some());
    }
}
