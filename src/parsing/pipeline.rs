//! Booking-email parsing orchestrator
//!
//! Tries the machine-assisted extractor first; when that attempt
//! resolves to empty, unavailable, or an error, runs the deterministic
//! heuristic cascade instead. Always returns a well-formed result, so
//! upstream email processing never aborts on content it cannot
//! understand.

use crate::assisted::{AssistedExtractor, normalize};
use crate::config::TravelParseConfig;
use crate::models::{ParseResult, clamp_confidence};
use crate::parsing::strategies::cascade;
use tracing::{debug, info, warn};

/// Parse one booking email into zero or more draft events.
///
/// The assisted call is the only suspension point; it fully resolves
/// before the cascade is considered, and its failures are logged and
/// swallowed rather than propagated.
pub async fn parse_booking_email<E>(
    extractor: &E,
    config: &TravelParseConfig,
    body: &str,
    subject: &str,
) -> ParseResult
where
    E: AssistedExtractor + ?Sized,
{
    match extractor.interpret(body, subject).await {
        Ok(Some(raw)) => {
            let result = normalize(raw);
            if result.events.is_empty() {
                // An empty assisted result carries no information;
                // treat it like an unavailable extractor
                info!("assisted extractor returned no events, using heuristic parsing");
            } else {
                debug!(
                    events = result.events.len(),
                    confidence = result.confidence,
                    "assisted extraction succeeded"
                );
                return result;
            }
        }
        Ok(None) => {
            info!("assisted extractor unavailable, using heuristic parsing");
        }
        Err(e) => {
            warn!(error = %e, "assisted extraction failed, using heuristic parsing");
        }
    }

    parse_with_heuristics(config, body, subject)
}

/// Run only the deterministic heuristic cascade.
///
/// This is exactly what `parse_booking_email` produces whenever the
/// assisted attempt does not pan out, exposed separately so callers can
/// parse without any network dependency.
#[must_use]
pub fn parse_with_heuristics(
    config: &TravelParseConfig,
    body: &str,
    subject: &str,
) -> ParseResult {
    for strategy in cascade(config) {
        if let Some(event) = strategy.try_apply(body, subject) {
            debug!(strategy = strategy.name(), "heuristic stage applied");
            let confidence = clamp_confidence(event.confidence);
            let summary = format!(
                "Parsed {} booking using heuristic methods",
                event.event_type.as_str()
            );
            return ParseResult {
                events: vec![event],
                confidence,
                summary,
            };
        }
    }

    // The cascade ends in a stage that always applies
    unreachable!("heuristic cascade must produce a result")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TravelParseError;
    use crate::assisted::{NullExtractor, RawAssistedResult};
    use crate::models::EventType;
    use crate::parsing::strategies::{FALLBACK_CONFIDENCE, TEMPLATE_CONFIDENCE};
    use async_trait::async_trait;

    struct StubExtractor {
        payload: &'static str,
    }

    #[async_trait]
    impl AssistedExtractor for StubExtractor {
        async fn interpret(
            &self,
            _body: &str,
            _subject: &str,
        ) -> Result<Option<RawAssistedResult>, TravelParseError> {
            Ok(Some(serde_json::from_str(self.payload).unwrap()))
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl AssistedExtractor for FailingExtractor {
        async fn interpret(
            &self,
            _body: &str,
            _subject: &str,
        ) -> Result<Option<RawAssistedResult>, TravelParseError> {
            Err(TravelParseError::assisted("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_assisted_success_short_circuits_cascade() {
        let extractor = StubExtractor {
            payload: r#"{
                "events": [
                    {"type": "flight", "title": "Outbound leg"},
                    {"type": "hotel", "title": "Three nights"}
                ],
                "confidence": 0.92,
                "summary": "flight and hotel"
            }"#,
        };
        let config = TravelParseConfig::default();
        let result = parse_booking_email(&extractor, &config, "whatever", "subject").await;

        assert_eq!(result.events.len(), 2);
        assert_eq!(result.events[0].event_type, EventType::Flight);
        assert_eq!(result.events[1].event_type, EventType::Hotel);
        assert!((result.confidence - 0.92).abs() < f64::EPSILON);
        assert_eq!(result.summary, "flight and hotel");
    }

    #[tokio::test]
    async fn test_assisted_empty_events_falls_back() {
        let extractor = StubExtractor {
            payload: r#"{"events": [], "confidence": 0.9, "summary": "nothing found"}"#,
        };
        let config = TravelParseConfig::default();
        let result = parse_booking_email(&extractor, &config, "no bookings here", "hi").await;

        // Heuristic fallback, not the assisted summary
        assert_eq!(result.events.len(), 1);
        assert!(result.summary.contains("heuristic"));
        assert!((result.confidence - FALLBACK_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_assisted_error_is_swallowed() {
        let config = TravelParseConfig::default();
        let result = parse_booking_email(
            &FailingExtractor,
            &config,
            "Flight UA22 Confirmation Number: ZZTOP99",
            "Your flight",
        )
        .await;

        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].event_type, EventType::Flight);
        assert!((result.confidence - TEMPLATE_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_unavailable_matches_heuristics_exactly() {
        let config = TravelParseConfig::default();
        let body = "Trip from 03/10/2025 to 03/15/2025, Reference code: TRV88421";
        let subject = "Upcoming trip";

        let via_pipeline = parse_booking_email(&NullExtractor, &config, body, subject).await;
        let direct = parse_with_heuristics(&config, body, subject);

        assert_eq!(
            serde_json::to_value(&via_pipeline).unwrap(),
            serde_json::to_value(&direct).unwrap()
        );
    }

    #[tokio::test]
    async fn test_always_returns_result_for_empty_input() {
        let config = TravelParseConfig::default();
        let result = parse_booking_email(&NullExtractor, &config, "", "").await;
        assert_eq!(result.events.len(), 1);
        assert!(!result.summary.is_empty());
        assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
    }
}
