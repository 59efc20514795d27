//! `TravelParse` - Booking-email interpretation pipeline
//!
//! This library turns free-form travel-booking emails into structured
//! draft events. It tries an AI-assisted extractor first and falls back
//! to a deterministic heuristic cascade, always producing a well-formed
//! result with an honest confidence signal.

pub mod assisted;
pub mod config;
pub mod error;
pub mod models;
pub mod parsing;

// Re-export core types for public API
pub use assisted::{AssistedExtractor, NullExtractor, OpenAiExtractor, RawAssistedResult};
pub use config::TravelParseConfig;
pub use error::TravelParseError;
pub use models::{EventType, Location, ParseResult, TravelEvent};
pub use parsing::{parse_booking_email, parse_with_heuristics};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
