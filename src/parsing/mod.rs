//! Deterministic booking-email parsing
//!
//! Classifier, field extractors, parser strategies and the orchestrator
//! that ties them to the assisted-extraction boundary.

pub mod classify;
pub mod fields;
pub mod pipeline;
pub mod strategies;

pub use classify::{BookingCategory, classify, detect_type};
pub use pipeline::{parse_booking_email, parse_with_heuristics};
pub use strategies::{
    FALLBACK_CONFIDENCE, HEURISTIC_CONFIDENCE, ParseStrategy, TEMPLATE_CONFIDENCE, cascade,
};
