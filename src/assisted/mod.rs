//! Machine-assisted extraction boundary
//!
//! The pipeline consumes a best-effort structured guess from an external
//! AI service. This module owns the boundary trait, the raw payload
//! shape, and the validation/normalization of whatever comes back; it
//! never constructs prompts on behalf of callers other than the bundled
//! reference client.

pub mod client;
pub mod normalize;

use crate::TravelParseError;
use async_trait::async_trait;

pub use client::OpenAiExtractor;
pub use normalize::{RawAssistedEvent, RawAssistedResult, RawLocation, normalize};

/// Boundary to the machine-assisted extractor.
///
/// The three outcomes the orchestrator distinguishes are encoded in the
/// return type: a payload, unavailable (`Ok(None)`), or a failure. The
/// orchestrator treats the last two identically, so implementations are
/// free to map transport problems to either.
#[async_trait]
pub trait AssistedExtractor: Send + Sync {
    /// Ask the extractor for a structured guess about the email.
    async fn interpret(
        &self,
        body: &str,
        subject: &str,
    ) -> Result<Option<RawAssistedResult>, TravelParseError>;
}

/// Extractor that is never available. Stands in when no AI service is
/// configured, forcing the deterministic cascade.
pub struct NullExtractor;

#[async_trait]
impl AssistedExtractor for NullExtractor {
    async fn interpret(
        &self,
        _body: &str,
        _subject: &str,
    ) -> Result<Option<RawAssistedResult>, TravelParseError> {
        Ok(None)
    }
}
