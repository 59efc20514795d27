//! Reference client for an OpenAI-compatible assisted extractor
//!
//! Talks to a chat-completions endpoint and asks for strict JSON in the
//! raw payload shape. When no API key is configured the client reports
//! itself unavailable instead of erroring, so the pipeline falls through
//! to the heuristics without noise.

use crate::TravelParseError;
use crate::assisted::{AssistedExtractor, RawAssistedResult};
use crate::config::AssistedConfig;
use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are an expert travel booking parser. Extract structured travel \
                             information from emails and return valid JSON only.";

/// Assisted extractor backed by an OpenAI-compatible chat-completions API.
pub struct OpenAiExtractor {
    http: ClientWithMiddleware,
    config: AssistedConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiExtractor {
    /// Build a client with the configured timeout and retry policy.
    pub fn new(config: AssistedConfig) -> Result<Self, TravelParseError> {
        let base = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()
            .map_err(|e| TravelParseError::assisted(format!("failed to build HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let http = ClientBuilder::new(base)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { http, config })
    }

    fn build_prompt(body: &str, subject: &str) -> String {
        format!(
            r#"Parse this travel booking email and extract structured information. Return a JSON object with this exact structure:

{{
  "events": [
    {{
      "type": "flight|hotel|car|restaurant|activity|train|bus|other",
      "title": "descriptive title",
      "startDateTime": "ISO 8601 datetime or null",
      "endDateTime": "ISO 8601 datetime or null",
      "location": {{
        "address": "full address",
        "city": "city name",
        "country": "country name",
        "airport": "airport code if applicable"
      }},
      "confirmationNumber": "booking reference",
      "provider": "company/airline/hotel name",
      "details": {{
        "flightNumber": "for flights",
        "departure": "origin airport code",
        "arrival": "destination airport code",
        "roomType": "for hotels",
        "guests": "number of guests",
        "partySize": "for restaurants",
        "price": "cost if mentioned"
      }}
    }}
  ],
  "confidence": 0.0,
  "summary": "brief description of what was parsed"
}}

RULES:
1. Extract ALL separate bookings from the email; multi-segment flights become one event per segment
2. Use ISO 8601 datetimes (YYYY-MM-DDTHH:mm:ssZ); omit a datetime rather than guessing
3. Extract exact addresses, airport codes and confirmation numbers
4. Set confidence between 0 and 1 based on how much was successfully extracted
5. Return ONLY valid JSON, no other text

EMAIL SUBJECT: {subject}

EMAIL CONTENT:
{body}
"#
        )
    }

    /// Strip a surrounding Markdown code fence if the model added one.
    fn strip_code_fence(content: &str) -> &str {
        let trimmed = content.trim();
        let Some(rest) = trimmed.strip_prefix("```") else {
            return trimmed;
        };
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        rest.strip_suffix("```").unwrap_or(rest).trim()
    }
}

#[async_trait]
impl AssistedExtractor for OpenAiExtractor {
    async fn interpret(
        &self,
        body: &str,
        subject: &str,
    ) -> Result<Option<RawAssistedResult>, TravelParseError> {
        let Some(api_key) = &self.config.api_key else {
            debug!("assisted extractor has no API key configured, skipping");
            return Ok(None);
        };

        let prompt = Self::build_prompt(body, subject);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.1,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TravelParseError::assisted(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TravelParseError::assisted(format!(
                "extractor returned HTTP {status}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| TravelParseError::assisted(format!("invalid response body: {e}")))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TravelParseError::assisted("response contained no message content"))?;

        let payload = Self::strip_code_fence(&content);
        let raw: RawAssistedResult = serde_json::from_str(payload)
            .map_err(|e| TravelParseError::assisted(format!("payload is not valid JSON: {e}")))?;

        debug!(
            events = raw.events.as_ref().map_or(0, Vec::len),
            "assisted extractor returned a payload"
        );
        Ok(Some(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TravelParseConfig;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(
            OpenAiExtractor::strip_code_fence("```json\n{\"a\":1}\n```"),
            "{\"a\":1}"
        );
        assert_eq!(
            OpenAiExtractor::strip_code_fence("```\n{}\n```"),
            "{}"
        );
        assert_eq!(OpenAiExtractor::strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_prompt_includes_email_content() {
        let prompt = OpenAiExtractor::build_prompt("body text here", "subject line");
        assert!(prompt.contains("EMAIL SUBJECT: subject line"));
        assert!(prompt.contains("body text here"));
        assert!(prompt.contains("\"events\""));
    }

    #[tokio::test]
    async fn test_unconfigured_client_reports_unavailable() {
        let config = TravelParseConfig::default().assisted;
        assert!(config.api_key.is_none());
        let extractor = OpenAiExtractor::new(config).unwrap();
        let outcome = extractor.interpret("body", "subject").await.unwrap();
        assert!(outcome.is_none());
    }
}
