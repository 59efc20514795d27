use anyhow::{Context, Result};
use std::io::Read;
use tracing_subscriber::EnvFilter;
use travelparse::{NullExtractor, OpenAiExtractor, TravelParseConfig, parse_booking_email};

/// Read one email from a file argument or stdin, parse it, print the
/// result as JSON. Usage: `travelparse [email-file] [subject]`
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let body = match args.next() {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read email file: {path}"))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read email from stdin")?;
            buffer
        }
    };
    let subject = args.next().unwrap_or_default();

    let config = match TravelParseConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "could not load configuration, using defaults");
            TravelParseConfig::default()
        }
    };

    let result = if config.assisted.api_key.is_some() {
        let extractor = OpenAiExtractor::new(config.assisted.clone())
            .context("Failed to build assisted extractor client")?;
        parse_booking_email(&extractor, &config, &body, &subject).await
    } else {
        parse_booking_email(&NullExtractor, &config, &body, &subject).await
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
