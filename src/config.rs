//! Configuration management for the `TravelParse` pipeline
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings. The keyword
//! sets and provider name lists used by the heuristic parsers live here
//! as injectable data, so tests and localized deployments can substitute
//! them without touching the parsing code.

use crate::TravelParseError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TravelParse` pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelParseConfig {
    /// Assisted-extractor (AI service) configuration
    pub assisted: AssistedConfig,
    /// Keyword sets driving the booking-type classifier
    pub keywords: KeywordConfig,
    /// Known provider name lists for airline/hotel recognition
    pub providers: ProviderConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Assisted-extractor service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistedConfig {
    /// API key; when absent the assisted path is skipped entirely
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible chat-completions endpoint
    #[serde(default = "default_assisted_base_url")]
    pub base_url: String,
    /// Model name to request
    #[serde(default = "default_assisted_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_assisted_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_assisted_max_retries")]
    pub max_retries: u32,
    /// Response token budget
    #[serde(default = "default_assisted_max_tokens")]
    pub max_tokens: u32,
}

/// Keyword sets for the ordered booking-type classifier.
///
/// Evaluation order is fixed (flight, then hotel, then restaurant);
/// these lists only control what counts as a match in each category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_flight_keywords")]
    pub flight: Vec<String>,
    #[serde(default = "default_hotel_keywords")]
    pub hotel: Vec<String>,
    #[serde(default = "default_restaurant_keywords")]
    pub restaurant: Vec<String>,
}

/// Static provider name lists used by the template parsers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_airlines")]
    pub airlines: Vec<String>,
    #[serde(default = "default_hotel_chains")]
    pub hotel_chains: Vec<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_assisted_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_assisted_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_assisted_timeout() -> u32 {
    30
}

fn default_assisted_max_retries() -> u32 {
    3
}

fn default_assisted_max_tokens() -> u32 {
    2000
}

fn default_flight_keywords() -> Vec<String> {
    [
        "flight",
        "boarding pass",
        "airline",
        "departure",
        "arrival",
        "gate",
        "seat",
        "terminal",
        "check-in",
        "itinerary",
    ]
    .map(String::from)
    .to_vec()
}

fn default_hotel_keywords() -> Vec<String> {
    [
        "hotel",
        "reservation",
        "booking",
        "check-in",
        "check-out",
        "room",
        "stay",
        "accommodation",
        "nights",
    ]
    .map(String::from)
    .to_vec()
}

fn default_restaurant_keywords() -> Vec<String> {
    [
        "reservation",
        "table",
        "restaurant",
        "dining",
        "opentable",
        "resy",
        "dinner",
        "lunch",
        "party of",
    ]
    .map(String::from)
    .to_vec()
}

fn default_airlines() -> Vec<String> {
    ["American", "Delta", "United", "Southwest", "JetBlue", "Alaska"]
        .map(String::from)
        .to_vec()
}

fn default_hotel_chains() -> Vec<String> {
    ["Marriott", "Hilton", "Hyatt", "Holiday Inn", "Sheraton"]
        .map(String::from)
        .to_vec()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for TravelParseConfig {
    fn default() -> Self {
        Self {
            assisted: AssistedConfig {
                api_key: None,
                base_url: default_assisted_base_url(),
                model: default_assisted_model(),
                timeout_seconds: default_assisted_timeout(),
                max_retries: default_assisted_max_retries(),
                max_tokens: default_assisted_max_tokens(),
            },
            keywords: KeywordConfig {
                flight: default_flight_keywords(),
                hotel: default_hotel_keywords(),
                restaurant: default_restaurant_keywords(),
            },
            providers: ProviderConfig {
                airlines: default_airlines(),
                hotel_chains: default_hotel_chains(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}

impl TravelParseConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with TRAVELPARSE_ prefix
        builder = builder.add_source(
            Environment::with_prefix("TRAVELPARSE")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TravelParseConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travelparse").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.assisted.base_url.is_empty() {
            self.assisted.base_url = default_assisted_base_url();
        }
        if self.assisted.model.is_empty() {
            self.assisted.model = default_assisted_model();
        }
        if self.assisted.timeout_seconds == 0 {
            self.assisted.timeout_seconds = default_assisted_timeout();
        }
        if self.assisted.max_tokens == 0 {
            self.assisted.max_tokens = default_assisted_max_tokens();
        }
        if self.keywords.flight.is_empty() {
            self.keywords.flight = default_flight_keywords();
        }
        if self.keywords.hotel.is_empty() {
            self.keywords.hotel = default_hotel_keywords();
        }
        if self.keywords.restaurant.is_empty() {
            self.keywords.restaurant = default_restaurant_keywords();
        }
        if self.providers.airlines.is_empty() {
            self.providers.airlines = default_airlines();
        }
        if self.providers.hotel_chains.is_empty() {
            self.providers.hotel_chains = default_hotel_chains();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        // The assisted path is optional; a key only needs to be plausible when present
        if let Some(api_key) = &self.assisted.api_key {
            if api_key.is_empty() {
                return Err(TravelParseError::config(
                    "Assisted extractor API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(TravelParseError::config(
                    "Assisted extractor API key appears to be invalid (too short). Please check your API key."
                ).into());
            }

            if api_key.len() > 200 {
                return Err(TravelParseError::config(
                    "Assisted extractor API key appears to be invalid (too long). Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.assisted.timeout_seconds > 300 {
            return Err(TravelParseError::config(
                "Assisted extractor timeout cannot exceed 300 seconds"
            ).into());
        }

        if self.assisted.max_retries > 10 {
            return Err(TravelParseError::config(
                "Assisted extractor max retries cannot exceed 10"
            ).into());
        }

        if self.assisted.max_tokens > 100_000 {
            return Err(TravelParseError::config(
                "Assisted extractor max tokens cannot exceed 100000"
            ).into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelParseError::config(
                format!("Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelParseError::config(
                format!("Invalid log format '{}'. Must be one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        if !self.assisted.base_url.starts_with("http://") && !self.assisted.base_url.starts_with("https://") {
            return Err(TravelParseError::config(
                "Assisted extractor base URL must be a valid HTTP or HTTPS URL"
            ).into());
        }

        Ok(())
    }

    /// Create configuration directory if it doesn't exist
    pub fn ensure_config_dir() -> Result<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            let travelparse_config_dir = config_dir.join("travelparse");
            std::fs::create_dir_all(&travelparse_config_dir)
                .with_context(|| format!("Failed to create config directory: {}", travelparse_config_dir.display()))?;
            Ok(travelparse_config_dir)
        } else {
            Err(TravelParseError::config("Unable to determine config directory").into())
        }
    }
}
