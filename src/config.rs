//! Scanner configuration
//!
//! Environment-driven configuration for the scan pipeline. A missing
//! verification endpoint is a per-scan fatal condition: `validate()` fails
//! and the scan surfaces as "scan unavailable" instead of silently passing
//! content as safe.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants;
use crate::error::SecurityError;
use crate::security::BlockPolicy;

/// Scan pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// URL verification endpoint (GET, url passed as query parameter)
    pub url_check_endpoint: String,

    /// File/image verification endpoint (POST multipart)
    pub file_check_endpoint: String,

    /// API key sent as `x-api-key` header when present
    pub api_key: Option<String>,

    /// Deadline budget for URL checks (milliseconds)
    pub url_timeout_ms: u64,

    /// Deadline budget for file/image checks (milliseconds)
    pub file_timeout_ms: u64,

    /// Which risk levels withhold content
    pub block_policy: BlockPolicy,
}

impl ScannerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            url_check_endpoint: constants::get_check_url(),
            file_check_endpoint: constants::get_file_check_url(),
            api_key: constants::get_api_key(),

            url_timeout_ms: std::env::var("CHATSHIELD_URL_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(constants::DEFAULT_URL_TIMEOUT_MS),

            file_timeout_ms: std::env::var("CHATSHIELD_FILE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(constants::DEFAULT_FILE_TIMEOUT_MS),

            block_policy: BlockPolicy::default(),
        }
    }

    /// Check that the remote verifier can be reached at all.
    pub fn validate(&self) -> Result<(), SecurityError> {
        for (name, endpoint) in [
            ("url check endpoint", &self.url_check_endpoint),
            ("file check endpoint", &self.file_check_endpoint),
        ] {
            if endpoint.is_empty() {
                return Err(SecurityError::Configuration(format!("{} not set", name)));
            }
            if Url::parse(endpoint).is_err() {
                return Err(SecurityError::Configuration(format!(
                    "{} is not a valid URL: {}",
                    name, endpoint
                )));
            }
        }
        Ok(())
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
