//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default verification endpoint, only edit this file.

/// Default URL verification endpoint
///
/// This is the fallback URL when no environment variable is set.
pub const DEFAULT_CHECK_URL: &str = "http://localhost:5000/api/check-phish";

/// Default file/image verification endpoint
pub const DEFAULT_FILE_CHECK_URL: &str = "http://localhost:5000/api/check-file";

/// Default timeout budget for URL checks (milliseconds)
pub const DEFAULT_URL_TIMEOUT_MS: u64 = 8_000;

/// Default timeout budget for file/image checks (milliseconds)
pub const DEFAULT_FILE_TIMEOUT_MS: u64 = 20_000;

/// Side length of the image model input (pixels)
pub const IMAGE_INPUT_SIZE: u32 = 224;

/// Maximum characters of an unparsed remote body kept as preview
pub const PREVIEW_MAX_CHARS: usize = 200;

/// Remote verdict cache limits
pub const CACHE_MAX_SIZE: usize = 1000;
pub const CACHE_TTL_HOURS: i64 = 24;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "ChatShield";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get URL verification endpoint from environment or use default
pub fn get_check_url() -> String {
    std::env::var("CHATSHIELD_CHECK_URL").unwrap_or_else(|_| DEFAULT_CHECK_URL.to_string())
}

/// Get file verification endpoint from environment or use default
pub fn get_file_check_url() -> String {
    std::env::var("CHATSHIELD_FILE_CHECK_URL")
        .unwrap_or_else(|_| DEFAULT_FILE_CHECK_URL.to_string())
}

/// Get verification API key from environment (no default)
pub fn get_api_key() -> Option<String> {
    std::env::var("CHATSHIELD_API_KEY").ok().filter(|k| !k.is_empty())
}

/// Get URL model artifact path from environment
pub fn get_url_model_path() -> Option<String> {
    std::env::var("CHATSHIELD_URL_MODEL").ok().filter(|p| !p.is_empty())
}

/// Get image model artifact path from environment
pub fn get_image_model_path() -> Option<String> {
    std::env::var("CHATSHIELD_IMAGE_MODEL").ok().filter(|p| !p.is_empty())
}
