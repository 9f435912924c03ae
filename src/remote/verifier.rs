//! Remote verification client
//!
//! One outbound call per subject, bounded by a hard deadline. The timeout
//! wraps the whole request future, so expiry drops the in-flight request and
//! releases the underlying connection rather than just abandoning the wait.

use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::multipart;

use crate::config::ScannerConfig;
use crate::error::VerifyError;

use super::cache;
use super::types::RemoteVerdict;

static HTTP: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Verify a URL against the remote service (GET, url as query parameter).
pub async fn verify_url(config: &ScannerConfig, raw_url: &str) -> Result<RemoteVerdict, VerifyError> {
    let key = cache::key_for_url(raw_url);
    if let Some(cached) = cache::get(&key) {
        log::debug!("remote verdict cache hit for {}", raw_url);
        return Ok(cached);
    }

    let mut request = HTTP
        .get(&config.url_check_endpoint)
        .query(&[("url", raw_url)]);
    if let Some(api_key) = &config.api_key {
        request = request.header("x-api-key", api_key);
    }

    let verdict = bounded_call(request, config.url_timeout_ms).await?;
    cache::put(key, verdict.clone());
    Ok(verdict)
}

/// Verify a file or image against the remote service (POST multipart).
pub async fn verify_file(
    config: &ScannerConfig,
    file_name: &str,
    bytes: &[u8],
) -> Result<RemoteVerdict, VerifyError> {
    let key = cache::key_for_bytes(bytes);
    if let Some(cached) = cache::get(&key) {
        log::debug!("remote verdict cache hit for file {}", file_name);
        return Ok(cached);
    }

    let part = multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
    let form = multipart::Form::new().part("file", part);

    let mut request = HTTP.post(&config.file_check_endpoint).multipart(form);
    if let Some(api_key) = &config.api_key {
        request = request.header("x-api-key", api_key);
    }

    let verdict = bounded_call(request, config.file_timeout_ms).await?;
    cache::put(key, verdict.clone());
    Ok(verdict)
}

/// Issue the request under the deadline and map the response.
async fn bounded_call(
    request: reqwest::RequestBuilder,
    timeout_ms: u64,
) -> Result<RemoteVerdict, VerifyError> {
    let call = async {
        let response = request
            .send()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        Ok(parse_body(&body))
    };

    match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
        Ok(result) => result,
        Err(_) => Err(VerifyError::Timeout { timeout_ms }),
    }
}

/// Structured JSON when possible, heuristic fallback otherwise.
fn parse_body(body: &str) -> RemoteVerdict {
    match serde_json::from_str::<RemoteVerdict>(body) {
        Ok(verdict) => verdict,
        Err(e) => {
            log::debug!("remote body did not parse as JSON ({}), using heuristic", e);
            RemoteVerdict::heuristic_fallback(body)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
