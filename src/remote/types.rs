//! Remote verification wire types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::PREVIEW_MAX_CHARS;

/// Fixed explanation marking a verdict built from an unparsed response body.
pub const HEURISTIC_EXPLANATION: &str = "heuristic fallback (unparsed response)";

/// Structured response from the verification service.
///
/// The service must return at least `phishing`; `explanation` and named
/// sub-scores (including `image_score`) are optional. An unparsed body is
/// mapped through the heuristic fallback instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteVerdict {
    pub phishing: bool,

    #[serde(default)]
    pub explanation: Option<String>,

    /// Named sub-scores, e.g. {"image_score": 0.8}
    #[serde(default)]
    pub scores: Option<HashMap<String, f32>>,

    /// Bounded excerpt of the raw body, set only by the fallback branch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,

    /// Served from the local result cache rather than the network
    #[serde(default)]
    pub is_cached: bool,
}

impl RemoteVerdict {
    /// The `image_score` sub-score, when the service reported one.
    pub fn image_score(&self) -> Option<f32> {
        self.scores.as_ref().and_then(|s| s.get("image_score").copied())
    }

    /// Heuristic verdict for a 2xx body that did not parse as JSON.
    ///
    /// Kept as an explicit branch because it changes the verdict's
    /// provenance: the explanation string must make the fallback visible.
    pub fn heuristic_fallback(body: &str) -> Self {
        let lower = body.to_lowercase();
        let phishing = lower.contains("malware") || lower.contains("phishing");

        Self {
            phishing,
            explanation: Some(HEURISTIC_EXPLANATION.to_string()),
            scores: None,
            preview: Some(body.chars().take(PREVIEW_MAX_CHARS).collect()),
            is_cached: false,
        }
    }
}
