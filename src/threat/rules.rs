//! Threat Classification Rules & Thresholds
//!
//! Constants and configuration only; no classification logic here.

use serde::{Deserialize, Serialize};

// ============================================================================
// THRESHOLDS
// ============================================================================

/// At or above this combined score a phishing verdict is Malicious
pub const MALICIOUS_SCORE_MIN: f32 = 0.8;

/// A normalized hostname-entropy feature above this reads as "high entropy"
pub const HIGH_ENTROPY_MIN: f32 = 0.5;

// ============================================================================
// DENYLIST & PATTERNS
// ============================================================================

/// Known phishing domains: a URL containing one is flagged Malicious without
/// waiting for any classifier.
pub const MALICIOUS_DOMAINS: &[&str] = &[
    "fake-login.com",
    "phishing-bank.com",
    "secure-verify.net",
    "account-update.com",
    "password-reset-now.com",
];

/// Substrings in message text that suggest credential harvesting.
///
/// "login" is intentionally not in this table: it is already covered by the
/// URL login-keyword feature, and matching it in plain text would flag every
/// message that merely links a login page twice for the same signal.
pub const CREDENTIAL_PATTERNS: &[&str] = &["password", "credit card", "social security"];

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

/// Thresholds for classification (configurable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatThresholds {
    /// At or above = Malicious, below = Suspicious (for phishing verdicts)
    pub malicious_min: f32,
    /// Entropy feature value that triggers the high-entropy reason
    pub high_entropy_min: f32,
}

impl Default for ThreatThresholds {
    fn default() -> Self {
        Self {
            malicious_min: MALICIOUS_SCORE_MIN,
            high_entropy_min: HIGH_ENTROPY_MIN,
        }
    }
}

impl ThreatThresholds {
    /// High sensitivity - lower bar for Malicious, more alerts
    pub fn high_sensitivity() -> Self {
        Self {
            malicious_min: 0.6,
            ..Default::default()
        }
    }
}
