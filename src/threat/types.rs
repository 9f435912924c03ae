//! Threat Types
//!
//! Data structures only; classification logic lives in classifier.rs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Risk classification of one flagged item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// No action needed
    Safe,
    /// Shown with an annotation, worth monitoring
    Suspicious,
    /// Dangerous, withheld under a blocking policy
    Malicious,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Suspicious => "suspicious",
            RiskLevel::Malicious => "malicious",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            RiskLevel::Safe => 0,
            RiskLevel::Suspicious => 1,
            RiskLevel::Malicious => 2,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THREAT RECORD
// ============================================================================

/// One flagged item inside a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatRecord {
    /// Category, e.g. "phishing", "malware", "malicious_domain"
    pub threat_type: String,
    pub risk: RiskLevel,
    /// Human-readable triggers, in detection order
    pub reasons: Vec<String>,
    /// The exact substring/URL flagged
    pub content: String,
    pub detected_at: DateTime<Utc>,
}

impl ThreatRecord {
    pub fn new(
        threat_type: impl Into<String>,
        risk: RiskLevel,
        reasons: Vec<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            threat_type: threat_type.into(),
            risk,
            reasons,
            content: content.into(),
            detected_at: Utc::now(),
        }
    }
}
