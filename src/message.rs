//! Chat message model
//!
//! Messages and their attached security record. The transport layer owns
//! delivery; this crate only fills in `MessageSecurity` as scans progress.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::threat::ThreatRecord;

/// URLs embedded in message text
static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("valid url pattern"));

// ============================================================================
// SCAN STATUS
// ============================================================================

/// Security lifecycle of one scanned message.
///
/// `Scanning` is the only non-terminal state; a new message always starts a
/// fresh machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Scanning,
    Safe,
    ThreatDetected,
    Blocked,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Scanning => "scanning",
            ScanStatus::Safe => "safe",
            ScanStatus::ThreatDetected => "threat_detected",
            ScanStatus::Blocked => "blocked",
        }
    }

    /// Terminal states accept no further transition for this scan.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanStatus::Scanning)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// MESSAGE SECURITY
// ============================================================================

/// Security record attached to a chat message.
///
/// Persists for the lifetime of the message; the terminal status is the only
/// thing the chat/UI layer is allowed to read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSecurity {
    pub status: ScanStatus,
    /// Flagged items in insertion (detection) order
    pub threats: Vec<ThreatRecord>,
    pub blocked: bool,
    pub updated_at: DateTime<Utc>,
}

impl MessageSecurity {
    /// Fresh record in the initial `Scanning` state.
    pub fn new() -> Self {
        Self {
            status: ScanStatus::Scanning,
            threats: Vec::new(),
            blocked: false,
            updated_at: Utc::now(),
        }
    }
}

impl Default for MessageSecurity {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MESSAGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    System,
}

/// One chat message.
///
/// `security` is absent only for system messages or messages containing no
/// scannable subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub username: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    pub security: Option<MessageSecurity>,
}

impl Message {
    pub fn text(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            content: content.into(),
            timestamp: Utc::now(),
            kind: MessageKind::Text,
            security: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: "system".to_string(),
            content: content.into(),
            timestamp: Utc::now(),
            kind: MessageKind::System,
            security: None,
        }
    }
}

/// Extract every http(s) URL from message text, in order of appearance.
pub fn extract_urls(content: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_urls() {
        let urls = extract_urls("check http://a.com and https://b.org/x?y=1 now");
        assert_eq!(urls, vec!["http://a.com", "https://b.org/x?y=1"]);
    }

    #[test]
    fn test_extract_urls_none() {
        assert!(extract_urls("no links here").is_empty());
    }

    #[test]
    fn test_status_terminal() {
        assert!(!ScanStatus::Scanning.is_terminal());
        assert!(ScanStatus::Safe.is_terminal());
        assert!(ScanStatus::ThreatDetected.is_terminal());
        assert!(ScanStatus::Blocked.is_terminal());
    }

    #[test]
    fn test_new_security_is_scanning() {
        let sec = MessageSecurity::new();
        assert_eq!(sec.status, ScanStatus::Scanning);
        assert!(sec.threats.is_empty());
        assert!(!sec.blocked);
    }
}
