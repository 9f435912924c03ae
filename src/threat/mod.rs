//! Threat Module
//!
//! Verdict -> categorical threat records. This is where Suspicious vs
//! Malicious is decided.
//!
//! ## Structure
//! - `types`: ThreatRecord, RiskLevel
//! - `rules`: thresholds, denylist, pattern tables
//! - `classifier`: classification logic

pub mod classifier;
pub mod rules;
pub mod types;

pub use classifier::{classify, classify_with_thresholds, denylist_hit, scan_patterns};
pub use rules::{ThreatThresholds, HIGH_ENTROPY_MIN, MALICIOUS_DOMAINS, MALICIOUS_SCORE_MIN};
pub use types::{RiskLevel, ThreatRecord};
