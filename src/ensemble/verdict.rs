//! Merged verdict types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which classifier produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Local,
    Remote,
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreSource::Local => "local",
            ScoreSource::Remote => "remote",
        }
    }
}

impl std::fmt::Display for ScoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classifier's contribution to a scan.
///
/// `score: None` means the source did not answer in time or is unavailable,
/// which is distinct from a score of 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub source: ScoreSource,
    pub score: Option<f32>,
    pub error: bool,
    pub latency_ms: u64,
}

/// Merged classification outcome for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub phishing: bool,
    pub explanation: String,
    /// Contributions by source; a missing key means that source was absent
    pub raw_scores: BTreeMap<ScoreSource, f32>,
    /// Bounded raw-response excerpt, only for unparsed remote bodies
    pub preview: Option<String>,
    /// The remote service itself flagged the subject
    pub remote_flagged: bool,
}

impl Verdict {
    /// Mean of the present contributions; `None` when no source answered
    /// with a score.
    pub fn combined_score(&self) -> Option<f32> {
        if self.raw_scores.is_empty() {
            return None;
        }
        let sum: f32 = self.raw_scores.values().sum();
        Some(sum / self.raw_scores.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_score() {
        let mut v = Verdict {
            phishing: false,
            explanation: String::new(),
            raw_scores: BTreeMap::new(),
            preview: None,
            remote_flagged: false,
        };
        assert_eq!(v.combined_score(), None);

        v.raw_scores.insert(ScoreSource::Local, 0.7);
        assert_eq!(v.combined_score(), Some(0.7));

        v.raw_scores.insert(ScoreSource::Remote, 0.5);
        assert!((v.combined_score().unwrap() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_source_serializes_as_string() {
        assert_eq!(serde_json::to_string(&ScoreSource::Local).unwrap(), r#""local""#);
    }
}
