//! Ensemble merger
//!
//! Combines the remote verdict and local model score into one Verdict. A
//! pure function of its two inputs: same pair in, same Verdict out. The
//! merge only runs once both sources are either present or definitively
//! absent.

use std::collections::BTreeMap;

use crate::remote::RemoteVerdict;

use super::verdict::{ScoreSource, Verdict};

/// A local-only score above this is phishing.
pub const LOCAL_ONLY_THRESHOLD: f32 = 0.5;

/// A combined (remote+local) score above this is phishing.
pub const COMBINED_THRESHOLD: f32 = 0.6;

/// Merge the two signals under the precedence rules.
///
/// 1. Remote absent, local present: phishing iff local > 0.5.
/// 2. Both absent: neutral non-phishing verdict — a scan that cannot reach
///    any source must never default to blocking.
/// 3. Remote present: mean-combine its image score with the local score
///    (using whichever is present when only one is);
///    phishing = remote's flag OR combined > 0.6.
pub fn merge(remote: Option<&RemoteVerdict>, local_score: Option<f32>) -> Verdict {
    let mut raw_scores = BTreeMap::new();

    let Some(remote) = remote else {
        return match local_score {
            Some(local) => {
                raw_scores.insert(ScoreSource::Local, local);
                Verdict {
                    phishing: local > LOCAL_ONLY_THRESHOLD,
                    explanation: "local model only".to_string(),
                    raw_scores,
                    preview: None,
                    remote_flagged: false,
                }
            }
            None => Verdict {
                phishing: false,
                explanation: "no signal available".to_string(),
                raw_scores,
                preview: None,
                remote_flagged: false,
            },
        };
    };

    let remote_image = remote.image_score();
    if let Some(score) = remote_image {
        raw_scores.insert(ScoreSource::Remote, score);
    }
    if let Some(score) = local_score {
        raw_scores.insert(ScoreSource::Local, score);
    }

    let combined = match (remote_image, local_score) {
        (Some(r), Some(l)) => Some((r + l) / 2.0),
        (Some(r), None) => Some(r),
        (None, Some(l)) => Some(l),
        (None, None) => None,
    };

    Verdict {
        phishing: remote.phishing || combined.map_or(false, |c| c > COMBINED_THRESHOLD),
        explanation: remote
            .explanation
            .clone()
            .unwrap_or_else(|| "remote verification".to_string()),
        raw_scores,
        preview: remote.preview.clone(),
        remote_flagged: remote.phishing,
    }
}

// ============================================================================
// TESTS
// ============================================================================
