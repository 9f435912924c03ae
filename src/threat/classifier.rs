//! Threat Classifier
//!
//! Maps a merged Verdict into categorical threat records with human-readable
//! reasons. Deterministic and explainable: the reasons re-evaluate which URL
//! heuristics fired, in feature order, followed by model-based reasons.

use crate::ensemble::{ScoreSource, Verdict, LOCAL_ONLY_THRESHOLD};
use crate::features;
use crate::scan::subject::{ScanSubject, SubjectKind, SubjectPayload};

use super::rules::{ThreatThresholds, CREDENTIAL_PATTERNS, MALICIOUS_DOMAINS};
use super::types::{RiskLevel, ThreatRecord};

// ============================================================================
// MAIN CLASSIFICATION FUNCTION
// ============================================================================

/// Classify one merged verdict. Empty when the verdict is not phishing.
pub fn classify(verdict: &Verdict, subject: &ScanSubject) -> Vec<ThreatRecord> {
    classify_with_thresholds(verdict, subject, &ThreatThresholds::default())
}

/// Classification with custom thresholds
pub fn classify_with_thresholds(
    verdict: &Verdict,
    subject: &ScanSubject,
    thresholds: &ThreatThresholds,
) -> Vec<ThreatRecord> {
    if !verdict.phishing {
        return Vec::new();
    }

    let mut reasons = Vec::new();

    // Feature-based reasons first, in feature order
    if let SubjectPayload::Url(raw_url) = &subject.payload {
        let vector = features::extract(raw_url);

        if vector.get_by_name("host_is_ip") == Some(1.0) {
            reasons.push("host is an IP literal".to_string());
        }
        if vector.get_by_name("login_keyword") == Some(1.0) {
            reasons.push("contains login-related keyword".to_string());
        }
        if vector.get_by_name("has_at_symbol") == Some(1.0) {
            reasons.push("contains @ symbol".to_string());
        }
        if vector.get_by_name("punycode_host") == Some(1.0) {
            reasons.push("punycode (xn--) domain".to_string());
        }
        if vector.get_by_name("host_entropy").unwrap_or(0.0) > thresholds.high_entropy_min {
            reasons.push("high hostname entropy".to_string());
        }
    }

    // Model-based reasons after
    if verdict.remote_flagged {
        reasons.push("remote verification flagged this URL".to_string());
    }
    if verdict
        .raw_scores
        .get(&ScoreSource::Local)
        .is_some_and(|&s| s > LOCAL_ONLY_THRESHOLD)
    {
        reasons.push("local model score above threshold".to_string());
    }

    let score = verdict.combined_score().unwrap_or(0.0);
    let risk = if score >= thresholds.malicious_min {
        RiskLevel::Malicious
    } else {
        RiskLevel::Suspicious
    };

    let threat_type = match subject.kind() {
        SubjectKind::Url | SubjectKind::Image => "phishing",
        SubjectKind::File => "malware",
    };

    vec![ThreatRecord::new(
        threat_type,
        risk,
        reasons,
        subject.content_label(),
    )]
}

// ============================================================================
// CONTENT-LEVEL CHECKS
// ============================================================================

/// Check a URL against the known-phishing denylist. A hit is Malicious
/// without consulting any classifier.
pub fn denylist_hit(url: &str) -> Option<ThreatRecord> {
    let matched = MALICIOUS_DOMAINS.iter().find(|d| url.contains(*d))?;
    log::warn!("denylisted domain {} in {}", matched, url);

    Some(ThreatRecord::new(
        "malicious_domain",
        RiskLevel::Malicious,
        vec!["Known phishing domain".to_string()],
        url,
    ))
}

/// Scan message text for credential-harvesting patterns.
pub fn scan_patterns(content: &str) -> Vec<ThreatRecord> {
    let lower = content.to_lowercase();

    let fired: Vec<&str> = CREDENTIAL_PATTERNS
        .iter()
        .copied()
        .filter(|p| lower.contains(p))
        .collect();

    if fired.is_empty() {
        return Vec::new();
    }

    vec![ThreatRecord::new(
        "credential_harvesting",
        RiskLevel::Suspicious,
        vec!["Possible credential harvesting attempt".to_string()],
        content,
    )]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::merge;
    use crate::remote::RemoteVerdict;
    use std::collections::HashMap;

    fn url_subject(url: &str) -> ScanSubject {
        ScanSubject::url(url)
    }

    #[test]
    fn test_non_phishing_verdict_is_empty() {
        let verdict = merge(None, Some(0.2));
        let threats = classify(&verdict, &url_subject("http://example.com"));
        assert!(threats.is_empty());
    }

    #[test]
    fn test_local_high_score_is_malicious_with_reasons() {
        let verdict = merge(None, Some(0.9));
        let threats = classify(&verdict, &url_subject("http://secure-login-verify.badsite.tk"));

        assert_eq!(threats.len(), 1);
        let t = &threats[0];
        assert_eq!(t.risk, RiskLevel::Malicious);
        assert_eq!(t.threat_type, "phishing");
        assert!(t.reasons.iter().any(|r| r.contains("login-related keyword")));
        assert!(t.reasons.iter().any(|r| r.contains("local model score")));
        assert_eq!(t.content, "http://secure-login-verify.badsite.tk");
    }

    #[test]
    fn test_moderate_score_is_suspicious() {
        let verdict = merge(None, Some(0.55));
        let threats = classify(&verdict, &url_subject("http://example.com/login"));
        assert_eq!(threats[0].risk, RiskLevel::Suspicious);
    }

    #[test]
    fn test_reason_order_features_before_models() {
        let remote = RemoteVerdict {
            phishing: true,
            explanation: None,
            scores: Some(HashMap::from([("image_score".to_string(), 0.9)])),
            preview: None,
            is_cached: false,
        };
        let verdict = merge(Some(&remote), Some(0.9));
        let threats = classify(&verdict, &url_subject("http://192.168.0.1/login"));

        let reasons = &threats[0].reasons;
        assert_eq!(reasons[0], "host is an IP literal");
        assert_eq!(reasons[1], "contains login-related keyword");
        // Model reasons trail the feature-based ones
        let remote_idx = reasons.iter().position(|r| r.contains("remote verification")).unwrap();
        let local_idx = reasons.iter().position(|r| r.contains("local model")).unwrap();
        assert!(remote_idx < local_idx);
        assert!(remote_idx > 1);
    }

    #[test]
    fn test_remote_flag_without_scores_is_suspicious() {
        let remote = RemoteVerdict {
            phishing: true,
            explanation: None,
            scores: None,
            preview: None,
            is_cached: false,
        };
        let verdict = merge(Some(&remote), None);
        let threats = classify(&verdict, &url_subject("http://example.com"));
        assert_eq!(threats[0].risk, RiskLevel::Suspicious);
        assert!(threats[0].reasons.iter().any(|r| r.contains("remote verification")));
    }

    #[test]
    fn test_file_subject_gets_malware_type() {
        let verdict = merge(None, Some(0.9));
        let subject = ScanSubject::file("invoice.exe", vec![0u8; 16]);
        let threats = classify(&verdict, &subject);
        assert_eq!(threats[0].threat_type, "malware");
        assert_eq!(threats[0].content, "invoice.exe");
    }

    #[test]
    fn test_denylist_hit() {
        let t = denylist_hit("http://fake-login.com/session").expect("denylisted");
        assert_eq!(t.risk, RiskLevel::Malicious);
        assert_eq!(t.threat_type, "malicious_domain");
        assert_eq!(t.reasons, vec!["Known phishing domain"]);

        assert!(denylist_hit("http://example.com").is_none());
    }

    #[test]
    fn test_scan_patterns() {
        let threats = scan_patterns("please send your PASSWORD now");
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].threat_type, "credential_harvesting");
        assert_eq!(threats[0].risk, RiskLevel::Suspicious);

        assert!(scan_patterns("have a nice day").is_empty());
    }

    #[test]
    fn test_login_mention_alone_is_not_credential_harvesting() {
        // The login signal belongs to the URL keyword feature, not the
        // text pattern table
        assert!(scan_patterns("the login page moved, see the wiki").is_empty());
    }
}
