//! End-to-end pipeline tests: message in, terminal security record out.
//!
//! The remote verifier points at a closed port so the remote source is
//! genuinely absent, and the local classifier is a fixed-score stub.

use std::sync::Arc;
use std::time::Duration;

use chatshield::events::{self, ScanEvent};
use chatshield::features::FeatureVector;
use chatshield::model::LocalScorer;
use chatshield::scan::{ScanOrchestrator, ScanSubject};
use chatshield::threat::RiskLevel;
use chatshield::{BlockPolicy, Message, ScanStatus, ScannerConfig};

struct FixedScorer(Option<f32>);

impl LocalScorer for FixedScorer {
    fn score_features(&self, _vector: &FeatureVector) -> Option<f32> {
        self.0
    }
    fn score_image(&self, _rgb: &[u8], _w: u32, _h: u32) -> Option<f32> {
        self.0
    }
}

/// Scores high only for login-themed URLs, so sibling subjects can reach
/// different verdicts.
struct KeywordScorer;

impl LocalScorer for KeywordScorer {
    fn score_features(&self, vector: &FeatureVector) -> Option<f32> {
        if vector.get_by_name("login_keyword") == Some(1.0) {
            Some(0.9)
        } else {
            Some(0.0)
        }
    }
    fn score_image(&self, _rgb: &[u8], _w: u32, _h: u32) -> Option<f32> {
        None
    }
}

async fn wait_terminal(orch: &ScanOrchestrator, id: uuid::Uuid) -> chatshield::MessageSecurity {
    for _ in 0..250 {
        if let Some(sec) = orch.security_of(id) {
            if sec.status.is_terminal() {
                return sec;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("scan {} did not reach a terminal state", id);
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .is_test(true)
    .try_init();
}

fn config(endpoint: &str) -> ScannerConfig {
    ScannerConfig {
        url_check_endpoint: endpoint.to_string(),
        file_check_endpoint: endpoint.to_string(),
        api_key: None,
        url_timeout_ms: 500,
        file_timeout_ms: 500,
        block_policy: BlockPolicy::default(),
    }
}

/// Endpoint that refuses connections: bind an ephemeral port, then drop it.
async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/check-phish", addr)
}

#[tokio::test]
async fn high_local_score_blocks_message_when_remote_is_down() {
    init_logging();
    let orch = ScanOrchestrator::with_scorer(
        config(&dead_endpoint().await),
        Arc::new(FixedScorer(Some(0.9))),
    );

    let msg = Message::text(
        "mallory",
        "urgent, sign in at http://secure-login-verify.badsite.tk now",
    );
    let sec = orch.scan_message(&msg).await.expect("scannable message");

    assert_eq!(sec.status, ScanStatus::Blocked);
    assert!(sec.blocked);
    assert_eq!(sec.threats.len(), 1);

    let threat = &sec.threats[0];
    assert_eq!(threat.threat_type, "phishing");
    assert_eq!(threat.risk, RiskLevel::Malicious);
    assert!(threat
        .reasons
        .iter()
        .any(|r| r.contains("login-related keyword")));
    assert!(threat
        .reasons
        .iter()
        .any(|r| r.contains("local model score above threshold")));
}

#[tokio::test]
async fn moderate_local_score_annotates_without_blocking() {
    let orch = ScanOrchestrator::with_scorer(
        config(&dead_endpoint().await),
        Arc::new(FixedScorer(Some(0.6))),
    );

    let msg = Message::text("bob", "is http://example.com/login legit?");
    let sec = orch.scan_message(&msg).await.expect("scannable message");

    // 0.6 clears the local-only phishing bar but not the malicious bar
    assert_eq!(sec.status, ScanStatus::ThreatDetected);
    assert!(!sec.blocked);
    assert_eq!(sec.threats[0].risk, RiskLevel::Suspicious);
}

#[tokio::test]
async fn clean_message_with_url_is_safe() {
    let orch = ScanOrchestrator::with_scorer(
        config(&dead_endpoint().await),
        Arc::new(FixedScorer(Some(0.1))),
    );

    let msg = Message::text("alice", "docs at http://example.com/guide");
    let sec = orch.scan_message(&msg).await.expect("scannable message");

    assert_eq!(sec.status, ScanStatus::Safe);
    assert!(sec.threats.is_empty());
}

#[tokio::test]
async fn submitted_scan_reports_through_event_bus() {
    init_logging();
    let orch = ScanOrchestrator::with_scorer(
        config(&dead_endpoint().await),
        Arc::new(FixedScorer(Some(0.9))),
    );
    let mut rx = events::subscribe();

    let subject = ScanSubject::url("http://secure-login-verify.badsite.tk");
    let scan_id = subject.id;
    let initial = orch.submit(subject);
    assert_eq!(initial.status, ScanStatus::Scanning);

    let mut saw_started = false;
    let mut saw_blocked = false;
    let deadline = tokio::time::sleep(Duration::from_secs(5));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => panic!("no completion event within deadline"),
            ev = rx.recv() => match ev.unwrap() {
                ScanEvent::ScanStarted { message_id } if message_id == scan_id => {
                    saw_started = true;
                }
                ScanEvent::MessageBlocked { message_id, reason, threats }
                    if message_id == scan_id =>
                {
                    assert!(!reason.is_empty());
                    assert_eq!(threats[0].risk, RiskLevel::Malicious);
                    saw_blocked = true;
                }
                ScanEvent::ScanCompleted { message_id, security }
                    if message_id == scan_id =>
                {
                    assert_eq!(security.status, ScanStatus::Blocked);
                    break;
                }
                _ => {}
            },
        }
    }

    assert!(saw_started);
    assert!(saw_blocked);
    assert_eq!(
        orch.security_of(scan_id).unwrap().status,
        ScanStatus::Blocked
    );
}

#[tokio::test]
async fn multiple_urls_roll_up_worst_outcome() {
    let orch = ScanOrchestrator::with_scorer(
        config(&dead_endpoint().await),
        Arc::new(FixedScorer(Some(0.1))),
    );

    // Clean model scores, but one link is on the denylist
    let msg = Message::text(
        "mallory",
        "compare http://example.com/a and http://fake-login.com/b",
    );
    let sec = orch.scan_message(&msg).await.expect("scannable message");

    assert_eq!(sec.status, ScanStatus::Blocked);
    assert_eq!(sec.threats.len(), 1);
    assert_eq!(sec.threats[0].threat_type, "malicious_domain");
}

#[tokio::test]
async fn missing_endpoint_never_reads_as_safe() {
    let mut cfg = config("http://localhost:5000/api/check-phish");
    cfg.url_check_endpoint = String::new();
    let orch = ScanOrchestrator::with_scorer(cfg, Arc::new(FixedScorer(Some(0.0))));

    let msg = Message::text("alice", "see http://example.com");
    let sec = orch.scan_message(&msg).await.expect("scannable message");

    assert_eq!(sec.status, ScanStatus::ThreatDetected);
    assert_eq!(sec.threats[0].threat_type, "scan_unavailable");
    assert_eq!(sec.threats[0].risk, RiskLevel::Suspicious);
}

#[tokio::test]
async fn sibling_subjects_keep_independent_verdicts() {
    let orch = ScanOrchestrator::with_scorer(
        config(&dead_endpoint().await),
        std::sync::Arc::new(KeywordScorer),
    );
    let message_id = uuid::Uuid::new_v4();

    let phishing =
        ScanSubject::url("http://secure-login-verify.badsite.tk").from_message(message_id);
    let phishing_id = phishing.id;
    orch.submit(phishing);
    let first = wait_terminal(&orch, phishing_id).await;
    assert_eq!(first.status, ScanStatus::Blocked);
    assert!(!first.threats.is_empty());

    let clean = ScanSubject::url("http://example.org/docs").from_message(message_id);
    let clean_id = clean.id;
    assert_ne!(clean_id, phishing_id);
    orch.submit(clean);
    let second = wait_terminal(&orch, clean_id).await;
    assert_eq!(second.status, ScanStatus::Safe);

    // The sibling's clean outcome must not displace the blocked verdict
    let kept = orch.security_of(phishing_id).expect("blocked scan still registered");
    assert_eq!(kept.status, ScanStatus::Blocked);
    assert!(!kept.threats.is_empty());
}

#[tokio::test]
async fn cancelled_scan_never_lands() {
    let orch = ScanOrchestrator::with_scorer(
        config(&dead_endpoint().await),
        Arc::new(FixedScorer(Some(0.9))),
    );

    let subject = ScanSubject::url("http://secure-login-verify.badsite.tk");
    let scan_id = subject.id;
    orch.submit(subject);
    orch.cancel(scan_id);

    assert!(orch.security_of(scan_id).is_none());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(orch.security_of(scan_id).is_none());
}
