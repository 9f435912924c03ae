//! Scan orchestrator
//!
//! Drives the full pipeline for each subject: feature extraction, the local
//! classifier and the remote verifier in parallel, ensemble merge, threat
//! classification and the per-message state machine. One scan per submitted
//! subject; per-message scans fan out over every URL in the text.
//!
//! Cancellation deregisters the scan before aborting its task, so a result
//! that races the abort finds no registration and is dropped instead of
//! landing on a dead record.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::ScannerConfig;
use crate::ensemble::{self, ScoreResult, ScoreSource, Verdict};
use crate::error::SecurityError;
use crate::events::{self, ScanEvent};
use crate::features;
use crate::message::{self, Message, MessageKind, MessageSecurity};
use crate::model::{LocalScorer, OnnxScorer};
use crate::remote::{self, RemoteVerdict};
use crate::security::SecurityStateMachine;
use crate::threat::{self, RiskLevel, ThreatRecord};

use super::subject::{ScanSubject, SubjectPayload};

// ============================================================================
// ORCHESTRATOR
// ============================================================================

struct ScanEntry {
    machine: SecurityStateMachine,
    handle: Option<JoinHandle<()>>,
}

struct Inner {
    config: ScannerConfig,
    scorer: Arc<dyn LocalScorer>,
    scans: Mutex<HashMap<Uuid, ScanEntry>>,
}

/// Coordinates all in-flight scans. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ScanOrchestrator {
    inner: Arc<Inner>,
}

impl ScanOrchestrator {
    pub fn new(config: ScannerConfig) -> Self {
        Self::with_scorer(config, Arc::new(OnnxScorer))
    }

    /// Construct with an alternative local scoring backend.
    pub fn with_scorer(config: ScannerConfig, scorer: Arc<dyn LocalScorer>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                scorer,
                scans: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Start a scan for one subject. Returns the initial `Scanning` record;
    /// the terminal outcome arrives via `security_of` and the event bus.
    ///
    /// Each subject is registered under its own id, so siblings from the
    /// same message progress independently and never overwrite each other's
    /// terminal verdict. Message-level roll-up is `scan_message`'s job.
    pub fn submit(&self, subject: ScanSubject) -> MessageSecurity {
        let scan_id = subject.id;
        let machine = SecurityStateMachine::new();
        let initial = machine.security().clone();

        {
            let mut scans = self.inner.scans.lock();
            scans.insert(
                scan_id,
                ScanEntry {
                    machine,
                    handle: None,
                },
            );
        }

        events::emit(ScanEvent::ScanStarted {
            message_id: scan_id,
        });

        // Short-circuit: unreachable verifier means the scan cannot produce a
        // trustworthy verdict, and that must never read as "safe".
        if let Err(err) = self.inner.config.validate() {
            log::error!("scan {} unavailable: {}", scan_id, err);
            self.apply_completion(scan_id, vec![unavailable_record(&subject, &err)]);
            return initial;
        }

        let this = self.clone();
        let handle = tokio::spawn(async move {
            let threats = this.scan_subject(&subject).await;
            this.apply_completion(scan_id, threats);
        });

        if let Some(entry) = self.inner.scans.lock().get_mut(&scan_id) {
            entry.handle = Some(handle);
        }

        initial
    }

    /// Scan a whole chat message: every URL in the text plus the text itself.
    /// `None` for system messages and messages with nothing to scan.
    pub async fn scan_message(&self, msg: &Message) -> Option<MessageSecurity> {
        if msg.kind == MessageKind::System {
            return None;
        }

        let urls = message::extract_urls(&msg.content);
        let mut threats = threat::scan_patterns(&msg.content);
        if urls.is_empty() && threats.is_empty() {
            return None;
        }

        let machine = SecurityStateMachine::new();
        {
            let mut scans = self.inner.scans.lock();
            scans.insert(
                msg.id,
                ScanEntry {
                    machine,
                    handle: None,
                },
            );
        }
        events::emit(ScanEvent::ScanStarted { message_id: msg.id });

        if let Err(err) = self.inner.config.validate() {
            log::error!("scan {} unavailable: {}", msg.id, err);
            let subject = ScanSubject::url(msg.content.clone()).from_message(msg.id);
            threats.push(unavailable_record(&subject, &err));
            self.apply_completion(msg.id, threats);
            return self.security_of(msg.id);
        }

        // All links scan in parallel; awaiting in spawn order keeps the
        // roll-up deterministic.
        let mut handles = Vec::new();
        for url in urls {
            // Denylisted domains skip the classifiers entirely.
            if let Some(hit) = threat::denylist_hit(&url) {
                threats.push(hit);
                continue;
            }
            let this = self.clone();
            let subject = ScanSubject::url(url).from_message(msg.id);
            handles.push(tokio::spawn(
                async move { this.scan_subject(&subject).await },
            ));
        }
        for handle in handles {
            if let Ok(found) = handle.await {
                threats.extend(found);
            }
        }

        self.apply_completion(msg.id, threats);
        self.security_of(msg.id)
    }

    /// Cancel an in-flight scan. Deregisters first, then aborts.
    pub fn cancel(&self, scan_id: Uuid) {
        let entry = self.inner.scans.lock().remove(&scan_id);
        match entry {
            Some(entry) => {
                if let Some(handle) = entry.handle {
                    handle.abort();
                }
                log::info!("scan {} cancelled", scan_id);
            }
            None => log::debug!("cancel for unknown scan {}", scan_id),
        }
    }

    /// Drop a finished scan's registration, handing back its terminal
    /// record. The consumer calls this once the record has been persisted
    /// onto the message, so the registry does not grow for the process
    /// lifetime. In-flight scans are not releasable; cancel them instead.
    pub fn release(&self, scan_id: Uuid) -> Option<MessageSecurity> {
        let mut scans = self.inner.scans.lock();
        let terminal = scans
            .get(&scan_id)
            .is_some_and(|e| e.machine.is_terminal());
        if !terminal {
            return None;
        }
        scans
            .remove(&scan_id)
            .map(|e| e.machine.security().clone())
    }

    /// Current security record for a scan, if registered.
    pub fn security_of(&self, scan_id: Uuid) -> Option<MessageSecurity> {
        self.inner
            .scans
            .lock()
            .get(&scan_id)
            .map(|e| e.machine.security().clone())
    }

    // ------------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------------

    /// Run the full classify pipeline for one subject.
    async fn scan_subject(&self, subject: &ScanSubject) -> Vec<ThreatRecord> {
        let (verdict, contributions) = self.run_pipeline(subject).await;

        for c in &contributions {
            match c.score {
                Some(s) => log::debug!("{} scored {:.3} in {} ms", c.source, s, c.latency_ms),
                None => log::debug!(
                    "{} unavailable after {} ms (error: {})",
                    c.source,
                    c.latency_ms,
                    c.error
                ),
            }
        }
        log::info!(
            "scan of {} -> phishing={} ({})",
            subject.content_label(),
            verdict.phishing,
            verdict.explanation
        );

        threat::classify(&verdict, subject)
    }

    /// Local and remote classifiers in parallel, then the ensemble merge.
    /// Both sources race the same deadline; whichever is slower than the
    /// budget contributes an absent score.
    async fn run_pipeline(&self, subject: &ScanSubject) -> (Verdict, Vec<ScoreResult>) {
        let config = &self.inner.config;
        let scorer = Arc::clone(&self.inner.scorer);

        let budget_ms = match &subject.payload {
            SubjectPayload::Url(_) => config.url_timeout_ms,
            _ => config.file_timeout_ms,
        };

        let local_fut = tokio::time::timeout(
            Duration::from_millis(budget_ms),
            local_score(scorer, subject),
        );
        let remote_fut = remote_verify(config, subject);
        let (local, remote) = tokio::join!(local_fut, remote_fut);

        let local = local.unwrap_or_else(|_| {
            log::warn!(
                "local classifier missed the {} ms deadline for {}",
                budget_ms,
                subject.content_label()
            );
            ScoreResult {
                source: ScoreSource::Local,
                score: None,
                error: true,
                latency_ms: budget_ms,
            }
        });

        let verdict = ensemble::merge(remote.verdict.as_ref(), local.score);
        (verdict, vec![local, remote.result])
    }

    /// Land a finished scan on its state machine. A completion for a scan
    /// that is already terminal or no longer registered is dropped.
    fn apply_completion(&self, scan_id: Uuid, threats: Vec<ThreatRecord>) {
        let outcome = {
            let mut scans = self.inner.scans.lock();
            let Some(entry) = scans.get_mut(&scan_id) else {
                log::warn!("dropping completion for unregistered scan {}", scan_id);
                return;
            };
            if entry.machine.is_terminal() {
                log::warn!("dropping duplicate completion for scan {}", scan_id);
                return;
            }
            match entry
                .machine
                .complete(threats, &self.inner.config.block_policy)
            {
                Ok(security) => security.clone(),
                Err(err) => {
                    // complete() only fails on terminal state, checked above
                    log::error!("scan {} completion rejected: {}", scan_id, err);
                    return;
                }
            }
        };

        if outcome.blocked {
            let reason = outcome
                .threats
                .iter()
                .max_by_key(|t| t.risk.severity_level())
                .map(|t| t.reasons.join("; "))
                .unwrap_or_else(|| "blocked by policy".to_string());
            events::emit(ScanEvent::MessageBlocked {
                message_id: scan_id,
                reason,
                threats: outcome.threats.clone(),
            });
        }
        events::emit(ScanEvent::ScanCompleted {
            message_id: scan_id,
            security: outcome,
        });
    }
}

// ============================================================================
// PIPELINE STAGES
// ============================================================================

struct RemoteOutcome {
    verdict: Option<RemoteVerdict>,
    result: ScoreResult,
}

/// Run the local classifier off the async runtime.
async fn local_score(scorer: Arc<dyn LocalScorer>, subject: &ScanSubject) -> ScoreResult {
    let started = Instant::now();

    let score = match &subject.payload {
        SubjectPayload::Url(raw_url) => {
            let vector = features::extract(raw_url);
            tokio::task::spawn_blocking(move || scorer.score_features(&vector))
                .await
                .ok()
                .flatten()
        }
        SubjectPayload::Image {
            pixels: Some(px), ..
        } => {
            let px = px.clone();
            tokio::task::spawn_blocking(move || {
                scorer.score_image(&px.data, px.width, px.height)
            })
            .await
            .ok()
            .flatten()
        }
        // Raw files and undecoded images have no local model
        _ => None,
    };

    ScoreResult {
        source: ScoreSource::Local,
        score,
        error: false,
        latency_ms: started.elapsed().as_millis() as u64,
    }
}

/// Call the remote verifier; every failure collapses to an absent source.
async fn remote_verify(config: &ScannerConfig, subject: &ScanSubject) -> RemoteOutcome {
    let started = Instant::now();

    let call = match &subject.payload {
        SubjectPayload::Url(raw_url) => remote::verify_url(config, raw_url).await,
        SubjectPayload::File { name, bytes } => remote::verify_file(config, name, bytes).await,
        SubjectPayload::Image { name, bytes, .. } => {
            remote::verify_file(config, name, bytes).await
        }
    };
    let latency_ms = started.elapsed().as_millis() as u64;

    match call {
        Ok(verdict) => {
            let score = verdict.image_score();
            RemoteOutcome {
                verdict: Some(verdict),
                result: ScoreResult {
                    source: ScoreSource::Remote,
                    score,
                    error: false,
                    latency_ms,
                },
            }
        }
        Err(err) => {
            log::warn!(
                "remote verification of {} failed: {}",
                subject.content_label(),
                err
            );
            RemoteOutcome {
                verdict: None,
                result: ScoreResult {
                    source: ScoreSource::Remote,
                    score: None,
                    error: true,
                    latency_ms,
                },
            }
        }
    }
}

fn unavailable_record(subject: &ScanSubject, err: &SecurityError) -> ThreatRecord {
    ThreatRecord::new(
        "scan_unavailable",
        RiskLevel::Suspicious,
        vec![format!("security scan unavailable: {}", err)],
        subject.content_label(),
    )
}

// ============================================================================
// TESTS
// ============================================================================
