//! Scan event bus
//!
//! Process-wide broadcast channel carrying scan lifecycle notifications.
//! Subscribers (UI layers, audit sinks) attach with `subscribe()`; emission
//! never blocks and silently drops when nobody is listening.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::message::MessageSecurity;
use crate::threat::ThreatRecord;

pub const EVENT_SCAN_STARTED: &str = "scan-started";
pub const EVENT_SCAN_COMPLETED: &str = "scan-completed";
pub const EVENT_MESSAGE_BLOCKED: &str = "message-blocked";

const CHANNEL_CAPACITY: usize = 256;

static BUS: Lazy<broadcast::Sender<ScanEvent>> =
    Lazy::new(|| broadcast::channel(CHANNEL_CAPACITY).0);

/// Lifecycle notifications emitted by the scan orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ScanEvent {
    ScanStarted {
        message_id: Uuid,
    },
    ScanCompleted {
        message_id: Uuid,
        security: MessageSecurity,
    },
    MessageBlocked {
        message_id: Uuid,
        reason: String,
        threats: Vec<ThreatRecord>,
    },
}

impl ScanEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ScanEvent::ScanStarted { .. } => EVENT_SCAN_STARTED,
            ScanEvent::ScanCompleted { .. } => EVENT_SCAN_COMPLETED,
            ScanEvent::MessageBlocked { .. } => EVENT_MESSAGE_BLOCKED,
        }
    }

    pub fn message_id(&self) -> Uuid {
        match self {
            ScanEvent::ScanStarted { message_id }
            | ScanEvent::ScanCompleted { message_id, .. }
            | ScanEvent::MessageBlocked { message_id, .. } => *message_id,
        }
    }
}

/// Attach a new listener to the event bus.
pub fn subscribe() -> broadcast::Receiver<ScanEvent> {
    BUS.subscribe()
}

/// Broadcast an event to all current listeners.
pub fn emit(event: ScanEvent) {
    let name = event.name();
    match BUS.send(event) {
        Ok(n) => log::debug!("emitted {} to {} listener(s)", name, n),
        Err(_) => log::debug!("emitted {} with no listeners", name),
    }
}

// ============================================================================
// TESTS
// ============================================================================
