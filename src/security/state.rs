//! Security state machine
//!
//! Owns one message's security lifecycle: Scanning -> Safe | ThreatDetected
//! | Blocked, all terminal. A terminal state accepts no further transition;
//! attempting one is a programming defect and is rejected with a typed
//! error rather than applied.

use chrono::Utc;

use crate::error::SecurityError;
use crate::message::{MessageSecurity, ScanStatus};
use crate::threat::ThreatRecord;

use super::policy::BlockPolicy;

/// State machine over one MessageSecurity record.
#[derive(Debug, Clone)]
pub struct SecurityStateMachine {
    security: MessageSecurity,
}

impl SecurityStateMachine {
    /// Fresh machine in the `Scanning` state.
    pub fn new() -> Self {
        Self {
            security: MessageSecurity::new(),
        }
    }

    /// Read-only view of the owned record.
    pub fn security(&self) -> &MessageSecurity {
        &self.security
    }

    pub fn is_terminal(&self) -> bool {
        self.security.status.is_terminal()
    }

    /// Apply the scan outcome, transitioning to the terminal state.
    ///
    /// Empty threats => Safe. Any threat the policy blocks => Blocked
    /// (content withheld). Otherwise => ThreatDetected (shown, annotated).
    pub fn complete(
        &mut self,
        threats: Vec<ThreatRecord>,
        policy: &BlockPolicy,
    ) -> Result<&MessageSecurity, SecurityError> {
        let target = if threats.is_empty() {
            ScanStatus::Safe
        } else if threats.iter().any(|t| policy.blocks(t.risk)) {
            ScanStatus::Blocked
        } else {
            ScanStatus::ThreatDetected
        };

        if self.security.status.is_terminal() {
            return Err(SecurityError::InvalidTransition {
                from: self.security.status,
                to: target,
            });
        }

        log::info!(
            "security transition {} -> {} ({} threat(s))",
            self.security.status,
            target,
            threats.len()
        );

        self.security.status = target;
        self.security.blocked = target == ScanStatus::Blocked;
        self.security.threats = threats;
        self.security.updated_at = Utc::now();

        Ok(&self.security)
    }
}

impl Default for SecurityStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
