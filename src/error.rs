//! Error taxonomy
//!
//! Remote-verification failures are typed so the merger can treat timeout and
//! transport errors identically (source unavailable). Security errors are the
//! only fatal class: an invalid state transition is a programming defect, and
//! a missing verification endpoint must surface as "scan unavailable" rather
//! than a silent safe verdict.

use thiserror::Error;

use crate::message::ScanStatus;

/// Failures of the remote verification call.
///
/// All variants are absorbed at the merge point as an absent remote source;
/// none of them abort a scan.
#[derive(Debug, Clone, Error)]
pub enum VerifyError {
    /// The call exceeded its deadline and the transport was aborted.
    #[error("verification timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Connection refused, DNS failure, broken body, etc.
    #[error("verification transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("verification service returned HTTP {0}")]
    Status(u16),
}

/// Fatal conditions of the security pipeline.
#[derive(Debug, Clone, Error)]
pub enum SecurityError {
    /// Attempted mutation of an already-terminal message security record.
    #[error("invalid security transition: {from} -> {to}")]
    InvalidTransition { from: ScanStatus, to: ScanStatus },

    /// Required verification endpoint/credentials are missing.
    #[error("scanner configuration error: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_error_display() {
        let err = VerifyError::Timeout { timeout_ms: 8000 };
        assert!(err.to_string().contains("8000"));

        let err = VerifyError::Status(503);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = SecurityError::InvalidTransition {
            from: ScanStatus::Safe,
            to: ScanStatus::Blocked,
        };
        assert_eq!(
            err.to_string(),
            "invalid security transition: safe -> blocked"
        );
    }
}
