//! ChatShield - chat content security scanning
//!
//! Scans URLs, files and images shared in chat for phishing and malware
//! before they reach the reader. Each subject runs through a local ONNX
//! classifier and a remote verification service in parallel, under a hard
//! deadline; an ensemble merge combines whatever signals arrived, a threat
//! classifier turns the verdict into explainable records, and a per-message
//! state machine decides whether content is shown, annotated or withheld.
//!
//! Entry point is [`scan::ScanOrchestrator`]; terminal outcomes are also
//! broadcast on the [`events`] bus.

pub mod config;
pub mod constants;
pub mod ensemble;
pub mod error;
pub mod events;
pub mod features;
pub mod message;
pub mod model;
pub mod remote;
pub mod scan;
pub mod security;
pub mod threat;

pub use config::ScannerConfig;
pub use error::{SecurityError, VerifyError};
pub use message::{Message, MessageSecurity, ScanStatus};
pub use scan::{ScanOrchestrator, ScanSubject};
pub use security::BlockPolicy;
pub use threat::{RiskLevel, ThreatRecord};
