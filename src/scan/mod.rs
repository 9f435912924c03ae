//! Scan Module - subjects and the pipeline orchestrator

pub mod orchestrator;
pub mod subject;

pub use orchestrator::ScanOrchestrator;
pub use subject::{RgbPixels, ScanSubject, SubjectKind, SubjectPayload};
