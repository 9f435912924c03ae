//! Remote Module - deadline-bounded verification service client

pub mod cache;
pub mod types;
pub mod verifier;

pub use types::{RemoteVerdict, HEURISTIC_EXPLANATION};
pub use verifier::{verify_file, verify_url};
