//! Ensemble Module - combines local and remote signals into one verdict

pub mod merger;
pub mod verdict;

pub use merger::{merge, COMBINED_THRESHOLD, LOCAL_ONLY_THRESHOLD};
pub use verdict::{ScoreResult, ScoreSource, Verdict};
