//! Features Module - URL Feature Extraction Engine
//!
//! Deterministic URL -> fixed numeric feature vector. The layout is versioned
//! and hashed so a model artifact is never fed a vector it was not trained
//! for.

pub mod extract;
pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use extract::{extract, has_login_keyword, LOGIN_KEYWORDS};
pub use layout::{layout_hash, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::FeatureVector;
