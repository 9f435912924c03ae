//! Model Module - local ML inference
//!
//! Process-wide cached ONNX sessions with load-once semantics. The
//! `LocalScorer` trait is the seam the orchestrator scores through, so tests
//! and alternative runtimes can swap the backend.

pub mod inference;

pub use inference::{engine_status, reset, score_features, score_image, EngineStatus};

use crate::features::FeatureVector;

/// Scoring backend for the local classifier.
pub trait LocalScorer: Send + Sync {
    /// Score a URL feature vector; `None` when the model is unavailable.
    fn score_features(&self, vector: &FeatureVector) -> Option<f32>;

    /// Score a decoded RGB8 image; `None` when the model is unavailable.
    fn score_image(&self, rgb: &[u8], width: u32, height: u32) -> Option<f32>;
}

/// Default backend over the process-wide ONNX sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxScorer;

impl LocalScorer for OnnxScorer {
    fn score_features(&self, vector: &FeatureVector) -> Option<f32> {
        inference::score_features(vector)
    }

    fn score_image(&self, rgb: &[u8], width: u32, height: u32) -> Option<f32> {
        inference::score_image(rgb, width, height)
    }
}
