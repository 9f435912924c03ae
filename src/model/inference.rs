//! Inference Engine - ONNX Runtime Integration
//!
//! Lazily loads the URL and image model artifacts and scores feature vectors
//! or images. Model unavailability is never an error for callers: every
//! failure surfaces as `None` so the ensemble falls back to remote-only.

use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::{Array2, Array4};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::constants::{self, IMAGE_INPUT_SIZE};
use crate::features::{FeatureVector, FEATURE_COUNT};

// ============================================================================
// STATE
// ============================================================================

/// Latency stats
static LATENCY_SUM_US: AtomicU64 = AtomicU64::new(0);
static INFERENCE_COUNT: AtomicU64 = AtomicU64::new(0);

/// Lifecycle of one cached model artifact.
///
/// `Failed` is sticky: a load error is recorded once and every later call
/// returns `None` without retrying, until an explicit `reset()`.
enum ModelState {
    Unloaded,
    Ready(Session),
    Failed(String),
}

/// One process-wide model slot. Loading happens under the lock, so
/// concurrent first callers share a single in-flight load.
struct ModelSlot {
    name: &'static str,
    state: Mutex<ModelState>,
}

impl ModelSlot {
    const fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(ModelState::Unloaded),
        }
    }

    fn is_loaded(&self) -> bool {
        matches!(*self.state.lock(), ModelState::Ready(_))
    }

    fn reset(&self) {
        *self.state.lock() = ModelState::Unloaded;
    }

    /// Run `f` against the loaded session, loading it first if needed.
    fn with_session<F>(&self, path: Option<String>, f: F) -> Option<f32>
    where
        F: FnOnce(&mut Session) -> Result<f32, String>,
    {
        let mut state = self.state.lock();

        if matches!(*state, ModelState::Unloaded) {
            *state = match path {
                Some(p) => match load_session(&p) {
                    Ok(session) => {
                        log::info!("{} model loaded from {}", self.name, p);
                        ModelState::Ready(session)
                    }
                    Err(e) => {
                        log::warn!("{} model load failed: {}", self.name, e);
                        ModelState::Failed(e)
                    }
                },
                None => {
                    log::debug!("{} model path not configured", self.name);
                    ModelState::Failed("model path not configured".to_string())
                }
            };
        }

        match &mut *state {
            ModelState::Ready(session) => match f(session) {
                Ok(score) => Some(score.clamp(0.0, 1.0)),
                Err(e) => {
                    log::warn!("{} model inference failed: {}", self.name, e);
                    None
                }
            },
            ModelState::Failed(_) => None,
            ModelState::Unloaded => unreachable!("slot loaded above"),
        }
    }
}

static URL_MODEL: ModelSlot = ModelSlot::new("url");
static IMAGE_MODEL: ModelSlot = ModelSlot::new("image");

// ============================================================================
// LOADING
// ============================================================================

fn load_session(model_path: &str) -> Result<Session, String> {
    if !std::path::Path::new(model_path).exists() {
        return Err(format!("model not found: {}", model_path));
    }

    Session::builder()
        .map_err(|e| format!("failed to create session builder: {}", e))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| format!("failed to set optimization: {}", e))?
        .commit_from_file(model_path)
        .map_err(|e| format!("failed to load model: {}", e))
}

/// Drop both cached models so the next call retries the load.
/// The explicit reset hook for tests and model upgrades.
pub fn reset() {
    URL_MODEL.reset();
    IMAGE_MODEL.reset();
    log::info!("model slots reset");
}

// ============================================================================
// SCORING
// ============================================================================

/// Score a URL feature vector with the local model. `None` when the model is
/// unavailable or the vector does not match the current feature layout.
pub fn score_features(vector: &FeatureVector) -> Option<f32> {
    if let Err(e) = vector.validate() {
        log::warn!("refusing inference on incompatible vector: {}", e);
        return None;
    }

    let start = std::time::Instant::now();
    let input = Array2::from_shape_vec((1, FEATURE_COUNT), vector.as_slice().to_vec())
        .expect("shape matches FEATURE_COUNT");

    let score = URL_MODEL.with_session(constants::get_url_model_path(), |session| {
        run_scalar(session, input.into_dyn())
    });

    track_latency(start.elapsed().as_micros() as u64);
    score
}

/// Score a decoded RGB image with the local image model.
///
/// `rgb` is tightly packed RGB8 pixel data; it is resized to the model input
/// size with nearest-neighbour sampling and normalized to [0, 1], matching
/// the training-time preprocessing.
pub fn score_image(rgb: &[u8], width: u32, height: u32) -> Option<f32> {
    if width == 0 || height == 0 || rgb.len() != (width * height * 3) as usize {
        log::warn!(
            "image payload shape mismatch: {} bytes for {}x{}",
            rgb.len(),
            width,
            height
        );
        return None;
    }

    let start = std::time::Instant::now();
    let input = preprocess_image(rgb, width, height);

    let score = IMAGE_MODEL.with_session(constants::get_image_model_path(), |session| {
        run_scalar(session, input.into_dyn())
    });

    track_latency(start.elapsed().as_micros() as u64);
    score
}

/// Nearest-neighbour resize to the model input size, /255 normalize, NHWC.
fn preprocess_image(rgb: &[u8], width: u32, height: u32) -> Array4<f32> {
    let size = IMAGE_INPUT_SIZE as usize;
    let mut out = Array4::<f32>::zeros((1, size, size, 3));

    for y in 0..size {
        let src_y = ((y as u32 * height) / IMAGE_INPUT_SIZE).min(height - 1);
        for x in 0..size {
            let src_x = ((x as u32 * width) / IMAGE_INPUT_SIZE).min(width - 1);
            let base = ((src_y * width + src_x) * 3) as usize;
            for c in 0..3 {
                out[[0, y, x, c]] = rgb[base + c] as f32 / 255.0;
            }
        }
    }

    out
}

fn run_scalar(session: &mut Session, input: ndarray::ArrayD<f32>) -> Result<f32, String> {
    let output_name = session
        .outputs()
        .first()
        .map(|o| o.name().to_string())
        .ok_or_else(|| "no output defined".to_string())?;

    let input_tensor = Value::from_array(input).map_err(|e| format!("tensor error: {}", e))?;

    let outputs = session
        .run(ort::inputs![input_tensor])
        .map_err(|e| format!("inference failed: {}", e))?;

    let output = outputs
        .get(&output_name)
        .ok_or_else(|| "no output".to_string())?;

    let output_tensor = output
        .try_extract_tensor::<f32>()
        .map_err(|e| format!("extract error: {}", e))?;

    output_tensor
        .1
        .first()
        .copied()
        .ok_or_else(|| "empty output".to_string())
}

fn track_latency(elapsed_us: u64) {
    LATENCY_SUM_US.fetch_add(elapsed_us, Ordering::Relaxed);
    INFERENCE_COUNT.fetch_add(1, Ordering::Relaxed);
}

// ============================================================================
// STATUS
// ============================================================================

/// Engine status snapshot for observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub url_model_loaded: bool,
    pub image_model_loaded: bool,
    pub inference_device: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

pub fn engine_status() -> EngineStatus {
    let sum = LATENCY_SUM_US.load(Ordering::Relaxed);
    let count = INFERENCE_COUNT.load(Ordering::Relaxed);
    let avg = if count > 0 {
        (sum as f32 / count as f32) / 1000.0
    } else {
        0.0
    };

    EngineStatus {
        url_model_loaded: URL_MODEL.is_loaded(),
        image_model_loaded: IMAGE_MODEL.is_loaded(),
        inference_device: "ONNX Runtime (CPU)".to_string(),
        avg_latency_ms: avg,
        inference_count: count,
    }
}

// ============================================================================
// TESTS
// ============================================================================
