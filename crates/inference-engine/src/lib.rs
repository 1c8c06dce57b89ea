//! Drowsiness Sequence Classification
//!
//! Classifies a window of smoothed per-frame features as drowsy or alert.
//! The model-backed path runs an ONNX sequence model over six overlapping
//! sub-sequences and votes on the per-sequence scores.

mod batch;
mod engine;
mod model;

pub use batch::SequenceBatch;
pub use engine::ModelClassifier;
#[cfg(feature = "onnxruntime")]
pub use model::OrtSequenceModel;
pub use model::{SequenceModel, TractSequenceModel};

use feature_engine::SmoothedFeatures;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Window length required before any classification
pub const DETECTION_FRAMES: usize = 20;
/// Frames per sub-sequence
pub const SEQUENCE_LENGTH: usize = 5;
/// Sub-sequences per classification
pub const NUM_SEQUENCES: usize = 6;
/// Offset between consecutive sub-sequence starts
pub const SEQUENCE_STRIDE: usize = 3;
/// Positive sub-sequence votes needed for a drowsy verdict
pub const DROWSY_THRESHOLD: usize = 5;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid output shape: expected {expected} scores, got {actual}")]
    InvalidOutputShape { expected: usize, actual: usize },
    #[error("Non-finite score {value} for sequence {index}")]
    NonFiniteScore { index: usize, value: f32 },
}

/// Classification outcome for a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    #[default]
    Alert,
    Drowsy,
}

impl Verdict {
    pub fn is_drowsy(&self) -> bool {
        matches!(self, Verdict::Drowsy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Alert => "alert",
            Verdict::Drowsy => "drowsy",
        }
    }
}

/// Which classification path is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Trained sequence model
    Model,
    /// Rule-based fallback on normalized EAR
    Heuristic,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierKind::Model => "model",
            ClassifierKind::Heuristic => "heuristic",
        }
    }
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classification path over smoothed feature history.
///
/// `history` is ordered oldest first. Implementations return
/// [`Verdict::Alert`] for histories shorter than [`DETECTION_FRAMES`] and
/// never fail; degraded paths log and report alert.
pub trait DrowsinessClassifier: Send {
    fn classify(&mut self, history: &[SmoothedFeatures]) -> Verdict;

    fn kind(&self) -> ClassifierKind;

    /// Release held resources. Later calls to `classify` return alert.
    fn close(&mut self) {}
}
