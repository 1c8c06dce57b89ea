//! Driver Monitoring System (DMS)
//!
//! Drowsiness detection from per-frame face-mesh landmarks:
//! - Per-session calibration of eye and mouth metrics
//! - Temporal smoothing and a rolling feature window
//! - Periodic windowed classification (sequence model or heuristic)
//! - A latest-frame worker for camera-rate producers

pub mod analysis;
pub mod config;
pub mod engine;
pub mod state;
pub mod worker;

pub use analysis::FrameResult;
pub use config::EngineConfig;
pub use engine::{load_sequence_model, DrowsinessEngine};
pub use state::{EngineState, SessionStats};
pub use worker::{FrameInput, FrameWorker, WorkerHandle};

pub use feature_engine::{Landmark, LandmarkSet};
pub use inference_engine::{ClassifierKind, SequenceModel, Verdict};

use feature_engine::FeatureError;
use inference_engine::InferenceError;
use thiserror::Error;

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Engine not initialized")]
    NotInitialized,

    #[error("Engine closed")]
    Closed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Non-finite {0} features")]
    NonFinite(&'static str),

    #[error("Invalid landmarks: {0}")]
    Feature(#[from] FeatureError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Worker failed: {0}")]
    Worker(String),
}
