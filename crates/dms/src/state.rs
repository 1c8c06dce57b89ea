//! Engine lifecycle and session counters

use serde::{Deserialize, Serialize};

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    #[default]
    Uninitialized,
    /// Collecting baseline frames
    Calibrating,
    /// Baseline fixed; frames are classified
    Ready,
    /// Resources released; terminal
    Closed,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Calibrating => "calibrating",
            EngineState::Ready => "ready",
            EngineState::Closed => "closed",
        }
    }
}

/// Counters over the engine lifetime (kept across calibration resets)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Frames with a face that produced a result
    pub frames_processed: u64,
    /// Frames without a face
    pub frames_skipped: u64,
    /// Frames consumed by calibration
    pub calibration_frames: u64,
    /// Classifier invocations
    pub analyses_run: u64,
    /// Frames whose result reported drowsiness
    pub drowsy_frames: u64,
    /// Frames answered with an error result
    pub errors: u64,
}

impl SessionStats {
    /// Fraction of post-calibration frames reported drowsy
    pub fn drowsy_ratio(&self) -> f32 {
        let classified = self.frames_processed.saturating_sub(self.calibration_frames);
        if classified == 0 {
            return 0.0;
        }
        self.drowsy_frames as f32 / classified as f32
    }
}
