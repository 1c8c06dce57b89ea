//! Per-frame analysis results

use feature_engine::{LandmarkSet, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// Result of processing one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// Whether landmarks were supplied for this frame
    pub face_detected: bool,

    /// Frame was consumed by calibration
    pub is_calibrating: bool,

    /// Calibration completion in [0, 1]
    pub calibration_progress: f32,

    /// Most recent verdict (persists between analyses)
    pub is_drowsy: bool,

    /// EAR, MAR, PUC, MOE from landmark geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_features: Option<[f32; FEATURE_COUNT]>,

    /// Normalized and smoothed features (ready state only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothed_features: Option<[f32; FEATURE_COUNT]>,

    /// Input landmarks, passed through for overlays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<LandmarkSet>,

    pub image_width: u32,
    pub image_height: u32,
    pub timestamp_ms: u64,

    /// Set when the frame could not be processed; other fields are then
    /// defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FrameResult {
    /// Result carrying only an error description
    pub fn failed(error: impl ToString, timestamp_ms: u64) -> Self {
        Self {
            error: Some(error.to_string()),
            timestamp_ms,
            ..Default::default()
        }
    }

    /// Check if the frame produced an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_carries_only_error() {
        let result = FrameResult::failed("boom", 42);
        assert!(result.is_error());
        assert!(!result.face_detected);
        assert!(result.raw_features.is_none());
        assert_eq!(result.timestamp_ms, 42);
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let result = FrameResult {
            face_detected: true,
            is_calibrating: true,
            calibration_progress: 0.5,
            raw_features: Some([0.3, 0.6, 0.15, 2.0]),
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["is_calibrating"], true);
        assert!(json.get("smoothed_features").is_none());
        assert!(json.get("error").is_none());
        assert_eq!(json["raw_features"].as_array().map(Vec::len), Some(4));
    }
}
