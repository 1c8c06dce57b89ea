//! Engine configuration

use std::path::PathBuf;

use calibration::{DEFAULT_CALIBRATION_FRAMES, DEFAULT_DECAY, DEFAULT_STD_FLOOR};
use serde::{Deserialize, Serialize};

use crate::DmsError;

/// Drowsiness engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frames collected for the per-session baseline
    pub calibration_frames: usize,

    /// Frames between classifications once the window is full
    pub analysis_interval: usize,

    /// Weight kept on history by the temporal smoother
    pub smoothing_decay: f32,

    /// Lower bound on baseline deviation when normalizing
    pub normalization_floor: f32,

    /// ONNX sequence model; heuristic classification without one
    pub model_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calibration_frames: DEFAULT_CALIBRATION_FRAMES,
            analysis_interval: 15,
            smoothing_decay: DEFAULT_DECAY,
            normalization_floor: DEFAULT_STD_FLOOR,
            model_path: None,
        }
    }
}

impl EngineConfig {
    /// Create responsive config (classify every 5 frames)
    pub fn responsive() -> Self {
        Self {
            analysis_interval: 5,
            ..Default::default()
        }
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), DmsError> {
        if self.calibration_frames == 0 {
            return Err(DmsError::Config("calibration_frames must be at least 1".into()));
        }
        if self.analysis_interval == 0 {
            return Err(DmsError::Config("analysis_interval must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.smoothing_decay) {
            return Err(DmsError::Config(format!(
                "smoothing_decay must be in [0, 1), got {}",
                self.smoothing_decay
            )));
        }
        if !(self.normalization_floor > 0.0 && self.normalization_floor.is_finite()) {
            return Err(DmsError::Config(format!(
                "normalization_floor must be positive, got {}",
                self.normalization_floor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.calibration_frames, 25);
        assert_eq!(config.analysis_interval, 15);
        assert!(config.validate().is_ok());
        assert!(EngineConfig::responsive().validate().is_ok());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            EngineConfig { calibration_frames: 0, ..Default::default() },
            EngineConfig { analysis_interval: 0, ..Default::default() },
            EngineConfig { smoothing_decay: 1.0, ..Default::default() },
            EngineConfig { smoothing_decay: -0.1, ..Default::default() },
            EngineConfig { normalization_floor: 0.0, ..Default::default() },
            EngineConfig { normalization_floor: f32::NAN, ..Default::default() },
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(DmsError::Config(_))), "{config:?}");
        }
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"analysis_interval": 10, "model_path": "model.onnx"}"#)
                .unwrap();
        assert_eq!(config.analysis_interval, 10);
        assert_eq!(config.calibration_frames, 25);
        assert_eq!(config.model_path, Some(PathBuf::from("model.onnx")));
    }
}
