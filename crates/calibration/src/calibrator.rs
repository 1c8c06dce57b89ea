//! Per-session Baseline Calibration

use feature_engine::{RawFeatures, FEATURE_COUNT};
use tracing::{debug, info, warn};

use crate::normalizer::{FeatureBaseline, NormalizationParams, DEFAULT_STD_FLOOR};
use crate::statistics::SummaryStats;

/// Frames collected before the baseline is fixed
pub const DEFAULT_CALIBRATION_FRAMES: usize = 25;

/// Outcome of feeding one frame to the calibrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStatus {
    /// More frames needed
    InProgress {
        collected: usize,
        /// `collected / target`, in [0, 1)
        progress: f32,
    },
    /// Baseline fixed on this frame
    Complete(NormalizationParams),
}

/// Collects raw features from the first frames of a session and derives
/// the normalization baseline from them
#[derive(Debug, Clone)]
pub struct Calibrator {
    /// One sample column per feature
    samples: [Vec<f32>; FEATURE_COUNT],
    target: usize,
    std_floor: f32,
}

impl Calibrator {
    /// Create a calibrator collecting `target` frames (at least one)
    pub fn new(target: usize) -> Self {
        let target = target.max(1);
        Self {
            samples: std::array::from_fn(|_| Vec::with_capacity(target)),
            target,
            std_floor: DEFAULT_STD_FLOOR,
        }
    }

    /// Deviation floor handed to the produced parameters
    pub fn with_std_floor(mut self, floor: f32) -> Self {
        self.std_floor = floor;
        self
    }

    /// Frames required for completion
    pub fn target(&self) -> usize {
        self.target
    }

    /// Frames collected so far
    pub fn collected(&self) -> usize {
        self.samples[0].len()
    }

    /// Fraction of the target collected
    pub fn progress(&self) -> f32 {
        self.collected() as f32 / self.target as f32
    }

    /// Add one frame; returns the baseline once `target` frames are in
    pub fn calibrate(&mut self, raw: &RawFeatures) -> CalibrationStatus {
        for (column, value) in self.samples.iter_mut().zip(raw.values()) {
            column.push(value);
        }

        let collected = self.collected();
        debug!(
            "Calibration sample {}/{}: {:?}",
            collected,
            self.target,
            raw.values()
        );

        if collected < self.target {
            return CalibrationStatus::InProgress {
                collected,
                progress: self.progress(),
            };
        }

        let params = self.finish();
        self.reset();
        CalibrationStatus::Complete(params)
    }

    fn finish(&self) -> NormalizationParams {
        let baselines: [FeatureBaseline; FEATURE_COUNT] =
            std::array::from_fn(|i| SummaryStats::compute(&self.samples[i]).into());
        let params = NormalizationParams::new(baselines).with_std_floor(self.std_floor);

        info!(
            "Calibration completed over {} frames: EAR({:.4}, {:.4}) MAR({:.4}, {:.4}) PUC({:.4}, {:.4}) MOE({:.4}, {:.4})",
            self.target,
            baselines[0].mean,
            baselines[0].std,
            baselines[1].mean,
            baselines[1].std,
            baselines[2].mean,
            baselines[2].std,
            baselines[3].mean,
            baselines[3].std,
        );

        for feature in params.degenerate_features() {
            warn!(
                "Calibration deviation of feature {} below floor {}; normalization clamps it",
                feature,
                params.std_floor()
            );
        }

        params
    }

    /// Drop collected samples
    pub fn reset(&mut self) {
        for column in &mut self.samples {
            column.clear();
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new(DEFAULT_CALIBRATION_FRAMES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_rises_until_complete() {
        let mut calibrator = Calibrator::default();
        let raw = RawFeatures::new([0.3, 0.6, 0.15, 2.0]);

        for frame in 1..25 {
            match calibrator.calibrate(&raw) {
                CalibrationStatus::InProgress { collected, progress } => {
                    assert_eq!(collected, frame);
                    assert!((progress - frame as f32 / 25.0).abs() < 1e-6);
                }
                CalibrationStatus::Complete(_) => panic!("completed early at {frame}"),
            }
        }

        assert!(matches!(
            calibrator.calibrate(&raw),
            CalibrationStatus::Complete(_)
        ));
    }

    #[test]
    fn test_identical_frames_give_zero_std() {
        let mut calibrator = Calibrator::default();
        let raw = RawFeatures::new([0.3, 0.6, 0.15, 2.0]);

        let mut params = None;
        for _ in 0..25 {
            if let CalibrationStatus::Complete(p) = calibrator.calibrate(&raw) {
                params = Some(p);
            }
        }

        let params = params.expect("calibration should complete");
        for (baseline, expected) in params.baselines().iter().zip(raw.values()) {
            assert_eq!(baseline.std, 0.0);
            assert_eq!(baseline.mean, expected);
        }
        assert_eq!(params.degenerate_features().count(), 4);
    }

    #[test]
    fn test_mean_and_std_per_feature() {
        let mut calibrator = Calibrator::new(4);
        let frames = [
            [0.2, 1.0, 0.0, 5.0],
            [0.4, 1.0, 0.0, 5.0],
            [0.2, 3.0, 0.0, 5.0],
            [0.4, 3.0, 0.0, 5.0],
        ];

        let mut status = None;
        for f in frames {
            status = Some(calibrator.calibrate(&RawFeatures::new(f)));
        }

        let Some(CalibrationStatus::Complete(params)) = status else {
            panic!("expected completion");
        };
        let b = params.baselines();
        assert!((b[0].mean - 0.3).abs() < 1e-6);
        assert!((b[0].std - 0.1).abs() < 1e-6);
        assert!((b[1].mean - 2.0).abs() < 1e-6);
        assert!((b[1].std - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset_restarts_collection() {
        let mut calibrator = Calibrator::default();
        for _ in 0..10 {
            calibrator.calibrate(&RawFeatures::default());
        }
        calibrator.reset();
        assert_eq!(calibrator.collected(), 0);
        assert_eq!(calibrator.progress(), 0.0);
    }

    #[test]
    fn test_zero_target_clamped() {
        let mut calibrator = Calibrator::new(0);
        assert_eq!(calibrator.target(), 1);
        assert!(matches!(
            calibrator.calibrate(&RawFeatures::default()),
            CalibrationStatus::Complete(_)
        ));
    }
}
