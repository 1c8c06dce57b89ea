//! Z-score Normalization against a Calibrated Baseline

use feature_engine::{NormalizedFeatures, RawFeatures, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

use crate::statistics::SummaryStats;

/// Default lower bound applied to the deviation when normalizing
pub const DEFAULT_STD_FLOOR: f32 = 0.0001;

/// Baseline of one feature
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureBaseline {
    pub mean: f32,
    /// Population standard deviation as measured; may be zero
    pub std: f32,
}

impl From<SummaryStats> for FeatureBaseline {
    fn from(stats: SummaryStats) -> Self {
        Self {
            mean: stats.mean,
            std: stats.std_dev,
        }
    }
}

/// Per-feature mean/std derived from calibration, in `[EAR, MAR, PUC, MOE]` order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    baselines: [FeatureBaseline; FEATURE_COUNT],
    /// Deviations below this are raised to it before dividing
    std_floor: f32,
}

impl NormalizationParams {
    pub fn new(baselines: [FeatureBaseline; FEATURE_COUNT]) -> Self {
        Self {
            baselines,
            std_floor: DEFAULT_STD_FLOOR,
        }
    }

    /// Override the deviation floor (non-positive values are ignored)
    pub fn with_std_floor(mut self, floor: f32) -> Self {
        if floor > 0.0 {
            self.std_floor = floor;
        }
        self
    }

    pub fn baselines(&self) -> &[FeatureBaseline; FEATURE_COUNT] {
        &self.baselines
    }

    pub fn std_floor(&self) -> f32 {
        self.std_floor
    }

    /// Features whose measured deviation is below the floor
    pub fn degenerate_features(&self) -> impl Iterator<Item = usize> + '_ {
        self.baselines
            .iter()
            .enumerate()
            .filter(|(_, b)| b.std.is_nan() || b.std < self.std_floor)
            .map(|(i, _)| i)
    }

    /// Express raw features in baseline standard deviations
    pub fn normalize(&self, raw: &RawFeatures) -> NormalizedFeatures {
        let values = raw.values();
        NormalizedFeatures::new(std::array::from_fn(|i| {
            let baseline = self.baselines[i];
            (values[i] - baseline.mean) / baseline.std.max(self.std_floor)
        }))
    }
}
