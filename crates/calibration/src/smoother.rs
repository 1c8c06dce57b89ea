//! Exponential Smoothing of Normalized Features

use feature_engine::{NormalizedFeatures, SmoothedFeatures, FEATURE_COUNT};

/// Weight kept on history at each step
pub const DEFAULT_DECAY: f32 = 0.9;

/// Exponential moving average across frames.
///
/// The first frame after construction or `reset` seeds the average
/// verbatim; later frames blend as `s * decay + (1 - decay) * x`.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    decay: f32,
    /// `None` until seeded
    state: Option<[f32; FEATURE_COUNT]>,
}

impl TemporalSmoother {
    /// Create a smoother; `decay` is clamped to [0, 1]
    pub fn new(decay: f32) -> Self {
        Self {
            decay: decay.clamp(0.0, 1.0),
            state: None,
        }
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Whether a frame has been seen since the last reset
    pub fn is_seeded(&self) -> bool {
        self.state.is_some()
    }

    /// Blend a frame into the average and return the new average
    pub fn smooth(&mut self, input: &NormalizedFeatures) -> SmoothedFeatures {
        let next = self.blend(input);
        self.state = Some(next);
        SmoothedFeatures::new(next)
    }

    /// Like `smooth`, but leaves the state untouched and returns `None`
    /// when the blended average would not be finite
    pub fn try_smooth(&mut self, input: &NormalizedFeatures) -> Option<SmoothedFeatures> {
        let next = self.blend(input);
        if next.iter().all(|v| v.is_finite()) {
            self.state = Some(next);
            Some(SmoothedFeatures::new(next))
        } else {
            None
        }
    }

    fn blend(&self, input: &NormalizedFeatures) -> [f32; FEATURE_COUNT] {
        let x = input.values();
        match self.state {
            None => x,
            Some(prev) => std::array::from_fn(|i| prev[i] * self.decay + (1.0 - self.decay) * x[i]),
        }
    }

    /// Current average, if seeded
    pub fn current(&self) -> Option<SmoothedFeatures> {
        self.state.map(SmoothedFeatures::new)
    }

    /// Return to the unseeded state
    pub fn reset(&mut self) {
        self.state = None;
    }
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY)
    }
}
