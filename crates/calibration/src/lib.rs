//! Feature Calibration and Smoothing
//!
//! Learns a per-session baseline from the first frames, normalizes later
//! frames against it and smooths them over time.

mod calibrator;
mod normalizer;
mod smoother;
mod statistics;

pub use calibrator::{CalibrationStatus, Calibrator, DEFAULT_CALIBRATION_FRAMES};
pub use normalizer::{FeatureBaseline, NormalizationParams, DEFAULT_STD_FLOOR};
pub use smoother::{TemporalSmoother, DEFAULT_DECAY};
pub use statistics::SummaryStats;
