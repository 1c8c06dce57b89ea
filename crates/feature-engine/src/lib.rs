//! Facial Feature Engine
//!
//! Turns one frame of face-mesh landmarks into the four drowsiness metrics
//! used downstream: eye aspect ratio, mouth aspect ratio, pupil circularity
//! and mouth-over-eye ratio.

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod geometry;
mod features;
mod landmarks;

pub use features::{
    FeatureExtractor, FeatureVector, Normalized, NormalizedFeatures, Raw, RawFeatures, Smoothed,
    SmoothedFeatures, DEFAULT_EAR, DEFAULT_MAR, DEFAULT_MOE, DEFAULT_PUC, EAR, FEATURE_COUNT, MAR,
    MOE, PUC,
};
pub use landmarks::{
    Landmark, LandmarkPair, LandmarkSet, Region, FACE_MESH_LANDMARKS, LEFT_EYE, MOUTH, RIGHT_EYE,
};

use thiserror::Error;

/// Errors raised while building feature inputs
#[derive(Debug, Clone, Error)]
pub enum FeatureError {
    #[error("Landmark set too short: expected at least {expected} points, got {actual}")]
    TooFewLandmarks { expected: usize, actual: usize },

    #[error("Region references landmark {index}, outside the {limit}-point face mesh")]
    IndexOutOfRange { index: usize, limit: usize },
}
