//! Feature Vector Assembly

use std::f32::consts::PI;
use std::marker::PhantomData;

use tracing::trace;

use crate::geometry::{pair_distance, path_length};
use crate::landmarks::{
    LandmarkPair, LandmarkSet, Region, FACE_MESH_LANDMARKS, LEFT_EYE, MOUTH, RIGHT_EYE,
};
use crate::FeatureError;

/// Number of features in the vector
pub const FEATURE_COUNT: usize = 4;

/// Eye aspect ratio slot
pub const EAR: usize = 0;
/// Mouth aspect ratio slot
pub const MAR: usize = 1;
/// Pupil circularity slot
pub const PUC: usize = 2;
/// Mouth-over-eye slot
pub const MOE: usize = 3;

/// Substitutes for degenerate landmark geometry
pub const DEFAULT_EAR: f32 = 0.25;
pub const DEFAULT_MAR: f32 = 0.5;
pub const DEFAULT_PUC: f32 = 0.8;
pub const DEFAULT_MOE: f32 = 2.0;

/// Denominators at or below this are treated as collapsed
const MIN_DENOMINATOR: f32 = 0.001;

/// Features straight from landmark geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Raw;

/// Features expressed in calibrated standard deviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normalized;

/// Normalized features after temporal smoothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Smoothed;

/// Feature values in fixed `[EAR, MAR, PUC, MOE]` order.
///
/// The stage parameter keeps raw, normalized and smoothed vectors apart;
/// converting between stages is only possible through the calibration and
/// smoothing components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector<S> {
    values: [f32; FEATURE_COUNT],
    stage: PhantomData<S>,
}

pub type RawFeatures = FeatureVector<Raw>;
pub type NormalizedFeatures = FeatureVector<Normalized>;
pub type SmoothedFeatures = FeatureVector<Smoothed>;

impl<S> FeatureVector<S> {
    pub const fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            values,
            stage: PhantomData,
        }
    }

    pub fn values(&self) -> [f32; FEATURE_COUNT] {
        self.values
    }

    pub fn ear(&self) -> f32 {
        self.values[EAR]
    }

    pub fn mar(&self) -> f32 {
        self.values[MAR]
    }

    pub fn puc(&self) -> f32 {
        self.values[PUC]
    }

    pub fn moe(&self) -> f32 {
        self.values[MOE]
    }

    /// True when no component is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

impl<S> From<FeatureVector<S>> for [f32; FEATURE_COUNT] {
    fn from(v: FeatureVector<S>) -> Self {
        v.values
    }
}

/// Extracts drowsiness features from a landmark set
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    right_eye: Region,
    left_eye: Region,
    mouth: Region,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            right_eye: RIGHT_EYE,
            left_eye: LEFT_EYE,
            mouth: MOUTH,
        }
    }
}

impl FeatureExtractor {
    /// Extractor over the standard face-mesh regions
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor over custom regions; every index must lie inside the face mesh
    pub fn with_regions(right_eye: Region, left_eye: Region, mouth: Region) -> Result<Self, FeatureError> {
        for region in [&right_eye, &left_eye, &mouth] {
            let index = region.max_index();
            if index >= FACE_MESH_LANDMARKS {
                return Err(FeatureError::IndexOutOfRange {
                    index,
                    limit: FACE_MESH_LANDMARKS,
                });
            }
        }
        Ok(Self {
            right_eye,
            left_eye,
            mouth,
        })
    }

    /// Compute `[EAR, MAR, PUC, MOE]` for one frame
    pub fn extract(&self, landmarks: &LandmarkSet) -> RawFeatures {
        let ear = self.eye_aspect_ratio(landmarks);
        let mar = region_ratio(landmarks, &self.mouth, DEFAULT_MAR);
        let puc = self.pupil_circularity(landmarks);
        let moe = if ear > MIN_DENOMINATOR {
            finite_or(mar / ear, DEFAULT_MOE)
        } else {
            DEFAULT_MOE
        };

        FeatureVector::new([ear, mar, puc, moe])
    }

    /// Mean of both eyes' aspect ratios
    pub fn eye_aspect_ratio(&self, landmarks: &LandmarkSet) -> f32 {
        let left = region_ratio(landmarks, &self.left_eye, DEFAULT_EAR);
        let right = region_ratio(landmarks, &self.right_eye, DEFAULT_EAR);
        finite_or((left + right) / 2.0, DEFAULT_EAR)
    }

    /// Mean of both eyes' circularity
    pub fn pupil_circularity(&self, landmarks: &LandmarkSet) -> f32 {
        let left = eye_circularity(landmarks, &self.left_eye);
        let right = eye_circularity(landmarks, &self.right_eye);
        finite_or((left + right) / 2.0, DEFAULT_PUC)
    }
}

/// `(v1 + v2 + v3) / (3 * h)` for a region, or `default` when `h` collapses
fn region_ratio(landmarks: &LandmarkSet, region: &Region, default: f32) -> f32 {
    let h = pair_distance(landmarks, region.horizontal);
    if h > MIN_DENOMINATOR {
        let v: f32 = region
            .vertical
            .iter()
            .map(|&pair| pair_distance(landmarks, pair))
            .sum();
        finite_or(v / (3.0 * h), default)
    } else {
        trace!("Region span {} collapsed, using default {}", h, default);
        default
    }
}

/// Circularity `4πA / P²` of the octagon traced around one eye
fn eye_circularity(landmarks: &LandmarkSet, eye: &Region) -> f32 {
    let (h0, h1) = (eye.horizontal.0, eye.horizontal.1);
    let [upper, middle, lower] = eye.vertical;

    // Along the upper lid to the far corner, back along the lower lid
    let outline = [h0, upper.0, middle.0, lower.0, h1, lower.1, middle.1, upper.1, h0];
    let perimeter = path_length(landmarks, &outline);

    let radius = pair_distance(landmarks, LandmarkPair(upper.0, lower.1)) * 0.5;
    let area = PI * radius * radius;

    if perimeter > MIN_DENOMINATOR && area > MIN_DENOMINATOR {
        finite_or((4.0 * PI * area) / (perimeter * perimeter), DEFAULT_PUC)
    } else {
        trace!("Eye outline collapsed (perimeter {}, area {})", perimeter, area);
        DEFAULT_PUC
    }
}

fn finite_or(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        default
    }
}
