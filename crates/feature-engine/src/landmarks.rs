//! Face-mesh landmark sets and the anatomical regions the features read

use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::sync::Arc;

use crate::FeatureError;

/// Number of points produced by the face-mesh detector (478 with iris refinement)
pub const FACE_MESH_LANDMARKS: usize = 468;

/// A single landmark. `z` is a relative depth estimate and is ignored by the
/// feature math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Point on the image plane (z = 0)
    pub const fn planar(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

impl From<[f32; 3]> for Landmark {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Landmark> for [f32; 3] {
    fn from(p: Landmark) -> Self {
        [p.x, p.y, p.z]
    }
}

/// One frame of landmarks, validated to cover the full face mesh.
///
/// Cloning is cheap (shared storage) so results can pass the landmarks
/// through to the presentation layer without copying them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkSet {
    points: Arc<[Landmark]>,
}

impl LandmarkSet {
    /// Wrap detector output, rejecting sets shorter than the face mesh
    pub fn new(points: Vec<Landmark>) -> Result<Self, FeatureError> {
        if points.len() < FACE_MESH_LANDMARKS {
            return Err(FeatureError::TooFewLandmarks {
                expected: FACE_MESH_LANDMARKS,
                actual: points.len(),
            });
        }
        Ok(Self {
            points: points.into(),
        })
    }

    /// Caller guarantees `points` spans the full mesh
    pub(crate) fn from_mesh(points: Vec<Landmark>) -> Self {
        debug_assert!(points.len() >= FACE_MESH_LANDMARKS);
        Self {
            points: points.into(),
        }
    }

    /// Number of points in the set
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a validated set
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }
}

impl Index<usize> for LandmarkSet {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Landmark {
        &self.points[index]
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = FeatureError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<LandmarkSet> for Vec<Landmark> {
    fn from(set: LandmarkSet) -> Self {
        set.points.to_vec()
    }
}

/// Pair of landmark indices whose distance is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkPair(pub usize, pub usize);

/// A feature region: one horizontal span and three vertical spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub horizontal: LandmarkPair,
    pub vertical: [LandmarkPair; 3],
}

impl Region {
    /// Highest landmark index the region touches
    pub fn max_index(&self) -> usize {
        self.vertical
            .iter()
            .chain(std::iter::once(&self.horizontal))
            .map(|p| p.0.max(p.1))
            .max()
            .unwrap_or(0)
    }
}

/// Right eye: corners, then three lid pairs
pub const RIGHT_EYE: Region = Region {
    horizontal: LandmarkPair(33, 133),
    vertical: [
        LandmarkPair(160, 144),
        LandmarkPair(159, 145),
        LandmarkPair(158, 153),
    ],
};

/// Left eye: corners, then three lid pairs
pub const LEFT_EYE: Region = Region {
    horizontal: LandmarkPair(263, 362),
    vertical: [
        LandmarkPair(387, 373),
        LandmarkPair(386, 374),
        LandmarkPair(385, 380),
    ],
};

/// Mouth: corners, then three lip pairs
pub const MOUTH: Region = Region {
    horizontal: LandmarkPair(61, 291),
    vertical: [
        LandmarkPair(39, 181),
        LandmarkPair(0, 17),
        LandmarkPair(269, 405),
    ],
};
