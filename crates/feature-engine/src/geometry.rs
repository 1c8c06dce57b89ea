//! Planar distance helpers

use crate::landmarks::{Landmark, LandmarkPair, LandmarkSet};

/// Euclidean distance on the image plane; depth is ignored
pub fn distance(a: &Landmark, b: &Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Distance between the two landmarks of a pair
pub fn pair_distance(landmarks: &LandmarkSet, pair: LandmarkPair) -> f32 {
    distance(&landmarks[pair.0], &landmarks[pair.1])
}

/// Length of the open polyline through `indices`, in order
pub fn path_length(landmarks: &LandmarkSet, indices: &[usize]) -> f32 {
    indices
        .windows(2)
        .map(|w| distance(&landmarks[w[0]], &landmarks[w[1]]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_3_4_5() {
        let d = distance(&Landmark::planar(0.0, 0.0), &Landmark::planar(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_depth_ignored() {
        let a = Landmark::new(1.0, 1.0, -50.0);
        let b = Landmark::new(1.0, 1.0, 50.0);
        assert_eq!(distance(&a, &b), 0.0);
    }
}
