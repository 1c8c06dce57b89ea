//! Synthetic faces for tests, benches and replay demos

use crate::landmarks::{Landmark, LandmarkSet, FACE_MESH_LANDMARKS};

const FACE_CENTER: Landmark = Landmark::planar(150.0, 120.0);

/// Build a face-mesh landmark set with adjustable eye and mouth openness.
///
/// `eye_open` and `mouth_open` scale the lid and lip spans; 1.0 is a
/// relaxed, open-eyed face with EAR ≈ 0.367 and MAR = 0.6. Points outside
/// the eye and mouth regions sit at the face centre.
pub fn synthetic_face(eye_open: f32, mouth_open: f32) -> LandmarkSet {
    let mut points = vec![FACE_CENTER; FACE_MESH_LANDMARKS];

    place_eye(&mut points, 90.0, eye_open, [33, 133], [[160, 144], [159, 145], [158, 153]], 1.0);
    place_eye(&mut points, 210.0, eye_open, [362, 263], [[387, 373], [386, 374], [385, 380]], -1.0);

    let (cx, cy) = (150.0, 150.0);
    let m = mouth_open;
    points[61] = Landmark::planar(cx - 10.0, cy);
    points[291] = Landmark::planar(cx + 10.0, cy);
    points[39] = Landmark::planar(cx - 5.0, cy - 5.0 * m);
    points[181] = Landmark::planar(cx - 5.0, cy + 5.0 * m);
    points[0] = Landmark::planar(cx, cy - 8.0 * m);
    points[17] = Landmark::planar(cx, cy + 8.0 * m);
    points[269] = Landmark::planar(cx + 5.0, cy - 5.0 * m);
    points[405] = Landmark::planar(cx + 5.0, cy + 5.0 * m);

    LandmarkSet::from_mesh(points)
}

/// `corners` are [outer, inner] as seen from the right eye; `mirror`
/// flips the lid offsets for the left eye.
fn place_eye(
    points: &mut [Landmark],
    cx: f32,
    open: f32,
    corners: [usize; 2],
    lids: [[usize; 2]; 3],
    mirror: f32,
) {
    let cy = 100.0;
    points[corners[0]] = Landmark::planar(cx + 10.0 * mirror, cy);
    points[corners[1]] = Landmark::planar(cx - 10.0 * mirror, cy);

    let spans = [(0.0, 5.0), (-3.0, 3.0), (3.0, 3.0)];
    for (pair, (dx, half)) in lids.iter().zip(spans) {
        let x = cx + dx * mirror;
        points[pair[0]] = Landmark::planar(x, cy - half * open);
        points[pair[1]] = Landmark::planar(x, cy + half * open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_eye_layout() {
        let face = synthetic_face(1.0, 1.0);
        assert_eq!(face[33], Landmark::planar(100.0, 100.0));
        assert_eq!(face[133], Landmark::planar(80.0, 100.0));
        assert_eq!(face[160], Landmark::planar(90.0, 95.0));
        assert_eq!(face[153], Landmark::planar(93.0, 103.0));
    }

    #[test]
    fn test_left_eye_is_mirrored() {
        let face = synthetic_face(1.0, 1.0);
        assert_eq!(face[362], Landmark::planar(200.0, 100.0));
        assert_eq!(face[263], Landmark::planar(220.0, 100.0));
        assert_eq!(face[386], Landmark::planar(213.0, 97.0));
    }
}
