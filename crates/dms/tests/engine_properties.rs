use dms::{DrowsinessEngine, EngineConfig};
use feature_engine::fixtures::synthetic_face;
use proptest::prelude::*;

#[test]
fn outputs_stay_finite_for_any_face_sequence() {
    let frame = (0.0f32..2.0, 0.0f32..3.0, any::<bool>());
    proptest!(|(frames in prop::collection::vec(frame, 1..80))| {
        let mut engine = DrowsinessEngine::new(EngineConfig::default()).unwrap();
        engine.initialize().unwrap();

        for (eye, mouth, face_present) in frames {
            let result = if face_present {
                engine.process_frame(&synthetic_face(eye, mouth), 320, 240)
            } else {
                engine.skip_frame()
            };

            prop_assert!(result.error.is_none());
            prop_assert!((0.0..=1.0).contains(&result.calibration_progress));
            for values in result.raw_features.iter().chain(result.smoothed_features.iter()) {
                prop_assert!(values.iter().all(|v| v.is_finite()));
            }
        }
    });
}

#[test]
fn progress_counts_only_face_frames() {
    proptest!(|(pattern in prop::collection::vec(any::<bool>(), 0..60))| {
        let mut engine = DrowsinessEngine::new(EngineConfig::default()).unwrap();
        engine.initialize().unwrap();

        let mut faces = 0usize;
        for face_present in pattern {
            if face_present {
                faces += 1;
                engine.process_frame(&synthetic_face(1.0, 1.0), 320, 240);
            } else {
                engine.skip_frame();
            }
        }

        let expected = (faces.min(25) as f32) / 25.0;
        prop_assert!((engine.calibration_progress() - expected).abs() < 1e-6);
    });
}
