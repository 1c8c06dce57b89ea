use fallback::HeuristicClassifier;
use feature_engine::SmoothedFeatures;
use inference_engine::{DrowsinessClassifier, Verdict, DETECTION_FRAMES};
use proptest::prelude::*;

#[test]
fn verdict_matches_recent_closed_count() {
    proptest!(|(ears in prop::collection::vec(-4.0f32..4.0, DETECTION_FRAMES..40))| {
        let history: Vec<SmoothedFeatures> = ears
            .iter()
            .map(|&ear| SmoothedFeatures::new([ear, 0.0, 0.0, 0.0]))
            .collect();

        let closed = ears[ears.len() - 10..].iter().filter(|&&e| e < -1.0).count();
        let expected = if closed >= 6 { Verdict::Drowsy } else { Verdict::Alert };

        let mut classifier = HeuristicClassifier::default();
        prop_assert_eq!(classifier.classify(&history), expected);
    });
}
