use feature_engine::SmoothedFeatures;
use inference_engine::{SequenceBatch, DETECTION_FRAMES, SEQUENCE_STRIDE};
use proptest::prelude::*;

#[test]
fn batch_rows_follow_stride_offsets() {
    proptest!(|(len in DETECTION_FRAMES..60usize, seed in any::<u16>())| {
        let history: Vec<SmoothedFeatures> = (0..len)
            .map(|i| SmoothedFeatures::new([(i + seed as usize) as f32, i as f32, 0.0, 1.0]))
            .collect();

        let batch = SequenceBatch::from_history(&history).expect("history is long enough");
        let base = len - DETECTION_FRAMES;
        for (k, sequence) in batch.sequences().iter().enumerate() {
            for (j, frame) in sequence.iter().enumerate() {
                prop_assert_eq!(*frame, history[base + k * SEQUENCE_STRIDE + j].values());
            }
        }
    });
}
