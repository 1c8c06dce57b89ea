//! Sequence Batch Construction

use feature_engine::{SmoothedFeatures, FEATURE_COUNT};

use crate::{DETECTION_FRAMES, NUM_SEQUENCES, SEQUENCE_LENGTH, SEQUENCE_STRIDE};

/// Overlapping sub-sequences cut from a feature window, shaped
/// `[NUM_SEQUENCES][SEQUENCE_LENGTH][FEATURE_COUNT]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceBatch {
    data: [[[f32; FEATURE_COUNT]; SEQUENCE_LENGTH]; NUM_SEQUENCES],
}

impl SequenceBatch {
    /// Tensor shape handed to model backends
    pub const SHAPE: [usize; 3] = [NUM_SEQUENCES, SEQUENCE_LENGTH, FEATURE_COUNT];

    /// Cut the batch from the most recent [`DETECTION_FRAMES`] entries of
    /// `history`. Sub-sequence `k` starts at `k * SEQUENCE_STRIDE`.
    ///
    /// Returns `None` when fewer than [`DETECTION_FRAMES`] entries exist.
    pub fn from_history(history: &[SmoothedFeatures]) -> Option<Self> {
        let window = history.get(history.len().checked_sub(DETECTION_FRAMES)?..)?;
        let data = std::array::from_fn(|seq| {
            let start = seq * SEQUENCE_STRIDE;
            std::array::from_fn(|frame| window[start + frame].values())
        });
        Some(Self { data })
    }

    pub fn sequences(&self) -> &[[[f32; FEATURE_COUNT]; SEQUENCE_LENGTH]; NUM_SEQUENCES] {
        &self.data
    }

    /// Row-major copy of the batch
    pub fn flatten(&self) -> Vec<f32> {
        self.data
            .iter()
            .flat_map(|seq| seq.iter())
            .flat_map(|frame| frame.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(len: usize) -> Vec<SmoothedFeatures> {
        (0..len)
            .map(|i| SmoothedFeatures::new([i as f32, 0.0, 0.0, -(i as f32)]))
            .collect()
    }

    #[test]
    fn test_short_history_rejected() {
        assert!(SequenceBatch::from_history(&history(19)).is_none());
        assert!(SequenceBatch::from_history(&[]).is_none());
    }

    #[test]
    fn test_sequence_offsets() {
        let batch = SequenceBatch::from_history(&history(20)).expect("full window");
        for (k, seq) in batch.sequences().iter().enumerate() {
            let start = (k * SEQUENCE_STRIDE) as f32;
            let ears: Vec<f32> = seq.iter().map(|frame| frame[0]).collect();
            assert_eq!(ears, vec![start, start + 1.0, start + 2.0, start + 3.0, start + 4.0]);
        }
        // Last sub-sequence ends on the newest frame
        assert_eq!(batch.sequences()[5][4][0], 19.0);
    }

    #[test]
    fn test_uses_most_recent_frames() {
        let batch = SequenceBatch::from_history(&history(26)).expect("full window");
        assert_eq!(batch.sequences()[0][0][0], 6.0);
        assert_eq!(batch.sequences()[5][4][0], 25.0);
    }

    #[test]
    fn test_flatten_layout() {
        let batch = SequenceBatch::from_history(&history(20)).expect("full window");
        let flat = batch.flatten();
        assert_eq!(flat.len(), NUM_SEQUENCES * SEQUENCE_LENGTH * FEATURE_COUNT);
        // [seq 1][frame 0] is history[3]
        let offset = SEQUENCE_LENGTH * FEATURE_COUNT;
        assert_eq!(&flat[offset..offset + FEATURE_COUNT], &[3.0, 0.0, 0.0, -3.0]);
    }
}
