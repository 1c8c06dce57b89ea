//! Eye-closure Heuristic

use feature_engine::SmoothedFeatures;
use inference_engine::{ClassifierKind, DrowsinessClassifier, Verdict, DETECTION_FRAMES};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thresholds for the eye-closure rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicRules {
    /// Most recent frames inspected
    pub lookback: usize,
    /// Normalized EAR below this counts as a closed-eye frame
    pub ear_threshold: f32,
    /// Closed-eye frames within `lookback` needed for a drowsy verdict
    pub min_closed_frames: usize,
}

impl Default for HeuristicRules {
    fn default() -> Self {
        Self {
            lookback: 10,
            ear_threshold: -1.0,
            min_closed_frames: 6,
        }
    }
}

/// Flags drowsiness when the eyes stay well below their calibrated
/// openness for most of the recent frames
#[derive(Debug, Clone, Default)]
pub struct HeuristicClassifier {
    rules: HeuristicRules,
}

impl HeuristicClassifier {
    pub fn new(rules: HeuristicRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &HeuristicRules {
        &self.rules
    }

    /// Closed-eye frames among the most recent `lookback` entries
    pub fn closed_frames(&self, history: &[SmoothedFeatures]) -> usize {
        let start = history.len().saturating_sub(self.rules.lookback);
        history[start..]
            .iter()
            .filter(|f| f.ear() < self.rules.ear_threshold)
            .count()
    }
}

impl DrowsinessClassifier for HeuristicClassifier {
    fn classify(&mut self, history: &[SmoothedFeatures]) -> Verdict {
        if history.len() < DETECTION_FRAMES {
            return Verdict::Alert;
        }

        let closed = self.closed_frames(history);
        let verdict = if closed >= self.rules.min_closed_frames {
            Verdict::Drowsy
        } else {
            Verdict::Alert
        };
        debug!(
            "Heuristic: {}/{} closed-eye frames -> {}",
            closed,
            self.rules.lookback,
            verdict.as_str()
        );
        verdict
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Heuristic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Full window whose last `closed` frames have a low EAR
    fn history(closed: usize) -> Vec<SmoothedFeatures> {
        (0..DETECTION_FRAMES)
            .map(|i| {
                let ear = if i >= DETECTION_FRAMES - closed { -1.5 } else { 0.2 };
                SmoothedFeatures::new([ear, 0.0, 0.0, 0.0])
            })
            .collect()
    }

    #[test]
    fn test_six_closed_frames_is_drowsy() {
        let mut classifier = HeuristicClassifier::default();
        assert_eq!(classifier.classify(&history(6)), Verdict::Drowsy);
    }

    #[test]
    fn test_five_closed_frames_is_alert() {
        let mut classifier = HeuristicClassifier::default();
        assert_eq!(classifier.classify(&history(5)), Verdict::Alert);
    }

    #[test]
    fn test_only_recent_frames_count() {
        // Closed eyes at the start of the window are outside the lookback
        let history: Vec<SmoothedFeatures> = (0..DETECTION_FRAMES)
            .map(|i| {
                let ear = if i < 10 { -3.0 } else { 0.0 };
                SmoothedFeatures::new([ear, 0.0, 0.0, 0.0])
            })
            .collect();

        let mut classifier = HeuristicClassifier::default();
        assert_eq!(classifier.closed_frames(&history), 0);
        assert_eq!(classifier.classify(&history), Verdict::Alert);
    }

    #[test]
    fn test_threshold_is_strict() {
        let history = vec![SmoothedFeatures::new([-1.0, 0.0, 0.0, 0.0]); DETECTION_FRAMES];
        let mut classifier = HeuristicClassifier::default();
        assert_eq!(classifier.classify(&history), Verdict::Alert);
    }

    #[test]
    fn test_short_history_is_alert() {
        let history = vec![SmoothedFeatures::new([-5.0, 0.0, 0.0, 0.0]); DETECTION_FRAMES - 1];
        let mut classifier = HeuristicClassifier::default();
        assert_eq!(classifier.classify(&history), Verdict::Alert);
        assert_eq!(classifier.kind(), ClassifierKind::Heuristic);
    }
}
