//! Model-backed Classification

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use feature_engine::SmoothedFeatures;
use tracing::{debug, info, warn};

use crate::batch::SequenceBatch;
use crate::model::SequenceModel;
use crate::{
    ClassifierKind, DrowsinessClassifier, InferenceError, Verdict, DROWSY_THRESHOLD,
    NUM_SEQUENCES,
};

/// Classifies a window by majority vote over per-sub-sequence model scores
pub struct ModelClassifier {
    /// `None` once closed
    model: Option<Box<dyn SequenceModel>>,
}

impl ModelClassifier {
    pub fn new(model: Box<dyn SequenceModel>) -> Self {
        info!("Model classifier ready");
        Self { model: Some(model) }
    }

    pub fn is_closed(&self) -> bool {
        self.model.is_none()
    }

    /// Run the model on `batch` and count sub-sequences scored drowsy
    fn positive_votes(&mut self, batch: &SequenceBatch) -> Result<usize, InferenceError> {
        let model = self
            .model
            .as_mut()
            .ok_or_else(|| InferenceError::InferenceFailed("classifier closed".into()))?;

        let scores = panic::catch_unwind(AssertUnwindSafe(|| model.score(batch)))
            .map_err(|_| InferenceError::InferenceFailed("model backend panicked".into()))??;

        if scores.len() != NUM_SEQUENCES {
            return Err(InferenceError::InvalidOutputShape {
                expected: NUM_SEQUENCES,
                actual: scores.len(),
            });
        }

        let mut votes = 0;
        for (index, &value) in scores.iter().enumerate() {
            if !value.is_finite() {
                return Err(InferenceError::NonFiniteScore { index, value });
            }
            if sigmoid(value) > 0.5 {
                votes += 1;
            }
        }
        Ok(votes)
    }
}

impl DrowsinessClassifier for ModelClassifier {
    fn classify(&mut self, history: &[SmoothedFeatures]) -> Verdict {
        let Some(batch) = SequenceBatch::from_history(history) else {
            debug!("History too short for classification: {} frames", history.len());
            return Verdict::Alert;
        };

        let start = Instant::now();
        match self.positive_votes(&batch) {
            Ok(votes) => {
                let verdict = if votes >= DROWSY_THRESHOLD {
                    Verdict::Drowsy
                } else {
                    Verdict::Alert
                };
                debug!(
                    "Model votes {}/{} -> {} in {}us",
                    votes,
                    NUM_SEQUENCES,
                    verdict.as_str(),
                    start.elapsed().as_micros()
                );
                verdict
            }
            Err(e) => {
                warn!("Model classification failed, reporting alert: {}", e);
                Verdict::Alert
            }
        }
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Model
    }

    fn close(&mut self) {
        if self.model.take().is_some() {
            info!("Model classifier closed");
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
