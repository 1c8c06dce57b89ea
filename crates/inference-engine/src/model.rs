//! Sequence Model Backends

use std::path::{Path, PathBuf};

use tract_onnx::prelude::*;
use tracing::{debug, error, info};

use crate::batch::SequenceBatch;
use crate::InferenceError;

/// A trained model scoring each sub-sequence of a batch.
///
/// Returns one raw logit per sub-sequence, in batch order.
pub trait SequenceModel: Send {
    fn score(&mut self, batch: &SequenceBatch) -> Result<Vec<f32>, InferenceError>;
}

impl<M: SequenceModel + ?Sized> SequenceModel for Box<M> {
    fn score(&mut self, batch: &SequenceBatch) -> Result<Vec<f32>, InferenceError> {
        (**self).score(batch)
    }
}

/// ONNX sequence model executed with tract
pub struct TractSequenceModel {
    plan: TypedRunnableModel<TypedModel>,
    path: PathBuf,
}

impl TractSequenceModel {
    /// Load and optimize an ONNX model with a fixed `[6, 5, 4]` f32 input
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading sequence model from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(SequenceBatch::SHAPE).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                error!("Failed to load sequence model {}: {:#}", path.display(), e);
                InferenceError::ModelLoadError(format!("{}: {:#}", path.display(), e))
            })?;

        info!("Sequence model loaded successfully");
        Ok(Self {
            plan,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SequenceModel for TractSequenceModel {
    fn score(&mut self, batch: &SequenceBatch) -> Result<Vec<f32>, InferenceError> {
        let input = Tensor::from_shape::<f32>(&SequenceBatch::SHAPE, &batch.flatten())
            .map_err(|e| InferenceError::InferenceFailed(format!("{e:#}")))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(format!("{e:#}")))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".into()))?;
        let scores: Vec<f32> = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(format!("{e:#}")))?
            .iter()
            .copied()
            .collect();

        debug!("Sequence scores: {:?}", scores);
        Ok(scores)
    }
}

#[cfg(feature = "onnxruntime")]
mod onnxruntime {
    use std::path::Path;

    use ndarray::Array3;
    use ort::session::{builder::GraphOptimizationLevel, Session};
    use tracing::{debug, error, info};

    use super::SequenceModel;
    use crate::batch::SequenceBatch;
    use crate::{InferenceError, NUM_SEQUENCES, SEQUENCE_LENGTH};
    use feature_engine::FEATURE_COUNT;

    /// ONNX sequence model executed with ONNX Runtime
    pub struct OrtSequenceModel {
        session: Session,
    }

    impl OrtSequenceModel {
        pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
            let path = path.as_ref();
            info!("Loading sequence model from {} (onnxruntime)", path.display());

            let session = Session::builder()
                .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
                .and_then(|builder| builder.commit_from_file(path))
                .map_err(|e| {
                    error!("Failed to load sequence model {}: {}", path.display(), e);
                    InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
                })?;

            Ok(Self { session })
        }
    }

    impl SequenceModel for OrtSequenceModel {
        fn score(&mut self, batch: &SequenceBatch) -> Result<Vec<f32>, InferenceError> {
            let input = Array3::from_shape_vec(
                (NUM_SEQUENCES, SEQUENCE_LENGTH, FEATURE_COUNT),
                batch.flatten(),
            )
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

            let outputs = self
                .session
                .run(ort::inputs![input].map_err(|e| InferenceError::InferenceFailed(e.to_string()))?)
                .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

            let scores: Vec<f32> = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
                .iter()
                .copied()
                .collect();

            debug!("Sequence scores: {:?}", scores);
            Ok(scores)
        }
    }
}

#[cfg(feature = "onnxruntime")]
pub use onnxruntime::OrtSequenceModel;
