//! Drowsiness engine state machine

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use calibration::{CalibrationStatus, Calibrator, NormalizationParams, TemporalSmoother};
use fallback::HeuristicClassifier;
use feature_engine::{FeatureExtractor, LandmarkSet, SmoothedFeatures};
use inference_engine::{
    ClassifierKind, DrowsinessClassifier, ModelClassifier, SequenceModel, Verdict,
    DETECTION_FRAMES,
};
use metrics::counter;
use sliding_window::SlidingWindow;
use tracing::{debug, error, info, warn};

use crate::analysis::FrameResult;
use crate::config::EngineConfig;
use crate::state::{EngineState, SessionStats};
use crate::DmsError;

/// Lifecycle with the data each phase owns
#[derive(Debug)]
enum Phase {
    Uninitialized,
    Calibrating,
    Ready(NormalizationParams),
    Closed,
}

/// Load the configured sequence model backend
pub fn load_sequence_model(path: &Path) -> Result<Box<dyn SequenceModel>, DmsError> {
    #[cfg(feature = "onnxruntime")]
    let model: Box<dyn SequenceModel> = Box::new(inference_engine::OrtSequenceModel::load(path)?);
    #[cfg(not(feature = "onnxruntime"))]
    let model: Box<dyn SequenceModel> = Box::new(inference_engine::TractSequenceModel::load(path)?);
    Ok(model)
}

/// Turns a stream of landmark frames into drowsiness verdicts.
///
/// Frames must be fed in arrival order: calibration, smoothing and the
/// feature window all depend on it. The first `calibration_frames` frames
/// fix the per-session baseline; afterwards every frame is normalized,
/// smoothed and pushed into a 20-frame window that is classified every
/// `analysis_interval` frames.
pub struct DrowsinessEngine {
    config: EngineConfig,
    phase: Phase,
    extractor: FeatureExtractor,
    calibrator: Calibrator,
    smoother: TemporalSmoother,
    window: SlidingWindow<SmoothedFeatures, DETECTION_FRAMES>,
    frames_since_analysis: usize,
    verdict: Verdict,
    classifier: Option<Box<dyn DrowsinessClassifier>>,
    /// Backend handed in by the embedder, consumed by `initialize`
    provided_model: Option<Box<dyn SequenceModel>>,
    stats: SessionStats,
}

impl DrowsinessEngine {
    /// Create an engine; the sequence model (if any) is loaded by `initialize`
    pub fn new(config: EngineConfig) -> Result<Self, DmsError> {
        config.validate()?;

        Ok(Self {
            extractor: FeatureExtractor::new(),
            calibrator: Calibrator::new(config.calibration_frames)
                .with_std_floor(config.normalization_floor),
            smoother: TemporalSmoother::new(config.smoothing_decay),
            window: SlidingWindow::new(),
            frames_since_analysis: 0,
            verdict: Verdict::Alert,
            classifier: None,
            provided_model: None,
            stats: SessionStats::default(),
            phase: Phase::Uninitialized,
            config,
        })
    }

    /// Create an engine around an already loaded model backend
    pub fn with_model(config: EngineConfig, model: Box<dyn SequenceModel>) -> Result<Self, DmsError> {
        let mut engine = Self::new(config)?;
        engine.provided_model = Some(model);
        Ok(engine)
    }

    /// Select the classification path and start calibrating.
    ///
    /// A missing or unloadable model selects the heuristic path; it is not
    /// an error. Repeated calls return the active path.
    pub fn initialize(&mut self) -> Result<ClassifierKind, DmsError> {
        match self.phase {
            Phase::Closed => return Err(DmsError::Closed),
            Phase::Calibrating | Phase::Ready(_) => {
                return self.classifier_kind().ok_or(DmsError::NotInitialized);
            }
            Phase::Uninitialized => {}
        }

        let classifier: Box<dyn DrowsinessClassifier> = match self.prepare_model() {
            Some(model) => Box::new(ModelClassifier::new(model)),
            None => Box::new(HeuristicClassifier::default()),
        };
        let kind = classifier.kind();

        self.classifier = Some(classifier);
        self.phase = Phase::Calibrating;
        info!(
            "Drowsiness engine initialized: classifier={}, calibration_frames={}, analysis_interval={}",
            kind, self.config.calibration_frames, self.config.analysis_interval
        );
        Ok(kind)
    }

    fn prepare_model(&mut self) -> Option<Box<dyn SequenceModel>> {
        if let Some(model) = self.provided_model.take() {
            return Some(model);
        }

        let Some(path) = &self.config.model_path else {
            info!("No sequence model configured, using heuristic classifier");
            return None;
        };

        match load_sequence_model(path) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!("Sequence model unavailable, using heuristic classifier: {}", e);
                None
            }
        }
    }

    /// Process one frame, stamped with the current time
    pub fn process_frame(&mut self, landmarks: &LandmarkSet, image_width: u32, image_height: u32) -> FrameResult {
        self.process_frame_at(landmarks, image_width, image_height, now_ms())
    }

    /// Process one frame captured at `timestamp_ms`.
    ///
    /// Failures are reported in the result's `error` field and leave the
    /// engine as it was before the call.
    pub fn process_frame_at(
        &mut self,
        landmarks: &LandmarkSet,
        image_width: u32,
        image_height: u32,
        timestamp_ms: u64,
    ) -> FrameResult {
        match self.try_process(landmarks) {
            Ok(mut result) => {
                result.image_width = image_width;
                result.image_height = image_height;
                result.timestamp_ms = timestamp_ms;

                self.stats.frames_processed += 1;
                counter!("dms_frames_processed_total").increment(1);
                if result.is_drowsy {
                    self.stats.drowsy_frames += 1;
                }
                result
            }
            Err(e) => {
                error!("Frame processing failed: {}", e);
                self.stats.errors += 1;
                counter!("dms_frame_errors_total").increment(1);
                FrameResult::failed(e, timestamp_ms)
            }
        }
    }

    fn try_process(&mut self, landmarks: &LandmarkSet) -> Result<FrameResult, DmsError> {
        match &self.phase {
            Phase::Uninitialized => Err(DmsError::NotInitialized),
            Phase::Closed => Err(DmsError::Closed),
            Phase::Calibrating => Ok(self.calibrate(landmarks)),
            Phase::Ready(params) => {
                let params = *params;
                self.analyze(landmarks, &params)
            }
        }
    }

    fn calibrate(&mut self, landmarks: &LandmarkSet) -> FrameResult {
        let raw = self.extractor.extract(landmarks);
        self.stats.calibration_frames += 1;

        let progress = match self.calibrator.calibrate(&raw) {
            CalibrationStatus::InProgress { progress, .. } => progress,
            CalibrationStatus::Complete(params) => {
                info!("Calibration complete, engine ready");
                self.phase = Phase::Ready(params);
                1.0
            }
        };

        FrameResult {
            face_detected: true,
            is_calibrating: true,
            calibration_progress: progress,
            raw_features: Some(raw.values()),
            landmarks: Some(landmarks.clone()),
            ..Default::default()
        }
    }

    fn analyze(&mut self, landmarks: &LandmarkSet, params: &NormalizationParams) -> Result<FrameResult, DmsError> {
        let raw = self.extractor.extract(landmarks);
        let normalized = params.normalize(&raw);
        if !normalized.is_finite() {
            return Err(DmsError::NonFinite("normalized"));
        }
        let smoothed = self
            .smoother
            .try_smooth(&normalized)
            .ok_or(DmsError::NonFinite("smoothed"))?;

        self.window.push(smoothed);
        self.frames_since_analysis += 1;

        if self.frames_since_analysis >= self.config.analysis_interval && self.window.is_full() {
            self.frames_since_analysis = 0;
            self.run_classifier();
        }

        debug!(
            "Frame features: raw={:?} smoothed={:?} verdict={}",
            raw.values(),
            smoothed.values(),
            self.verdict.as_str()
        );

        Ok(FrameResult {
            face_detected: true,
            is_calibrating: false,
            calibration_progress: 1.0,
            is_drowsy: self.verdict.is_drowsy(),
            raw_features: Some(raw.values()),
            smoothed_features: Some(smoothed.values()),
            landmarks: Some(landmarks.clone()),
            ..Default::default()
        })
    }

    fn run_classifier(&mut self) {
        let Some(classifier) = self.classifier.as_mut() else {
            return;
        };

        self.verdict = classifier.classify(self.window.as_slice());
        self.stats.analyses_run += 1;
        counter!("dms_classifications_total").increment(1);

        if self.verdict.is_drowsy() {
            counter!("dms_drowsy_verdicts_total").increment(1);
            info!("Drowsiness detected ({} classifier)", classifier.kind());
        } else {
            debug!("Classification: alert ({} classifier)", classifier.kind());
        }
    }

    /// Record a frame without a detected face, stamped with the current time
    pub fn skip_frame(&mut self) -> FrameResult {
        self.skip_frame_at(0, 0, now_ms())
    }

    /// Record a frame without a detected face.
    ///
    /// Calibration, smoothing and the window do not advance.
    pub fn skip_frame_at(&mut self, image_width: u32, image_height: u32, timestamp_ms: u64) -> FrameResult {
        self.stats.frames_skipped += 1;
        counter!("dms_frames_skipped_total").increment(1);
        debug!("No face in frame, skipping");

        FrameResult {
            face_detected: false,
            is_calibrating: matches!(self.phase, Phase::Calibrating),
            calibration_progress: self.calibration_progress(),
            image_width,
            image_height,
            timestamp_ms,
            ..Default::default()
        }
    }

    /// Discard the baseline and all temporal state, then recalibrate.
    ///
    /// The active classifier is kept.
    pub fn reset_calibration(&mut self) {
        match self.phase {
            Phase::Calibrating | Phase::Ready(_) => {
                self.calibrator.reset();
                self.smoother.reset();
                self.window.clear();
                self.frames_since_analysis = 0;
                self.verdict = Verdict::Alert;
                self.phase = Phase::Calibrating;
                info!("Calibration reset");
            }
            Phase::Uninitialized | Phase::Closed => {
                warn!("Ignoring calibration reset in {} state", self.state().as_str());
            }
        }
    }

    /// Release classifier resources; idempotent
    pub fn close(&mut self) {
        if matches!(self.phase, Phase::Closed) {
            return;
        }
        if let Some(classifier) = self.classifier.as_mut() {
            classifier.close();
        }
        self.provided_model = None;
        self.phase = Phase::Closed;
        info!(
            "Drowsiness engine closed: {} frames processed, {} analyses",
            self.stats.frames_processed, self.stats.analyses_run
        );
    }

    pub fn state(&self) -> EngineState {
        match self.phase {
            Phase::Uninitialized => EngineState::Uninitialized,
            Phase::Calibrating => EngineState::Calibrating,
            Phase::Ready(_) => EngineState::Ready,
            Phase::Closed => EngineState::Closed,
        }
    }

    /// Active classification path, once initialized
    pub fn classifier_kind(&self) -> Option<ClassifierKind> {
        self.classifier.as_ref().map(|c| c.kind())
    }

    /// Calibration completion in [0, 1]
    pub fn calibration_progress(&self) -> f32 {
        match self.phase {
            Phase::Uninitialized => 0.0,
            Phase::Calibrating => self.calibrator.progress(),
            Phase::Ready(_) | Phase::Closed => 1.0,
        }
    }

    /// Baseline in use, once calibrated
    pub fn normalization_params(&self) -> Option<&NormalizationParams> {
        match &self.phase {
            Phase::Ready(params) => Some(params),
            _ => None,
        }
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
