//! Latest-frame worker
//!
//! Runs an engine off the producer's thread. Frames are handed over through
//! a `watch` channel, so a producer outpacing the engine overwrites pending
//! frames instead of queueing them; results leave on a bounded channel.

use feature_engine::{Landmark, LandmarkSet};
use inference_engine::ClassifierKind;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::analysis::FrameResult;
use crate::engine::DrowsinessEngine;
use crate::state::SessionStats;
use crate::DmsError;

/// One frame from the landmark detector
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInput {
    /// `None` when no face was found
    pub landmarks: Option<LandmarkSet>,
    pub image_width: u32,
    pub image_height: u32,
    pub timestamp_ms: u64,
}

impl FrameInput {
    /// Validate raw detector output into a frame
    pub fn new(
        points: Option<Vec<Landmark>>,
        image_width: u32,
        image_height: u32,
        timestamp_ms: u64,
    ) -> Result<Self, DmsError> {
        let landmarks = points.map(LandmarkSet::new).transpose()?;
        Ok(Self {
            landmarks,
            image_width,
            image_height,
            timestamp_ms,
        })
    }

    /// Frame without a detected face
    pub fn no_face(image_width: u32, image_height: u32, timestamp_ms: u64) -> Self {
        Self {
            landmarks: None,
            image_width,
            image_height,
            timestamp_ms,
        }
    }
}

enum Control {
    ResetCalibration,
    Shutdown,
}

/// Spawns engines onto the tokio runtime
pub struct FrameWorker;

impl FrameWorker {
    /// Initialize `engine` and start processing frames on the current
    /// tokio runtime.
    ///
    /// Returns the control handle and the result stream, which holds at
    /// most `capacity` unread results before the worker waits. Fails with
    /// `DmsError::Worker` outside a runtime.
    pub fn spawn(
        mut engine: DrowsinessEngine,
        capacity: usize,
    ) -> Result<(WorkerHandle, mpsc::Receiver<FrameResult>), DmsError> {
        let runtime = Handle::try_current().map_err(|e| DmsError::Worker(e.to_string()))?;
        let classifier = engine.initialize()?;

        let (frame_tx, frame_rx) = watch::channel(None);
        let (control_tx, control_rx) = mpsc::channel(8);
        let (result_tx, result_rx) = mpsc::channel(capacity.max(1));

        let task = runtime.spawn(run(engine, frame_rx, control_rx, result_tx));
        info!("Frame worker started with {} classifier", classifier);

        let handle = WorkerHandle {
            frames: frame_tx,
            control: control_tx,
            task,
            classifier,
        };
        Ok((handle, result_rx))
    }
}

/// Control side of a running worker
pub struct WorkerHandle {
    frames: watch::Sender<Option<FrameInput>>,
    control: mpsc::Sender<Control>,
    task: JoinHandle<Result<SessionStats, DmsError>>,
    classifier: ClassifierKind,
}

impl WorkerHandle {
    /// Offer a frame, replacing any frame the worker has not picked up yet
    pub fn submit(&self, frame: FrameInput) -> Result<(), DmsError> {
        self.frames.send(Some(frame)).map_err(|_| DmsError::Closed)
    }

    /// Restart calibration before the next frame is processed
    pub async fn reset_calibration(&self) -> Result<(), DmsError> {
        self.control
            .send(Control::ResetCalibration)
            .await
            .map_err(|_| DmsError::Closed)
    }

    pub fn classifier_kind(&self) -> ClassifierKind {
        self.classifier
    }

    /// Stop the worker, close the engine and return its session counters
    pub async fn shutdown(self) -> Result<SessionStats, DmsError> {
        // The worker may already have stopped on its own
        let _ = self.control.send(Control::Shutdown).await;
        drop(self.frames);

        self.task
            .await
            .map_err(|e| DmsError::Worker(e.to_string()))?
    }
}

async fn run(
    mut engine: DrowsinessEngine,
    mut frames: watch::Receiver<Option<FrameInput>>,
    mut control: mpsc::Receiver<Control>,
    results: mpsc::Sender<FrameResult>,
) -> Result<SessionStats, DmsError> {
    'frames: loop {
        tokio::select! {
            biased;

            command = control.recv() => {
                if !apply(&mut engine, command) {
                    break;
                }
            }

            changed = frames.changed() => {
                if changed.is_err() {
                    debug!("Frame channel closed");
                    break;
                }
                let Some(frame) = frames.borrow_and_update().clone() else {
                    continue;
                };

                let processed = tokio::task::spawn_blocking(move || {
                    let result = process(&mut engine, frame);
                    (engine, result)
                })
                .await;

                let result = match processed {
                    Ok((returned, result)) => {
                        engine = returned;
                        result
                    }
                    Err(e) => {
                        warn!("Frame task failed, stopping worker: {}", e);
                        return Err(DmsError::Worker(e.to_string()));
                    }
                };

                // Commands still apply while the consumer is behind
                loop {
                    tokio::select! {
                        biased;

                        command = control.recv() => {
                            if !apply(&mut engine, command) {
                                break 'frames;
                            }
                        }

                        permit = results.reserve() => {
                            match permit {
                                Ok(permit) => permit.send(result),
                                Err(_) => {
                                    debug!("Result receiver dropped, stopping worker");
                                    break 'frames;
                                }
                            }
                            break;
                        }
                    }
                }
            }
        }
    }

    engine.close();
    info!("Frame worker stopped");
    Ok(engine.stats())
}

/// Apply a control command; `false` once the worker should stop
fn apply(engine: &mut DrowsinessEngine, command: Option<Control>) -> bool {
    match command {
        Some(Control::ResetCalibration) => {
            engine.reset_calibration();
            true
        }
        Some(Control::Shutdown) | None => false,
    }
}

fn process(engine: &mut DrowsinessEngine, frame: FrameInput) -> FrameResult {
    match &frame.landmarks {
        Some(landmarks) => engine.process_frame_at(
            landmarks,
            frame.image_width,
            frame.image_height,
            frame.timestamp_ms,
        ),
        None => engine.skip_frame_at(frame.image_width, frame.image_height, frame.timestamp_ms),
    }
}
