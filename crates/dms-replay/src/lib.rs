//! Landmark Stream Replay
//!
//! Feeds JSON-lines landmark recordings through a drowsiness engine and
//! writes one JSON result per frame.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use dms::{DrowsinessEngine, EngineConfig, FrameInput, FrameResult, Landmark, SessionStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Prefix of environment overrides, e.g. `DROWSY__ANALYSIS_INTERVAL=5`
pub const ENV_PREFIX: &str = "DROWSY";

/// Initialize logging to stderr; `RUST_LOG` overrides the `info` default
pub fn init_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to set tracing subscriber: {e}"))
}

/// Load engine configuration from an optional file plus `DROWSY__*`
/// environment overrides, then validate it
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    load_config_with(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn load_config_with(path: Option<&Path>, env: config::Environment) -> Result<EngineConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }
    builder = builder.add_source(env);

    let engine_config: EngineConfig = builder
        .build()
        .and_then(|c| c.try_deserialize())
        .context("load engine config")?;
    engine_config.validate()?;
    Ok(engine_config)
}

/// One recorded frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// `null` when the detector found no face
    pub landmarks: Option<Vec<Landmark>>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Capture time; derived from the frame index when absent
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

impl RecordedFrame {
    fn into_input(self, fallback_timestamp_ms: u64) -> Result<FrameInput, dms::DmsError> {
        FrameInput::new(
            self.landmarks,
            self.width,
            self.height,
            self.timestamp_ms.unwrap_or(fallback_timestamp_ms),
        )
    }
}

/// Outcome of a replay run
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ReplaySummary {
    pub frames: u64,
    pub stats: SessionStats,
}

/// Replay every frame from `input`, writing one JSON `FrameResult` per line.
///
/// Blank lines are ignored. Malformed JSON aborts the replay; a frame with
/// an unusable landmark list yields an error result and replay continues.
pub fn replay<R: BufRead, W: Write>(
    engine: &mut DrowsinessEngine,
    input: R,
    mut output: W,
    frame_interval_ms: u64,
) -> Result<ReplaySummary> {
    let mut frames = 0u64;

    for (index, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let recorded: RecordedFrame = serde_json::from_str(&line)
            .with_context(|| format!("parse frame on line {}", index + 1))?;
        let fallback_ts = frames * frame_interval_ms;

        let result = match recorded.into_input(fallback_ts) {
            Ok(frame) => process(engine, &frame),
            Err(e) => {
                warn!("Rejecting frame on line {}: {}", index + 1, e);
                FrameResult::failed(e, fallback_ts)
            }
        };

        serde_json::to_writer(&mut output, &result).context("write result")?;
        output.write_all(b"\n").context("write result")?;
        frames += 1;
    }

    output.flush().context("flush output")?;
    let stats = engine.stats();
    info!(
        "Replayed {} frames: {} analyses, {} drowsy, {} skipped, {} errors",
        frames, stats.analyses_run, stats.drowsy_frames, stats.frames_skipped, stats.errors
    );
    Ok(ReplaySummary { frames, stats })
}

fn process(engine: &mut DrowsinessEngine, frame: &FrameInput) -> FrameResult {
    match &frame.landmarks {
        Some(landmarks) => {
            engine.process_frame_at(landmarks, frame.image_width, frame.image_height, frame.timestamp_ms)
        }
        None => {
            debug!("No face at {}ms", frame.timestamp_ms);
            engine.skip_frame_at(frame.image_width, frame.image_height, frame.timestamp_ms)
        }
    }
}
