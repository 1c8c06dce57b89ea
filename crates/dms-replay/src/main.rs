//! Drowsiness Replay - Main Entry Point

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dms::DrowsinessEngine;
use dms_replay::{init_logging, load_config, replay};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "drowsiness-replay",
    version,
    about = "Replay face-mesh landmark recordings through the drowsiness engine"
)]
struct Cli {
    /// Engine config file (TOML, YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-lines recording; stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// ONNX sequence model, overriding the config
    #[arg(long)]
    model: Option<PathBuf>,

    /// Timestamp spacing for frames recorded without one
    #[arg(long, default_value_t = 33)]
    frame_interval_ms: u64,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs)?;

    info!("=== Drowsiness Replay v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        config.model_path = Some(model);
    }

    let mut engine = DrowsinessEngine::new(config)?;
    let classifier = engine.initialize()?;
    info!("Classifying with {} path", classifier);

    let stdout = io::stdout().lock();
    let summary = match &cli.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            replay(&mut engine, BufReader::new(file), stdout, cli.frame_interval_ms)?
        }
        None => replay(&mut engine, io::stdin().lock(), stdout, cli.frame_interval_ms)?,
    };
    engine.close();

    info!(
        "Done: {} frames, drowsy ratio {:.2}",
        summary.frames,
        summary.stats.drowsy_ratio()
    );
    Ok(())
}
