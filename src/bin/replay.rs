//! Frame directory replay
//!
//! Plays a directory of still frames as a simulated video and runs the full
//! monitor loop against the configured Inference and Explanation services.
//!
//! # Usage
//!
//! ```bash
//! replay --frames ./frames --fps 10
//! replay --frames ./frames --inference-url http://gpu-box:8000 --reset
//! replay --frames ./frames --resume
//! ```
//!
//! # Environment Variables
//!
//! - `FIELD_INTEL_CONFIG`: Path to a monitor_config.toml
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use field_intel::config::{self, MonitorConfig};
use field_intel::pipeline::source::ImageSequenceSource;
use field_intel::pipeline::{EventRecorder, ExplanationEnricher, MonitorLoop, MonitorState};
use field_intel::services::{HttpExplanationClient, HttpInferenceClient};
use field_intel::storage::{self, SessionMode};
use field_intel::Triage;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Replay a frame directory through the real-time classification pipeline")]
#[command(version)]
struct CliArgs {
    /// Directory of .jpg/.jpeg/.png frames, played in file-name order
    #[arg(long, value_name = "DIR")]
    frames: PathBuf,

    /// Playback rate of the frame directory
    #[arg(long, default_value = "10")]
    fps: f64,

    /// Path to a monitor_config.toml (overrides FIELD_INTEL_CONFIG)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Wipe the data directory before starting.
    /// WARNING: This is destructive and cannot be undone!
    #[arg(long)]
    reset: bool,

    /// Continue the previous session's buckets and live result instead of
    /// starting a fresh session
    #[arg(long, conflicts_with = "reset")]
    resume: bool,

    /// Override the Inference Service base URL
    #[arg(long, env = "FIELD_INTEL_INFERENCE_URL")]
    inference_url: Option<String>,

    /// Override the Explanation Service base URL
    #[arg(long, env = "FIELD_INTEL_EXPLANATION_URL")]
    explanation_url: Option<String>,
}

// ============================================================================
// Data Reset
// ============================================================================

/// Remove the data directory and all its contents.
fn reset_data_directory(data_dir: &Path) -> Result<()> {
    if !data_dir.exists() {
        info!("Data directory does not exist, nothing to reset");
        return Ok(());
    }

    warn!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    warn!("  --reset GIVEN - WIPING {}", data_dir.display());
    warn!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    std::fs::remove_dir_all(data_dir)
        .with_context(|| format!("Failed to remove data directory {}", data_dir.display()))?;
    info!("Data directory wiped");
    Ok(())
}

fn load_config(args: &CliArgs) -> Result<MonitorConfig> {
    let mut cfg = match &args.config {
        Some(path) => MonitorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MonitorConfig::load(),
    };

    if let Some(url) = &args.inference_url {
        cfg.inference.base_url = url.clone();
    }
    if let Some(url) = &args.explanation_url {
        cfg.explanation.base_url = url.clone();
    }
    cfg.validate().context("Invalid configuration after CLI overrides")?;
    Ok(cfg)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    config::init(load_config(&args)?);
    let cfg = config::get();

    if args.reset {
        reset_data_directory(&cfg.store.data_dir)?;
    }
    std::fs::create_dir_all(&cfg.store.data_dir)
        .with_context(|| format!("Failed to create {}", cfg.store.data_dir.display()))?;

    let mut source = ImageSequenceSource::open(&args.frames, args.fps)?;

    let session = if args.resume {
        SessionMode::Resume
    } else {
        SessionMode::Fresh
    };
    let store =
        Arc::new(storage::open_store(cfg, session).context("Failed to open event store")?);
    let inference = Arc::new(
        HttpInferenceClient::new(&cfg.inference).context("Failed to build inference client")?,
    );
    info!("Inference Service: {}", inference.endpoint());

    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let mut recorder = EventRecorder::new(Arc::clone(&store), Triage::from_config(&cfg.triage));
    if cfg.explanation.enabled {
        let explainer = HttpExplanationClient::new(&cfg.explanation)
            .context("Failed to build explanation client")?;
        info!("Explanation Service: {}", explainer.endpoint());
        recorder = recorder.with_enricher(ExplanationEnricher::new(
            Arc::new(explainer),
            Arc::clone(&store),
            &cfg.explanation,
            &cfg.triage,
            cancel_token.clone(),
        ));
    } else {
        info!("Explanation Service disabled");
    }

    let state = Arc::new(RwLock::new(MonitorState::default()));
    let monitor = MonitorLoop::new(cfg, inference, recorder, Arc::clone(&state), cancel_token);
    let stats = monitor.run(&mut source).await;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    let state = state.read().await;
    info!("Final status: {} after {}s", state.status, state.uptime_secs());
    Ok(())
}
