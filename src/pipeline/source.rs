//! Playback source abstraction.
//!
//! The monitor loop never decodes video itself: it listens for playback
//! events and, on each sampling tick, asks the source for its position,
//! readiness and current frame.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use tokio::time::{Duration, Instant};

use crate::sampler::{ReadyState, SamplerError};

/// Events produced by a playback source.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Playback reached the end of the media
    Ended,
    /// The media was detached
    Cleared,
    /// A different media was attached
    SourceChanged(String),
    /// The media can no longer be played
    MediaError(String),
    /// The source will produce no further events
    Closed,
}

/// Trait abstracting where frames come from.
///
/// The processing loop calls [`next_event`](PlaybackSource::next_event) in a
/// `select!` with cancellation, so implementations must be cancel-safe.
#[async_trait]
pub trait PlaybackSource: Send + 'static {
    /// Wait for the next playback event.
    ///
    /// Returns `Err` on unrecoverable errors.
    async fn next_event(&mut self) -> Result<PlaybackEvent>;

    /// How much media is buffered at the current position.
    fn ready_state(&self) -> ReadyState;

    /// Current playback position (seconds).
    fn position_secs(&self) -> f64;

    /// Grab the frame at the current position.
    async fn capture_frame(&mut self) -> Result<DynamicImage, SamplerError>;

    /// Human-readable name for logging.
    fn source_name(&self) -> &str;
}

// ============================================================================
// Image Sequence Source (directory replay)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplayPhase {
    Loaded,
    Playing,
    Ended,
    Closed,
}

/// Replays a directory of still frames as if it were a video at `fps`.
///
/// Frames are ordered by file name. The position advances with wall-clock
/// time from the moment `Play` is emitted.
pub struct ImageSequenceSource {
    name: String,
    frames: Vec<PathBuf>,
    fps: f64,
    phase: ReplayPhase,
    started_at: Option<Instant>,
}

/// File extensions the replay source picks up.
const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

impl ImageSequenceSource {
    /// Scan `dir` for frames.
    pub fn open(dir: &Path, fps: f64) -> Result<Self> {
        if !(fps.is_finite() && fps > 0.0) {
            bail!("fps must be positive, got {}", fps);
        }

        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read frame directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        frames.sort();

        if frames.is_empty() {
            bail!("No .jpg/.jpeg/.png frames found in {}", dir.display());
        }

        tracing::info!(
            "[ReplaySource] Loaded {} frames from {} at {} fps",
            frames.len(),
            dir.display(),
            fps
        );

        Ok(Self {
            name: dir.display().to_string(),
            frames,
            fps,
            phase: ReplayPhase::Loaded,
            started_at: None,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total playback length (seconds).
    pub fn duration_secs(&self) -> f64 {
        self.frames.len() as f64 / self.fps
    }

    fn frame_index(&self, position_secs: f64) -> usize {
        let index = (position_secs * self.fps).floor() as usize;
        index.min(self.frames.len().saturating_sub(1))
    }
}

#[async_trait]
impl PlaybackSource for ImageSequenceSource {
    async fn next_event(&mut self) -> Result<PlaybackEvent> {
        match self.phase {
            ReplayPhase::Loaded => {
                self.phase = ReplayPhase::Playing;
                self.started_at = Some(Instant::now());
                Ok(PlaybackEvent::Play)
            }
            ReplayPhase::Playing => {
                let start = self.started_at.unwrap_or_else(Instant::now);
                tokio::time::sleep_until(start + Duration::from_secs_f64(self.duration_secs())).await;
                self.phase = ReplayPhase::Ended;
                Ok(PlaybackEvent::Ended)
            }
            ReplayPhase::Ended | ReplayPhase::Closed => {
                self.phase = ReplayPhase::Closed;
                Ok(PlaybackEvent::Closed)
            }
        }
    }

    fn ready_state(&self) -> ReadyState {
        match self.phase {
            ReplayPhase::Loaded => ReadyState::Metadata,
            ReplayPhase::Playing => ReadyState::EnoughData,
            ReplayPhase::Ended | ReplayPhase::Closed => ReadyState::CurrentData,
        }
    }

    fn position_secs(&self) -> f64 {
        match (self.phase, self.started_at) {
            (ReplayPhase::Playing, Some(start)) => start.elapsed().as_secs_f64().min(self.duration_secs()),
            (ReplayPhase::Ended | ReplayPhase::Closed, _) => self.duration_secs(),
            _ => 0.0,
        }
    }

    async fn capture_frame(&mut self) -> Result<DynamicImage, SamplerError> {
        let path = &self.frames[self.frame_index(self.position_secs())];
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SamplerError::Source(format!("{}: {}", path.display(), e)))?;
        tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| SamplerError::Source(format!("decode task failed: {}", e)))?
            .map_err(SamplerError::from)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
