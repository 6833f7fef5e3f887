//! System-wide default constants.
//!
//! Centralises the numbers the pipeline falls back to when no config file is
//! present. Grouped by subsystem for easy discovery.

// ============================================================================
// Frame Sampler
// ============================================================================

/// Sampling tick period (ms). One capture attempt per tick while playing.
pub const SAMPLE_PERIOD_MS: u64 = 200;

/// Minimum distance between two consecutive sampled positions (seconds).
pub const MIN_SAMPLE_GAP_SECS: f64 = 0.15;

/// Side length of the square the captured frame is downsampled to.
///
/// Matches the classifier input size, so the service never has to resize.
pub const SAMPLE_TARGET_SIZE: u32 = 224;

/// JPEG quality used when encoding samples for transfer.
pub const SAMPLE_JPEG_QUALITY: u8 = 50;

// ============================================================================
// Inference Service
// ============================================================================

/// Default Inference Service base URL.
pub const INFERENCE_BASE_URL: &str = "http://localhost:8000";

/// HTTP client timeout for inference requests (seconds).
pub const INFERENCE_HTTP_TIMEOUT_SECS: u64 = 10;

/// Number of sampling periods an in-flight request may hold the busy guard.
///
/// 5 periods at 200 ms = 1 s. Past this bound the next sample supersedes it.
pub const STALE_AFTER_PERIODS: u32 = 5;

// ============================================================================
// Explanation Service
// ============================================================================

/// Default Explanation Service base URL.
pub const EXPLANATION_BASE_URL: &str = "http://localhost:8000";

/// HTTP client timeout for explanation requests (seconds).
pub const EXPLANATION_HTTP_TIMEOUT_SECS: u64 = 30;

/// Confidence an event must exceed before a rationale is requested.
pub const EXPLANATION_MIN_CONFIDENCE: f64 = 0.5;

// ============================================================================
// Triage
// ============================================================================

/// Lower bound (inclusive) of the confirmed tier.
pub const CONFIRMED_FLOOR: f64 = 0.90;

/// Lower bound (inclusive) of the potential tier.
pub const POTENTIAL_FLOOR: f64 = 0.70;

/// Label the classifier emits when nothing of interest is in frame.
pub const BASELINE_CLASS: &str = "NormalVideos";

// ============================================================================
// Event Store
// ============================================================================

/// Default data directory for the sled database.
pub const DATA_DIR: &str = "./data";

/// Capacity of the recent confirmed predictions bucket.
pub const CONFIRMED_RECENT_CAPACITY: usize = 50;

/// Capacity of the historical confirmed predictions bucket.
pub const CONFIRMED_HISTORICAL_CAPACITY: usize = 100;

/// Capacity of the potential predictions bucket.
pub const POTENTIAL_RECENT_CAPACITY: usize = 50;

/// Capacity of the alerts bucket.
pub const ALERTS_CAPACITY: usize = 20;

// ============================================================================
// Processing Loop
// ============================================================================

/// Buffer size of the inference completion channel.
pub const COMPLETION_CHANNEL_SIZE: usize = 16;

/// Progress log cadence (sampling ticks).
pub const PROGRESS_LOG_EVERY_TICKS: u64 = 50;
