//! Frame Sampler
//!
//! Turns the current playback frame into a [`Sample`]: a fixed-size square
//! JPEG shipped as a base64 data URL. The sampler only decides *whether* a
//! tick may sample and prepares the payload; the monitor loop owns the timer.
//!
//! A tick is a no-op when the source has not buffered the current frame yet,
//! or when the position is within `min_gap_secs` of the last sampled one
//! (seeks in either direction count as "far enough").

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::config::{defaults, SamplerConfig};

/// Prefix of every encoded sample payload.
pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Errors raised while capturing or encoding a frame.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// The playback source could not hand over its frame
    #[error("source error: {0}")]
    Source(String),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to encode sample: {0}")]
    Encode(String),
}

// ============================================================================
// Readiness
// ============================================================================

/// How much media the playback source has buffered, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    #[default]
    Nothing,
    Metadata,
    CurrentData,
    FutureData,
    EnoughData,
}

impl ReadyState {
    /// At least the current frame is decodable.
    pub fn can_sample(&self) -> bool {
        *self >= ReadyState::CurrentData
    }
}

/// Why a tick did not produce a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    NotReady(ReadyState),
    TooClose { gap_secs: f64 },
}

// ============================================================================
// Sample
// ============================================================================

/// Transient, encoded snapshot of one playback position. Never persisted.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Playback position the frame was taken at (seconds)
    pub position_secs: f64,
    /// `data:image/jpeg;base64,...`
    pub frame_data: String,
    pub captured_at: DateTime<Utc>,
}

// ============================================================================
// Sampler
// ============================================================================

#[derive(Debug, Clone)]
pub struct FrameSampler {
    min_gap_secs: f64,
    target_size: u32,
    jpeg_quality: u8,
    last_position: Option<f64>,
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self {
            min_gap_secs: defaults::MIN_SAMPLE_GAP_SECS,
            target_size: defaults::SAMPLE_TARGET_SIZE,
            jpeg_quality: defaults::SAMPLE_JPEG_QUALITY,
            last_position: None,
        }
    }
}

impl FrameSampler {
    pub fn from_config(config: &SamplerConfig) -> Self {
        Self {
            min_gap_secs: config.min_gap_secs,
            target_size: config.target_size,
            jpeg_quality: config.jpeg_quality,
            last_position: None,
        }
    }

    /// Position of the last emitted sample, if any since the last reset.
    pub fn last_position(&self) -> Option<f64> {
        self.last_position
    }

    /// Forget the last sampled position (new source).
    pub fn reset(&mut self) {
        self.last_position = None;
    }

    /// Decide whether a tick at `position_secs` may sample.
    pub fn check(&self, ready: ReadyState, position_secs: f64) -> Result<(), SkipReason> {
        if !ready.can_sample() {
            return Err(SkipReason::NotReady(ready));
        }
        if let Some(last) = self.last_position {
            let gap_secs = (position_secs - last).abs();
            if gap_secs < self.min_gap_secs {
                return Err(SkipReason::TooClose { gap_secs });
            }
        }
        Ok(())
    }

    /// Downsample and encode `frame`, and mark `position_secs` as sampled.
    pub fn prepare(&mut self, position_secs: f64, frame: &DynamicImage) -> Result<Sample, SamplerError> {
        let frame_data = self.encode(frame)?;
        self.last_position = Some(position_secs);
        Ok(Sample {
            position_secs,
            frame_data,
            captured_at: Utc::now(),
        })
    }

    /// Decode an arbitrary still image and encode it the same way as a sample.
    pub fn encode_still(&self, bytes: &[u8]) -> Result<String, SamplerError> {
        let image = image::load_from_memory(bytes)?;
        self.encode(&image)
    }

    fn encode(&self, frame: &DynamicImage) -> Result<String, SamplerError> {
        let resized = frame
            .resize_exact(self.target_size, self.target_size, FilterType::Triangle)
            .to_rgb8();

        let mut jpeg = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality)
            .encode_image(&resized)
            .map_err(|e| SamplerError::Encode(e.to_string()))?;

        Ok(format!("{}{}", DATA_URL_PREFIX, BASE64.encode(jpeg.into_inner())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};

    fn decode_data_url(frame_data: &str) -> DynamicImage {
        let payload = frame_data.strip_prefix(DATA_URL_PREFIX).unwrap();
        image::load_from_memory(&BASE64.decode(payload).unwrap()).unwrap()
    }

    fn frame(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 255) as u8, (y % 255) as u8, 128])
        }))
    }

    #[test]
    fn test_first_tick_samples_when_ready() {
        let sampler = FrameSampler::default();
        assert!(sampler.check(ReadyState::CurrentData, 0.0).is_ok());
        assert!(sampler.check(ReadyState::EnoughData, 12.3).is_ok());
    }

    #[test]
    fn test_not_ready_is_skipped() {
        let sampler = FrameSampler::default();
        assert_eq!(
            sampler.check(ReadyState::Metadata, 1.0),
            Err(SkipReason::NotReady(ReadyState::Metadata))
        );
        assert!(sampler.check(ReadyState::Nothing, 1.0).is_err());
    }

    #[test]
    fn test_min_gap_applies_both_directions() {
        let mut sampler = FrameSampler::default();
        sampler.prepare(10.0, &frame(32, 32)).unwrap();

        assert!(matches!(
            sampler.check(ReadyState::EnoughData, 10.1),
            Err(SkipReason::TooClose { .. })
        ));
        assert!(sampler.check(ReadyState::EnoughData, 9.9).is_err());
        assert!(sampler.check(ReadyState::EnoughData, 10.15).is_ok());
        assert!(sampler.check(ReadyState::EnoughData, 2.0).is_ok());
    }

    #[test]
    fn test_reset_forgets_last_position() {
        let mut sampler = FrameSampler::default();
        sampler.prepare(5.0, &frame(16, 16)).unwrap();
        assert_eq!(sampler.last_position(), Some(5.0));
        sampler.reset();
        assert!(sampler.last_position().is_none());
        assert!(sampler.check(ReadyState::EnoughData, 5.0).is_ok());
    }

    #[test]
    fn test_sample_is_square_jpeg_data_url() {
        let mut sampler = FrameSampler::default();
        let sample = sampler.prepare(3.5, &frame(640, 360)).unwrap();

        assert!(sample.frame_data.starts_with(DATA_URL_PREFIX));
        assert_eq!(sample.position_secs, 3.5);
        let decoded = decode_data_url(&sample.frame_data);
        assert_eq!(decoded.dimensions(), (224, 224));
    }

    #[test]
    fn test_encode_still_rejects_garbage() {
        let sampler = FrameSampler::default();
        assert!(matches!(
            sampler.encode_still(b"definitely not an image"),
            Err(SamplerError::Decode(_))
        ));
    }
}
