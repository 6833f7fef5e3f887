//! Monitor Configuration - sampling, services, triage and storage as TOML values
//!
//! Each struct implements `Default` with the values in [`super::defaults`],
//! so a missing config file yields the stock pipeline behaviour.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "FIELD_INTEL_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "monitor_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a monitoring deployment.
///
/// Load with `MonitorConfig::load()` which searches:
/// 1. `$FIELD_INTEL_CONFIG` env var
/// 2. `./monitor_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Frame sampling cadence and encoding
    #[serde(default)]
    pub sampler: SamplerConfig,

    /// Inference Service endpoint
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Explanation Service endpoint
    #[serde(default)]
    pub explanation: ExplanationConfig,

    /// Confidence tier floors and baseline label
    #[serde(default)]
    pub triage: TriageConfig,

    /// Event store location and bucket capacities
    #[serde(default)]
    pub store: StoreConfig,
}

impl MonitorConfig {
    /// Load configuration using the standard search order:
    /// 1. `$FIELD_INTEL_CONFIG` environment variable
    /// 2. `./monitor_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded monitor config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded monitor config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found — using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys only produce warnings; structural and range problems fail.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate every section for internal consistency.
    ///
    /// Rules:
    /// - Triage floors must satisfy `0 < potential < confirmed <= 1`
    /// - The explanation floor must lie in `[0, 1)`
    /// - Periods, gaps, sizes and capacities must be positive
    /// - Service URLs must be http(s)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let t = &self.triage;
        if !t.potential_floor.is_finite() || !t.confirmed_floor.is_finite() {
            errors.push(format!(
                "triage: floors must be finite (got potential={}, confirmed={})",
                t.potential_floor, t.confirmed_floor
            ));
        } else {
            if t.potential_floor <= 0.0 {
                errors.push(format!(
                    "triage.potential_floor ({:.2}) must be > 0",
                    t.potential_floor
                ));
            }
            if t.confirmed_floor <= t.potential_floor {
                errors.push(format!(
                    "triage.confirmed_floor ({:.2}) must be > potential_floor ({:.2})",
                    t.confirmed_floor, t.potential_floor
                ));
            }
            if t.confirmed_floor > 1.0 {
                errors.push(format!(
                    "triage.confirmed_floor ({:.2}) must be <= 1.0",
                    t.confirmed_floor
                ));
            }
        }
        if t.baseline_class.trim().is_empty() {
            errors.push("triage.baseline_class must not be empty".to_string());
        }

        let s = &self.sampler;
        if s.period_ms == 0 {
            errors.push("sampler.period_ms must be > 0".to_string());
        }
        if !s.min_gap_secs.is_finite() || s.min_gap_secs < 0.0 {
            errors.push(format!(
                "sampler.min_gap_secs ({}) must be a finite value >= 0",
                s.min_gap_secs
            ));
        }
        if s.target_size == 0 {
            errors.push("sampler.target_size must be > 0".to_string());
        }
        if !(1..=100).contains(&s.jpeg_quality) {
            errors.push(format!(
                "sampler.jpeg_quality ({}) must be within 1..=100",
                s.jpeg_quality
            ));
        }

        Self::check_url(&self.inference.base_url, "inference.base_url", &mut errors);
        if self.inference.timeout_secs == 0 {
            errors.push("inference.timeout_secs must be > 0".to_string());
        }
        if self.inference.stale_after_periods == 0 {
            errors.push("inference.stale_after_periods must be > 0".to_string());
        }

        let e = &self.explanation;
        Self::check_url(&e.base_url, "explanation.base_url", &mut errors);
        if e.timeout_secs == 0 {
            errors.push("explanation.timeout_secs must be > 0".to_string());
        }
        if !(0.0..1.0).contains(&e.min_confidence) {
            errors.push(format!(
                "explanation.min_confidence ({}) must be within [0, 1)",
                e.min_confidence
            ));
        }

        let st = &self.store;
        for (name, cap) in [
            ("store.confirmed_recent_capacity", st.confirmed_recent_capacity),
            ("store.confirmed_historical_capacity", st.confirmed_historical_capacity),
            ("store.potential_recent_capacity", st.potential_recent_capacity),
            ("store.alerts_capacity", st.alerts_capacity),
        ] {
            if cap == 0 {
                errors.push(format!("{name} must be > 0"));
            }
        }

        for w in super::validation::validate_operating_ranges(self) {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_url(url: &str, name: &str, errors: &mut Vec<String>) {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("{name} ({url}) must start with http:// or https://"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),
    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sampler
// ============================================================================

/// Frame sampling cadence and encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Tick period while playing (ms)
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Minimum distance between consecutive sampled positions (seconds)
    #[serde(default = "default_min_gap_secs")]
    pub min_gap_secs: f64,

    /// Side of the square the frame is downsampled to (pixels)
    #[serde(default = "default_target_size")]
    pub target_size: u32,

    /// JPEG quality for the encoded sample (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_period_ms() -> u64 {
    defaults::SAMPLE_PERIOD_MS
}
fn default_min_gap_secs() -> f64 {
    defaults::MIN_SAMPLE_GAP_SECS
}
fn default_target_size() -> u32 {
    defaults::SAMPLE_TARGET_SIZE
}
fn default_jpeg_quality() -> u8 {
    defaults::SAMPLE_JPEG_QUALITY
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            min_gap_secs: default_min_gap_secs(),
            target_size: default_target_size(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl SamplerConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

// ============================================================================
// Inference
// ============================================================================

/// Inference Service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_inference_url")]
    pub base_url: String,

    /// HTTP client timeout (seconds)
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,

    /// Sampling periods an in-flight request holds the busy guard before a
    /// newer sample may supersede it
    #[serde(default = "default_stale_after_periods")]
    pub stale_after_periods: u32,
}

fn default_inference_url() -> String {
    defaults::INFERENCE_BASE_URL.to_string()
}
fn default_inference_timeout() -> u64 {
    defaults::INFERENCE_HTTP_TIMEOUT_SECS
}
fn default_stale_after_periods() -> u32 {
    defaults::STALE_AFTER_PERIODS
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_url(),
            timeout_secs: default_inference_timeout(),
            stale_after_periods: default_stale_after_periods(),
        }
    }
}

// ============================================================================
// Explanation
// ============================================================================

/// Explanation Service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationConfig {
    /// Set to false to never request rationale
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_explanation_url")]
    pub base_url: String,

    /// HTTP client timeout (seconds)
    #[serde(default = "default_explanation_timeout")]
    pub timeout_secs: u64,

    /// Confidence an event must exceed before rationale is requested
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

fn default_true() -> bool {
    true
}
fn default_explanation_url() -> String {
    defaults::EXPLANATION_BASE_URL.to_string()
}
fn default_explanation_timeout() -> u64 {
    defaults::EXPLANATION_HTTP_TIMEOUT_SECS
}
fn default_min_confidence() -> f64 {
    defaults::EXPLANATION_MIN_CONFIDENCE
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_explanation_url(),
            timeout_secs: default_explanation_timeout(),
            min_confidence: default_min_confidence(),
        }
    }
}

// ============================================================================
// Triage
// ============================================================================

/// Confidence tier floors (both inclusive) and the baseline label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default = "default_confirmed_floor")]
    pub confirmed_floor: f64,

    #[serde(default = "default_potential_floor")]
    pub potential_floor: f64,

    /// Label meaning "nothing detected"; exempt from alerts and rationale
    #[serde(default = "default_baseline_class")]
    pub baseline_class: String,
}

fn default_confirmed_floor() -> f64 {
    defaults::CONFIRMED_FLOOR
}
fn default_potential_floor() -> f64 {
    defaults::POTENTIAL_FLOOR
}
fn default_baseline_class() -> String {
    defaults::BASELINE_CLASS.to_string()
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            confirmed_floor: default_confirmed_floor(),
            potential_floor: default_potential_floor(),
            baseline_class: default_baseline_class(),
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// Event store location and bucket capacities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the sled database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_confirmed_recent")]
    pub confirmed_recent_capacity: usize,

    #[serde(default = "default_confirmed_historical")]
    pub confirmed_historical_capacity: usize,

    #[serde(default = "default_potential_recent")]
    pub potential_recent_capacity: usize,

    #[serde(default = "default_alerts")]
    pub alerts_capacity: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(defaults::DATA_DIR)
}
fn default_confirmed_recent() -> usize {
    defaults::CONFIRMED_RECENT_CAPACITY
}
fn default_confirmed_historical() -> usize {
    defaults::CONFIRMED_HISTORICAL_CAPACITY
}
fn default_potential_recent() -> usize {
    defaults::POTENTIAL_RECENT_CAPACITY
}
fn default_alerts() -> usize {
    defaults::ALERTS_CAPACITY
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            confirmed_recent_capacity: default_confirmed_recent(),
            confirmed_historical_capacity: default_confirmed_historical(),
            potential_recent_capacity: default_potential_recent(),
            alerts_capacity: default_alerts(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: MonitorConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.sampler.period_ms, 200);
        assert_eq!(config.sampler.min_gap_secs, 0.15);
        assert_eq!(config.sampler.target_size, 224);
        assert_eq!(config.triage.confirmed_floor, 0.90);
        assert_eq!(config.triage.potential_floor, 0.70);
        assert_eq!(config.triage.baseline_class, "NormalVideos");
        assert_eq!(config.store.confirmed_recent_capacity, 50);
        assert_eq!(config.store.confirmed_historical_capacity, 100);
        assert_eq!(config.store.potential_recent_capacity, 50);
        assert_eq!(config.store.alerts_capacity, 20);
        assert_eq!(config.explanation.min_confidence, 0.5);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[inference]
base_url = "http://inference.local:9000"

[triage]
baseline_class = "Normal"
"#;
        let config = MonitorConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.inference.base_url, "http://inference.local:9000");
        assert_eq!(config.triage.baseline_class, "Normal");
        // Non-overridden values retain defaults
        assert_eq!(config.inference.timeout_secs, 10);
        assert_eq!(config.triage.confirmed_floor, 0.90);
    }

    #[test]
    fn test_validation_catches_inverted_floors() {
        let mut config = MonitorConfig::default();
        config.triage.confirmed_floor = 0.6;
        config.triage.potential_floor = 0.8;
        let result = config.validate();
        assert!(result.is_err(), "Inverted floors should fail validation");
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("confirmed_floor")));
        }
    }

    #[test]
    fn test_validation_catches_zero_capacity_and_bad_url() {
        let mut config = MonitorConfig::default();
        config.store.alerts_capacity = 0;
        config.explanation.base_url = "ftp://nope".to_string();
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("alerts_capacity")));
                assert!(errors.iter().any(|e| e.contains("explanation.base_url")));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_rejects_nan_floor() {
        let mut config = MonitorConfig::default();
        config.triage.confirmed_floor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor_config.toml");
        let mut config = MonitorConfig::default();
        config.sampler.period_ms = 250;
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = MonitorConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.sampler.period_ms, 250);
        assert_eq!(loaded.sampler.period(), Duration::from_millis(250));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[sampler\nperiod_ms = ").unwrap();
        let err = MonitorConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
