//! Monitor State and Status
//!
//! Shared view of the monitor loop, readable from any task holding the
//! `Arc<RwLock<MonitorState>>` (replay binary, tests, future UI bindings).

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::Tier;

// ============================================================================
// Monitor State
// ============================================================================

/// Snapshot of what the monitor loop is doing.
///
/// Wrapped in `Arc<RwLock<>>`; only the monitor loop writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorState {
    /// Current loop status
    pub status: MonitorStatus,

    /// Name of the attached playback source
    pub source_name: Option<String>,

    /// Loop uptime (not serialized)
    #[serde(skip, default = "Instant::now")]
    pub started: Instant,

    /// Sampling ticks handled while playing
    pub ticks: u64,

    /// Samples handed to the coordinator
    pub samples_dispatched: u64,

    /// Playback position of the most recent sample (seconds)
    pub last_sample_position: Option<f64>,

    /// Wall-clock time of the most recent sample
    pub last_sample_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Class and tier of the most recent triaged result
    pub last_class: Option<String>,
    pub last_tier: Option<Tier>,

    /// Results that became events
    pub events_recorded: u64,

    /// Alerts raised
    pub alerts_raised: u64,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            status: MonitorStatus::Idle,
            source_name: None,
            started: Instant::now(),
            ticks: 0,
            samples_dispatched: 0,
            last_sample_position: None,
            last_sample_at: None,
            last_class: None,
            last_tier: None,
            events_recorded: 0,
            alerts_raised: 0,
        }
    }
}

impl MonitorState {
    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// Monitor loop status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorStatus {
    /// No playback in progress
    Idle,
    /// Playing; sampling ticks are live
    Monitoring,
    /// Playback paused by the user
    Paused,
    /// The media failed; sampling halts until a new source is attached
    SourceFailed(String),
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorStatus::Idle => write!(f, "Idle"),
            MonitorStatus::Monitoring => write!(f, "Monitoring"),
            MonitorStatus::Paused => write!(f, "Paused"),
            MonitorStatus::SourceFailed(reason) => write!(f, "Source failed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_state_default() {
        let state = MonitorState::default();
        assert_eq!(state.status, MonitorStatus::Idle);
        assert_eq!(state.ticks, 0);
        assert!(state.uptime_secs() < 5);
    }

    #[test]
    fn test_monitor_status_display() {
        assert_eq!(format!("{}", MonitorStatus::Idle), "Idle");
        assert_eq!(format!("{}", MonitorStatus::Monitoring), "Monitoring");
        assert_eq!(format!("{}", MonitorStatus::Paused), "Paused");
        assert_eq!(
            format!("{}", MonitorStatus::SourceFailed("codec".to_string())),
            "Source failed: codec"
        );
    }
}
