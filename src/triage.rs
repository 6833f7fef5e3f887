//! Classification Triage
//!
//! Maps a raw confidence score onto a tier and a "counts toward monitoring"
//! flag. Pure and side-effect free: the same policy applies to real-time
//! samples and to one-off still-image classifications.
//!
//! ```text
//! confidence >= 0.90         -> confirmed  (counts)
//! 0.70 <= confidence < 0.90  -> potential
//! confidence < 0.70          -> ignored    (dropped, live slot cleared)
//! ```

use crate::config::{defaults, TriageConfig};
use crate::types::Tier;

/// Outcome of triaging a single confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageDecision {
    pub tier: Tier,
    pub counts_toward_monitoring: bool,
}

impl TriageDecision {
    pub fn is_ignored(&self) -> bool {
        self.tier == Tier::Ignored
    }
}

/// Tier floors. Both lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triage {
    confirmed_floor: f64,
    potential_floor: f64,
}

impl Default for Triage {
    fn default() -> Self {
        Self {
            confirmed_floor: defaults::CONFIRMED_FLOOR,
            potential_floor: defaults::POTENTIAL_FLOOR,
        }
    }
}

impl Triage {
    /// Build from validated config floors.
    pub fn from_config(config: &TriageConfig) -> Self {
        Self {
            confirmed_floor: config.confirmed_floor,
            potential_floor: config.potential_floor,
        }
    }

    pub fn confirmed_floor(&self) -> f64 {
        self.confirmed_floor
    }

    pub fn potential_floor(&self) -> f64 {
        self.potential_floor
    }

    /// Classify a confidence score. NaN falls through to ignored.
    pub fn triage(&self, confidence: f64) -> TriageDecision {
        if confidence >= self.confirmed_floor {
            TriageDecision {
                tier: Tier::Confirmed,
                counts_toward_monitoring: true,
            }
        } else if confidence >= self.potential_floor {
            TriageDecision {
                tier: Tier::Potential,
                counts_toward_monitoring: false,
            }
        } else {
            TriageDecision {
                tier: Tier::Ignored,
                counts_toward_monitoring: false,
            }
        }
    }
}

/// Triage with the stock floors (0.90 / 0.70).
pub fn triage(confidence: f64) -> TriageDecision {
    Triage::default().triage(confidence)
}
