//! Persisted units of the event stream: events, alerts and the live slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classification::{ClassScore, ClassificationResult};

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier of an [`Event`]; the key rationale is merged by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tier
// ============================================================================

/// Confidence band a classification falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// At or above the confirmed floor; counts toward monitoring
    Confirmed,
    /// Between the potential and confirmed floors; kept but not counted
    Potential,
    /// Below the potential floor; discarded before an event exists
    Ignored,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Confirmed => write!(f, "confirmed"),
            Tier::Potential => write!(f, "potential"),
            Tier::Ignored => write!(f, "ignored"),
        }
    }
}

/// Where the classified image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    #[default]
    Realtime,
    StillImage,
}

// ============================================================================
// Event
// ============================================================================

/// A recorded classification.
///
/// Created at triage time, mutated at most once when its rationale arrives,
/// evicted only by bucket rollover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,

    pub predicted_class: String,

    pub confidence: f64,

    #[serde(alias = "status")]
    pub tier: Tier,

    #[serde(alias = "should_count")]
    pub counts_toward_monitoring: bool,

    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,

    /// Playback position of the sample (seconds); none for still images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_secs: Option<f64>,

    #[serde(default)]
    pub origin: EventOrigin,

    /// Ranked distribution the event was triaged from
    #[serde(default, alias = "predictions")]
    pub ranked: Vec<ClassScore>,

    /// Opaque Explanation Service payload, filled in asynchronously
    #[serde(default, alias = "explanation", skip_serializing_if = "Option::is_none")]
    pub rationale: Option<serde_json::Value>,
}

impl Event {
    /// Create an event from a triaged result.
    ///
    /// Returns `None` for the ignored tier: ignored results never become events.
    pub fn from_result(
        result: &ClassificationResult,
        tier: Tier,
        counts_toward_monitoring: bool,
        position_secs: Option<f64>,
        origin: EventOrigin,
    ) -> Option<Self> {
        if tier == Tier::Ignored {
            return None;
        }
        Some(Self {
            id: EventId::new(),
            predicted_class: result.predicted_class.clone(),
            confidence: result.confidence,
            tier,
            counts_toward_monitoring,
            created_at: Utc::now(),
            position_secs,
            origin,
            ranked: result.ranked.clone(),
            rationale: None,
        })
    }

    /// Rebuild the classification this event was triaged from.
    pub fn classification(&self) -> ClassificationResult {
        ClassificationResult {
            predicted_class: self.predicted_class.clone(),
            confidence: self.confidence,
            ranked: self.ranked.clone(),
        }
    }

    pub fn has_rationale(&self) -> bool {
        self.rationale.is_some()
    }
}

// ============================================================================
// Alert
// ============================================================================

/// Alert severity. The design supports a single level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertSeverity {
    #[default]
    High,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::High => write!(f, "High"),
        }
    }
}

/// Escalation derived from a confirmed, non-baseline event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,

    /// Event the alert was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,

    /// Detected class
    #[serde(rename = "type")]
    pub alert_type: String,

    #[serde(default)]
    pub severity: AlertSeverity,

    pub message: String,

    pub confidence: f64,

    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Live Result
// ============================================================================

/// The result currently displayed to the user.
///
/// Replaced by every non-ignored result, cleared by every ignored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveResult {
    pub event_id: EventId,
    pub predicted_class: String,
    pub confidence: f64,
    pub tier: Tier,
    pub counts_toward_monitoring: bool,
    #[serde(default)]
    pub ranked: Vec<ClassScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Event> for LiveResult {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.id,
            predicted_class: event.predicted_class.clone(),
            confidence: event.confidence,
            tier: event.tier,
            counts_toward_monitoring: event.counts_toward_monitoring,
            ranked: event.ranked.clone(),
            position_secs: event.position_secs,
            rationale: event.rationale.clone(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(confidence: f64) -> ClassificationResult {
        ClassificationResult::new(
            "Fighting",
            confidence,
            vec![ClassScore::new("Fighting", confidence)],
        )
    }

    #[test]
    fn test_ignored_tier_never_builds_event() {
        let event = Event::from_result(&result(0.4), Tier::Ignored, false, Some(1.0), EventOrigin::Realtime);
        assert!(event.is_none());
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = Event::from_result(&result(0.95), Tier::Confirmed, true, None, EventOrigin::StillImage).unwrap();
        let b = Event::from_result(&result(0.95), Tier::Confirmed, true, None, EventOrigin::StillImage).unwrap();
        assert_ne!(a.id, b.id);
        assert!(!a.has_rationale());
        assert_eq!(a.classification().predicted_class, "Fighting");
    }

    #[test]
    fn test_event_loads_without_optional_fields() {
        let json = r#"{
            "id": "6f1c2a1e-3b53-4d34-9d3a-2b6f0c4f7f10",
            "predicted_class": "Robbery",
            "confidence": 0.93,
            "status": "confirmed",
            "should_count": true,
            "timestamp": "2024-05-01T12:00:00Z"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.tier, Tier::Confirmed);
        assert!(event.counts_toward_monitoring);
        assert!(event.rationale.is_none());
        assert!(event.ranked.is_empty());
        assert_eq!(event.origin, EventOrigin::Realtime);
    }

    #[test]
    fn test_alert_serializes_type_field() {
        let alert = Alert {
            id: Uuid::new_v4(),
            event_id: None,
            alert_type: "Arson".to_string(),
            severity: AlertSeverity::High,
            message: "Detected Arson with 91.0% confidence".to_string(),
            confidence: 0.91,
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["type"], "Arson");
        assert_eq!(value["severity"], "High");
        assert!(value.get("event_id").is_none());
    }
}
