//! Alert Generator
//!
//! Derives an [`Alert`] from a confirmed event unless the event carries the
//! baseline ("nothing detected") class. Runs once per event, at the moment it
//! is recorded as confirmed.

use chrono::Utc;
use uuid::Uuid;

use crate::config::{defaults, TriageConfig};
use crate::types::{Alert, AlertSeverity, Event};

#[derive(Debug, Clone)]
pub struct AlertGenerator {
    baseline_class: String,
}

impl Default for AlertGenerator {
    fn default() -> Self {
        Self::new(defaults::BASELINE_CLASS)
    }
}

impl AlertGenerator {
    pub fn new(baseline_class: impl Into<String>) -> Self {
        Self {
            baseline_class: baseline_class.into(),
        }
    }

    pub fn from_config(config: &TriageConfig) -> Self {
        Self::new(config.baseline_class.clone())
    }

    pub fn baseline_class(&self) -> &str {
        &self.baseline_class
    }

    pub fn is_baseline(&self, class: &str) -> bool {
        class == self.baseline_class
    }

    /// Returns `None` iff the event's class is the baseline class.
    pub fn generate(&self, event: &Event) -> Option<Alert> {
        if self.is_baseline(&event.predicted_class) {
            return None;
        }
        Some(Alert {
            id: Uuid::new_v4(),
            event_id: Some(event.id),
            alert_type: event.predicted_class.clone(),
            severity: AlertSeverity::High,
            message: alert_message(&event.predicted_class, event.confidence),
            confidence: event.confidence,
            timestamp: Utc::now(),
        })
    }
}

/// `"Detected {class} with {pct:.1}% confidence"`
///
/// Ties round half away from zero (91.25 -> 91.3), not half-to-even.
pub fn alert_message(class: &str, confidence: f64) -> String {
    let pct = (confidence * 1000.0).round() / 10.0;
    format!("Detected {} with {:.1}% confidence", class, pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationResult, EventOrigin, Tier};

    fn confirmed(class: &str, confidence: f64) -> Event {
        let result = ClassificationResult::new(class, confidence, Vec::new());
        Event::from_result(&result, Tier::Confirmed, true, Some(3.2), EventOrigin::Realtime).unwrap()
    }

    #[test]
    fn test_fighting_alert_message() {
        let event = confirmed("Fighting", 0.95);
        let alert = AlertGenerator::default().generate(&event).unwrap();
        assert_eq!(alert.message, "Detected Fighting with 95.0% confidence");
        assert_eq!(alert.alert_type, "Fighting");
        assert_eq!(alert.severity, AlertSeverity::High);
        assert_eq!(alert.event_id, Some(event.id));
        assert_eq!(alert.confidence, 0.95);
    }

    #[test]
    fn test_baseline_is_exempt() {
        let event = confirmed("NormalVideos", 0.92);
        assert!(AlertGenerator::default().generate(&event).is_none());
    }

    #[test]
    fn test_custom_baseline() {
        let generator = AlertGenerator::new("Normal");
        assert!(generator.generate(&confirmed("Normal", 0.99)).is_none());
        assert!(generator.generate(&confirmed("NormalVideos", 0.99)).is_some());
    }

    #[test]
    fn test_message_rounds_to_one_decimal() {
        assert_eq!(alert_message("Robbery", 0.9137), "Detected Robbery with 91.4% confidence");
        assert_eq!(alert_message("Arson", 0.90), "Detected Arson with 90.0% confidence");
        assert_eq!(alert_message("Shooting", 1.0), "Detected Shooting with 100.0% confidence");
    }

    #[test]
    fn test_message_rounds_ties_up() {
        assert_eq!(alert_message("Robbery", 0.9125), "Detected Robbery with 91.3% confidence");
        assert_eq!(alert_message("Assault", 0.9625), "Detected Assault with 96.3% confidence");
        assert_eq!(alert_message("Arson", 0.9025), "Detected Arson with 90.3% confidence");
    }
}
