//! Shared data model for the classification pipeline.

mod classification;
mod event;

pub use classification::{ClassScore, ClassificationResult};
pub use event::{Alert, AlertSeverity, Event, EventId, EventOrigin, LiveResult, Tier};
