//! Field Intel: Real-Time Video Classification Pipeline
//!
//! Samples frames from a playing video, classifies them through a remote
//! Inference Service, triages each result by confidence and keeps the
//! resulting event stream in bounded, durable buckets.
//!
//! ## Architecture
//!
//! - **Frame Sampler**: rate-limited, deduplicated 224×224 JPEG snapshots
//! - **Inference Coordinator**: one request in flight, tickets reject stale answers
//! - **Triage**: confidence → confirmed / potential / ignored
//! - **Event Store**: four newest-first buckets plus the live slot (sled)
//! - **Alert Generator**: one alert per confirmed, non-baseline event
//! - **Explanation Enricher**: background rationale requests merged by event id

pub mod config;
pub mod types;
pub mod triage;
pub mod alerts;
pub mod sampler;
pub mod services;
pub mod storage;
pub mod pipeline;

// Re-export configuration
pub use config::MonitorConfig;

// Re-export commonly used types
pub use types::{
    Alert, AlertSeverity, ClassScore, ClassificationResult, Event, EventId, EventOrigin,
    LiveResult, Tier,
};

// Re-export policy components
pub use alerts::AlertGenerator;
pub use triage::{triage, Triage, TriageDecision};

// Re-export pipeline components
pub use pipeline::{EventRecorder, ExplanationEnricher, IngestOutcome, MonitorLoop, MonitorState};
pub use sampler::{FrameSampler, ReadyState, Sample};
pub use services::{ExplanationClient, InferenceClient, ServiceError};
pub use storage::{EventStore, StatePersistence};
