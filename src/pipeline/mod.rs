//! Real-Time Classification Pipeline
//!
//! ```text
//! PlaybackSource ──tick──► FrameSampler ──► InferenceCoordinator ──► Inference Service
//!                                                 │ (ticket check)
//!                                                 ▼
//!                         EventRecorder: Triage ─► EventStore + AlertGenerator
//!                                                 │ (confirmed, non-baseline)
//!                                                 ▼
//!                                      ExplanationEnricher ─► EventStore::merge
//! ```
//!
//! One control task (the [`MonitorLoop`]) drives everything; inference and
//! explanation requests run on spawned tasks and report back by channel or
//! by store merge.

mod state;
mod coordinator;
mod enricher;
mod recorder;
pub mod source;
pub mod processing_loop;

pub use state::*;
pub use coordinator::{AcceptedResult, CoordinatorStats, InferenceCompletion, InferenceCoordinator};
pub use enricher::{EnricherStats, ExplanationEnricher};
pub use processing_loop::{MonitorLoop, MonitorStats};
pub use recorder::{EventRecorder, IngestOutcome, IngestStats, PipelineError};
