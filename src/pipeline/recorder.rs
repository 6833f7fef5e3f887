//! Event Recorder
//!
//! Everything downstream of a classification: triage, bucket writes, alert
//! derivation, the live slot, and (optionally) the explanation request.
//! Shared by the real-time loop and the still-image path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::enricher::{EnricherStats, ExplanationEnricher};
use crate::sampler::{FrameSampler, SamplerError};
use crate::services::{InferenceClient, ServiceError};
use crate::storage::EventStore;
use crate::triage::Triage;
use crate::types::{Alert, ClassificationResult, Event, EventOrigin, LiveResult, Tier};

/// Errors of the still-image path.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Sampler(#[from] SamplerError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// What a single ingested result turned into.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// Below the potential floor: nothing stored, live slot cleared
    Ignored { predicted_class: String, confidence: f64 },
    Recorded {
        event: Event,
        alert: Option<Alert>,
        explanation_requested: bool,
    },
}

impl IngestOutcome {
    pub fn tier(&self) -> Tier {
        match self {
            IngestOutcome::Ignored { .. } => Tier::Ignored,
            IngestOutcome::Recorded { event, .. } => event.tier,
        }
    }

    pub fn event(&self) -> Option<&Event> {
        match self {
            IngestOutcome::Recorded { event, .. } => Some(event),
            IngestOutcome::Ignored { .. } => None,
        }
    }

    pub fn alert(&self) -> Option<&Alert> {
        match self {
            IngestOutcome::Recorded { alert, .. } => alert.as_ref(),
            IngestOutcome::Ignored { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    confirmed: AtomicU64,
    potential: AtomicU64,
    ignored: AtomicU64,
    alerts: AtomicU64,
    still_images: AtomicU64,
}

/// Per-tier ingest counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub confirmed: u64,
    pub potential: u64,
    pub ignored: u64,
    pub alerts: u64,
    pub still_images: u64,
}

pub struct EventRecorder {
    store: Arc<EventStore>,
    triage: Triage,
    enricher: Option<ExplanationEnricher>,
    counters: Counters,
}

impl EventRecorder {
    pub fn new(store: Arc<EventStore>, triage: Triage) -> Self {
        Self {
            store,
            triage,
            enricher: None,
            counters: Counters::default(),
        }
    }

    /// Attach an explanation enricher for confirmed events.
    pub fn with_enricher(mut self, enricher: ExplanationEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    pub fn triage(&self) -> &Triage {
        &self.triage
    }

    /// Triage `result` and apply it to the store.
    pub fn ingest(
        &self,
        result: &ClassificationResult,
        position_secs: Option<f64>,
        origin: EventOrigin,
    ) -> IngestOutcome {
        let decision = self.triage.triage(result.confidence);

        let event = match Event::from_result(
            result,
            decision.tier,
            decision.counts_toward_monitoring,
            position_secs,
            origin,
        ) {
            Some(event) => event,
            None => {
                self.counters.ignored.fetch_add(1, Ordering::Relaxed);
                self.store.clear_live();
                debug!(
                    class = %result.predicted_class,
                    confidence = result.confidence,
                    "[Recorder] Ignored low-confidence result"
                );
                return IngestOutcome::Ignored {
                    predicted_class: result.predicted_class.clone(),
                    confidence: result.confidence,
                };
            }
        };

        match event.tier {
            Tier::Confirmed => self.counters.confirmed.fetch_add(1, Ordering::Relaxed),
            _ => self.counters.potential.fetch_add(1, Ordering::Relaxed),
        };

        self.store.record(&event);
        let alert = self.store.record_alert(&event);
        if alert.is_some() {
            self.counters.alerts.fetch_add(1, Ordering::Relaxed);
        }
        self.store.publish_live(LiveResult::from(&event));

        let explanation_requested = match &self.enricher {
            Some(enricher) if enricher.should_explain(&event) => {
                enricher.spawn(&event);
                true
            }
            _ => false,
        };

        info!(
            class = %event.predicted_class,
            confidence = event.confidence,
            tier = %event.tier,
            position = ?event.position_secs,
            "[Recorder] {} {} ({:.1}%)",
            event.tier,
            event.predicted_class,
            event.confidence * 100.0
        );

        IngestOutcome::Recorded {
            event,
            alert,
            explanation_requested,
        }
    }

    /// Classify an arbitrary image and record it like a real-time sample.
    ///
    /// No sampler gating and no supersession: the call waits for its own
    /// response.
    pub async fn classify_still(
        &self,
        client: &dyn InferenceClient,
        sampler: &FrameSampler,
        image_bytes: &[u8],
    ) -> Result<IngestOutcome, PipelineError> {
        let frame_data = sampler.encode_still(image_bytes)?;
        let result = client.classify(&frame_data, None).await?;
        self.counters.still_images.fetch_add(1, Ordering::Relaxed);
        Ok(self.ingest(&result, None, EventOrigin::StillImage))
    }

    /// Wait for outstanding explanation requests.
    pub async fn shutdown(&self) {
        if let Some(enricher) = &self.enricher {
            enricher.close().await;
        }
    }

    pub fn stats(&self) -> IngestStats {
        IngestStats {
            confirmed: self.counters.confirmed.load(Ordering::Relaxed),
            potential: self.counters.potential.load(Ordering::Relaxed),
            ignored: self.counters.ignored.load(Ordering::Relaxed),
            alerts: self.counters.alerts.load(Ordering::Relaxed),
            still_images: self.counters.still_images.load(Ordering::Relaxed),
        }
    }

    pub fn enricher_stats(&self) -> Option<EnricherStats> {
        self.enricher.as_ref().map(|e| e.stats())
    }
}
