//! Explanation Enricher
//!
//! Fire-and-forget rationale requests for fresh confirmed events. Each request
//! runs on its own tracked task and lands in the store through
//! [`EventStore::merge`]; a rationale for an event that has since been evicted
//! is simply dropped there.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::config::{ExplanationConfig, TriageConfig};
use crate::services::ExplanationClient;
use crate::storage::EventStore;
use crate::types::{Event, Tier};

#[derive(Debug, Default)]
struct Counters {
    requested: AtomicU64,
    merged: AtomicU64,
    orphaned: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
}

/// Explanation request counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnricherStats {
    pub requested: u64,
    /// Rationale stored on at least one copy of its event
    pub merged: u64,
    /// Rationale arrived after its event was evicted
    pub orphaned: u64,
    pub failed: u64,
    pub cancelled: u64,
}

pub struct ExplanationEnricher {
    client: Arc<dyn ExplanationClient>,
    store: Arc<EventStore>,
    baseline_class: String,
    min_confidence: f64,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    counters: Arc<Counters>,
}

impl ExplanationEnricher {
    pub fn new(
        client: Arc<dyn ExplanationClient>,
        store: Arc<EventStore>,
        explanation: &ExplanationConfig,
        triage: &TriageConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            store,
            baseline_class: triage.baseline_class.clone(),
            min_confidence: explanation.min_confidence,
            tracker: TaskTracker::new(),
            shutdown,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Confirmed, non-baseline, and above the confidence floor.
    pub fn should_explain(&self, event: &Event) -> bool {
        event.tier == Tier::Confirmed
            && event.predicted_class != self.baseline_class
            && event.confidence > self.min_confidence
    }

    /// Request a rationale for `event` in the background.
    pub fn spawn(&self, event: &Event) {
        self.counters.requested.fetch_add(1, Ordering::Relaxed);

        let id = event.id;
        let classification = event.classification();
        let client = Arc::clone(&self.client);
        let store = Arc::clone(&self.store);
        let counters = Arc::clone(&self.counters);
        let shutdown = self.shutdown.clone();

        self.tracker.spawn(async move {
            let outcome = tokio::select! {
                _ = shutdown.cancelled() => {
                    counters.cancelled.fetch_add(1, Ordering::Relaxed);
                    debug!(id = %id, "[Enricher] Explanation request cancelled");
                    return;
                }
                outcome = client.explain(&classification) => outcome,
            };

            match outcome {
                Ok(rationale) => {
                    if store.merge(id, rationale) > 0 {
                        counters.merged.fetch_add(1, Ordering::Relaxed);
                    } else {
                        counters.orphaned.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        id = %id,
                        class = %classification.predicted_class,
                        "[Enricher] Explanation request failed: {}",
                        e
                    );
                }
            }
        });
    }

    /// Requests still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting work and wait for running requests to finish.
    pub async fn close(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    pub fn stats(&self) -> EnricherStats {
        EnricherStats {
            requested: self.counters.requested.load(Ordering::Relaxed),
            merged: self.counters.merged.load(Ordering::Relaxed),
            orphaned: self.counters.orphaned.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            cancelled: self.counters.cancelled.load(Ordering::Relaxed),
        }
    }
}
