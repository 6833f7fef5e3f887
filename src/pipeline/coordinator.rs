//! Inference Request Coordinator
//!
//! Keeps at most one inference request in flight. Every dispatch gets a
//! monotonically increasing ticket and a child [`CancellationToken`]; a
//! completion whose ticket is no longer current is discarded, so a superseded
//! request can never produce an event even if the network finishes it.
//!
//! ```text
//! tick ─► begin_prepare ─► (sampler) ─► dispatch ─► spawn(classify)
//!                                                        │
//!          complete(ticket == current) ◄── completion ◄──┘
//! ```
//!
//! The busy guard covers preparation and the in-flight request, the latter
//! only until `stale_after`. Past that bound the next sample supersedes the
//! stuck request instead of waiting for it.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::defaults::COMPLETION_CHANNEL_SIZE;
use crate::sampler::Sample;
use crate::services::{InferenceClient, ServiceError};
use crate::types::ClassificationResult;

/// Result of one dispatched request, tagged with its ticket.
#[derive(Debug)]
pub struct InferenceCompletion {
    pub ticket: u64,
    pub position_secs: f64,
    pub outcome: Result<ClassificationResult, ServiceError>,
}

/// A completion that survived the ticket check.
#[derive(Debug, Clone)]
pub struct AcceptedResult {
    pub ticket: u64,
    pub position_secs: f64,
    pub result: ClassificationResult,
}

/// Request lifecycle counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    pub dispatched: u64,
    pub completed: u64,
    pub superseded: u64,
    pub cancelled: u64,
    pub failed: u64,
    pub stale_discarded: u64,
    pub busy_skips: u64,
}

#[derive(Debug)]
struct InFlight {
    ticket: u64,
    token: CancellationToken,
    dispatched_at: Instant,
}

pub struct InferenceCoordinator {
    client: Arc<dyn InferenceClient>,
    shutdown: CancellationToken,
    completions_tx: mpsc::Sender<InferenceCompletion>,
    stale_after: Duration,
    next_ticket: u64,
    preparing: bool,
    in_flight: Option<InFlight>,
    stats: CoordinatorStats,
}

impl InferenceCoordinator {
    /// Build a coordinator and the receiver its completions arrive on.
    ///
    /// Request tokens are children of `shutdown`, so cancelling it aborts
    /// whatever is in flight.
    pub fn new(
        client: Arc<dyn InferenceClient>,
        stale_after: Duration,
        shutdown: &CancellationToken,
    ) -> (Self, mpsc::Receiver<InferenceCompletion>) {
        let (completions_tx, completions_rx) = mpsc::channel(COMPLETION_CHANNEL_SIZE);
        let coordinator = Self {
            client,
            shutdown: shutdown.clone(),
            completions_tx,
            stale_after,
            next_ticket: 1,
            preparing: false,
            in_flight: None,
            stats: CoordinatorStats::default(),
        };
        (coordinator, completions_rx)
    }

    /// Ticket of the request currently in flight.
    pub fn current_ticket(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|f| f.ticket)
    }

    /// Busy while preparing, or while a request is in flight and not yet stale.
    pub fn is_busy(&self) -> bool {
        self.preparing
            || self
                .in_flight
                .as_ref()
                .is_some_and(|f| f.dispatched_at.elapsed() < self.stale_after)
    }

    /// Claim the busy guard for preparing a sample.
    ///
    /// Returns `false` (and counts a skip) when the coordinator is busy.
    pub fn begin_prepare(&mut self) -> bool {
        if self.is_busy() {
            self.stats.busy_skips += 1;
            return false;
        }
        self.preparing = true;
        true
    }

    /// Release the guard without dispatching.
    pub fn abort_prepare(&mut self) {
        self.preparing = false;
    }

    /// Issue a request for `sample`, superseding any request still in flight.
    ///
    /// Returns the new ticket.
    pub fn dispatch(&mut self, sample: Sample) -> u64 {
        self.preparing = false;
        if let Some(previous) = self.in_flight.take() {
            previous.token.cancel();
            self.stats.superseded += 1;
            debug!(
                ticket = previous.ticket,
                age_ms = previous.dispatched_at.elapsed().as_millis() as u64,
                "[Coordinator] Superseded in-flight request"
            );
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let token = self.shutdown.child_token();
        self.in_flight = Some(InFlight {
            ticket,
            token: token.clone(),
            dispatched_at: Instant::now(),
        });
        self.stats.dispatched += 1;

        let client = Arc::clone(&self.client);
        let tx = self.completions_tx.clone();
        let position_secs = sample.position_secs;
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    debug!(ticket, "[Coordinator] Request cancelled");
                    return;
                }
                outcome = client.classify(&sample.frame_data, Some(position_secs)) => outcome,
            };
            if tx
                .send(InferenceCompletion {
                    ticket,
                    position_secs,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!(ticket, "[Coordinator] Completion receiver gone");
            }
        });

        ticket
    }

    /// Reconcile a completion against the current ticket.
    ///
    /// Returns the result only for the current ticket's successful request.
    pub fn complete(&mut self, completion: InferenceCompletion) -> Option<AcceptedResult> {
        if self.current_ticket() != Some(completion.ticket) {
            self.stats.stale_discarded += 1;
            debug!(
                ticket = completion.ticket,
                current = ?self.current_ticket(),
                "[Coordinator] Discarding stale completion"
            );
            return None;
        }
        self.in_flight = None;

        match completion.outcome {
            Ok(result) => {
                self.stats.completed += 1;
                Some(AcceptedResult {
                    ticket: completion.ticket,
                    position_secs: completion.position_secs,
                    result,
                })
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!(
                    ticket = completion.ticket,
                    position = completion.position_secs,
                    "[Coordinator] Inference request failed: {}",
                    e
                );
                None
            }
        }
    }

    /// Cancel whatever is in flight. Returns whether anything was cancelled.
    pub fn cancel_in_flight(&mut self, reason: &str) -> bool {
        self.preparing = false;
        match self.in_flight.take() {
            Some(in_flight) => {
                in_flight.token.cancel();
                self.stats.cancelled += 1;
                debug!(ticket = in_flight.ticket, reason, "[Coordinator] Cancelled in-flight request");
                true
            }
            None => false,
        }
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Answers after `delay`, echoing the call number as confidence hundredths.
    struct SlowClient {
        delay: Duration,
        calls: AtomicU64,
    }

    #[async_trait]
    impl InferenceClient for SlowClient {
        async fn classify(
            &self,
            _frame_data: &str,
            _position_secs: Option<f64>,
        ) -> Result<ClassificationResult, ServiceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            Ok(ClassificationResult::new("Fighting", n as f64 / 100.0, Vec::new()))
        }

        fn client_name(&self) -> &str {
            "slow"
        }
    }

    fn sample(position_secs: f64) -> Sample {
        Sample {
            position_secs,
            frame_data: "data:image/jpeg;base64,AAAA".to_string(),
            captured_at: Utc::now(),
        }
    }

    fn coordinator(delay: Duration, stale_after: Duration) -> (InferenceCoordinator, mpsc::Receiver<InferenceCompletion>) {
        let client = Arc::new(SlowClient {
            delay,
            calls: AtomicU64::new(0),
        });
        InferenceCoordinator::new(client, stale_after, &CancellationToken::new())
    }

    #[tokio::test]
    async fn test_single_request_completes() {
        let (mut coord, mut rx) = coordinator(Duration::from_millis(5), Duration::from_secs(1));
        assert!(coord.begin_prepare());
        let ticket = coord.dispatch(sample(1.0));
        assert!(coord.is_busy());

        let done = rx.recv().await.unwrap();
        let accepted = coord.complete(done).unwrap();
        assert_eq!(accepted.ticket, ticket);
        assert_eq!(accepted.position_secs, 1.0);
        assert!(!coord.is_busy());
        assert_eq!(coord.stats().completed, 1);
    }

    #[tokio::test]
    async fn test_busy_guard_blocks_while_fresh() {
        let (mut coord, _rx) = coordinator(Duration::from_secs(5), Duration::from_secs(5));
        assert!(coord.begin_prepare());
        assert!(!coord.begin_prepare());
        coord.dispatch(sample(1.0));
        assert!(!coord.begin_prepare());
        assert_eq!(coord.stats().busy_skips, 2);
    }

    #[tokio::test]
    async fn test_stale_request_is_superseded() {
        let (mut coord, mut rx) = coordinator(Duration::from_millis(200), Duration::from_millis(20));
        coord.dispatch(sample(1.0));
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(coord.begin_prepare());
        let second = coord.dispatch(sample(2.0));

        let done = rx.recv().await.unwrap();
        assert_eq!(done.ticket, second);
        assert!(coord.complete(done).is_some());

        let stats = coord.stats();
        assert_eq!(stats.superseded, 1);
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn test_late_completion_is_discarded() {
        let (mut coord, _rx) = coordinator(Duration::from_secs(5), Duration::from_secs(5));
        let first = coord.dispatch(sample(1.0));
        coord.dispatch(sample(2.0));

        let late = InferenceCompletion {
            ticket: first,
            position_secs: 1.0,
            outcome: Ok(ClassificationResult::new("Fighting", 0.99, Vec::new())),
        };
        assert!(coord.complete(late).is_none());
        assert_eq!(coord.stats().stale_discarded, 1);
        assert!(coord.current_ticket().is_some());
    }

    #[tokio::test]
    async fn test_cancel_in_flight_suppresses_completion() {
        let (mut coord, mut rx) = coordinator(Duration::from_millis(30), Duration::from_secs(1));
        coord.dispatch(sample(1.0));
        assert!(coord.cancel_in_flight("paused"));
        assert!(!coord.cancel_in_flight("paused"));

        let waited = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(waited.is_err(), "cancelled request must not complete");
        assert_eq!(coord.stats().cancelled, 1);
        assert!(!coord.is_busy());
    }

    #[tokio::test]
    async fn test_failure_clears_in_flight() {
        let (mut coord, _rx) = coordinator(Duration::from_secs(5), Duration::from_secs(5));
        let ticket = coord.dispatch(sample(1.0));
        let failed = InferenceCompletion {
            ticket,
            position_secs: 1.0,
            outcome: Err(ServiceError::Malformed("missing confidence".to_string())),
        };
        assert!(coord.complete(failed).is_none());
        assert_eq!(coord.stats().failed, 1);
        assert!(!coord.is_busy());
    }
}
