//! Monitor loop: the single control task of the real-time pipeline.
//!
//! Multiplexes shutdown, playback events, inference completions and the
//! sampling tick in one `select!`. Inference runs on spawned tasks owned by
//! the [`InferenceCoordinator`]; explanation runs on the recorder's enricher.
//! Nothing here blocks on the network.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::coordinator::{CoordinatorStats, InferenceCompletion, InferenceCoordinator};
use super::enricher::EnricherStats;
use super::recorder::{EventRecorder, IngestOutcome, IngestStats};
use super::source::{PlaybackEvent, PlaybackSource};
use super::{MonitorState, MonitorStatus};
use crate::config::defaults::PROGRESS_LOG_EVERY_TICKS;
use crate::config::MonitorConfig;
use crate::sampler::FrameSampler;
use crate::services::InferenceClient;
use crate::storage::StoreStats;
use crate::types::EventOrigin;

/// Final statistics of a monitor run.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStats {
    pub ticks: u64,
    pub capture_timeouts: u64,
    pub requests: CoordinatorStats,
    pub ingest: IngestStats,
    pub explanations: Option<EnricherStats>,
    pub store: StoreStats,
}

/// Owns everything the real-time loop needs.
///
/// Built with [`new()`](MonitorLoop::new), then consumed by
/// [`run()`](MonitorLoop::run).
pub struct MonitorLoop {
    sampler: FrameSampler,
    coordinator: InferenceCoordinator,
    completions: mpsc::Receiver<InferenceCompletion>,
    recorder: EventRecorder,
    state: Arc<RwLock<MonitorState>>,
    period: Duration,
    cancel_token: CancellationToken,
    sampling: bool,
    ticks: u64,
    capture_timeouts: u64,
}

impl MonitorLoop {
    pub fn new(
        config: &MonitorConfig,
        inference: Arc<dyn InferenceClient>,
        recorder: EventRecorder,
        state: Arc<RwLock<MonitorState>>,
        cancel_token: CancellationToken,
    ) -> Self {
        let period = config.sampler.period();
        let stale_after = period * config.inference.stale_after_periods;
        let (coordinator, completions) = InferenceCoordinator::new(inference, stale_after, &cancel_token);

        Self {
            sampler: FrameSampler::from_config(&config.sampler),
            coordinator,
            completions,
            recorder,
            state,
            period,
            cancel_token,
            sampling: false,
            ticks: 0,
            capture_timeouts: 0,
        }
    }

    /// Run until the source closes or the cancel token fires.
    ///
    /// Returns final statistics.
    pub async fn run<S: PlaybackSource>(mut self, source: &mut S) -> MonitorStats {
        info!(
            "[MonitorLoop] Monitoring {} (period {} ms)",
            source.source_name(),
            self.period.as_millis()
        );
        {
            let mut state = self.state.write().await;
            state.source_name = Some(source.source_name().to_string());
        }

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!("[MonitorLoop] Shutdown signal received");
                    break;
                }
                event = source.next_event() => {
                    match event {
                        Ok(PlaybackEvent::Closed) => {
                            info!("[MonitorLoop] Source closed");
                            break;
                        }
                        Ok(event) => self.on_playback_event(event).await,
                        Err(e) => {
                            self.fail_source(e.to_string()).await;
                            break;
                        }
                    }
                }
                Some(completion) = self.completions.recv() => {
                    self.on_completion(completion).await;
                }
                _ = ticker.tick(), if self.sampling => {
                    self.on_tick(source).await;
                }
            }
        }

        self.coordinator.cancel_in_flight("shutdown");
        self.recorder.shutdown().await;

        let stats = self.stats();
        log_final_stats(&stats);
        stats
    }

    async fn on_playback_event(&mut self, event: PlaybackEvent) {
        debug!(?event, "[MonitorLoop] Playback event");
        match event {
            PlaybackEvent::Play => {
                let mut state = self.state.write().await;
                if let MonitorStatus::SourceFailed(reason) = &state.status {
                    warn!("[MonitorLoop] Ignoring play on failed source: {}", reason);
                    return;
                }
                state.status = MonitorStatus::Monitoring;
                self.sampling = true;
            }
            PlaybackEvent::Pause => {
                self.stop_sampling("paused");
                self.set_status(MonitorStatus::Paused).await;
            }
            PlaybackEvent::Ended => {
                self.stop_sampling("ended");
                self.set_status(MonitorStatus::Idle).await;
                info!("[MonitorLoop] Playback ended");
            }
            PlaybackEvent::Cleared => {
                self.detach("cleared");
                let mut state = self.state.write().await;
                state.status = MonitorStatus::Idle;
                state.source_name = None;
            }
            PlaybackEvent::SourceChanged(name) => {
                self.detach("source changed");
                info!("[MonitorLoop] Source changed to {}", name);
                let mut state = self.state.write().await;
                state.status = MonitorStatus::Idle;
                state.source_name = Some(name);
            }
            PlaybackEvent::MediaError(reason) => self.fail_source(reason).await,
            PlaybackEvent::Closed => {}
        }
    }

    async fn on_tick<S: PlaybackSource>(&mut self, source: &mut S) {
        self.ticks += 1;
        if self.ticks % PROGRESS_LOG_EVERY_TICKS == 0 {
            let stats = self.recorder.stats();
            info!(
                "[MonitorLoop] Progress: {} ticks | confirmed {} | potential {} | ignored {} | alerts {}",
                self.ticks, stats.confirmed, stats.potential, stats.ignored, stats.alerts
            );
        }

        if !self.coordinator.begin_prepare() {
            return;
        }

        let position = source.position_secs();
        if let Err(reason) = self.sampler.check(source.ready_state(), position) {
            self.coordinator.abort_prepare();
            debug!(?reason, position, "[MonitorLoop] Tick skipped");
            return;
        }

        // Playback events queue behind a capture, so it gets at most one period.
        let captured = tokio::select! {
            _ = self.cancel_token.cancelled() => None,
            captured = tokio::time::timeout(self.period, source.capture_frame()) => Some(captured),
        };
        let frame = match captured {
            Some(Ok(Ok(frame))) => frame,
            Some(Ok(Err(e))) => {
                self.coordinator.abort_prepare();
                self.fail_source(e.to_string()).await;
                return;
            }
            Some(Err(_elapsed)) => {
                self.coordinator.abort_prepare();
                self.capture_timeouts += 1;
                debug!(position, "[MonitorLoop] Capture exceeded one period, tick skipped");
                return;
            }
            None => {
                self.coordinator.abort_prepare();
                return;
            }
        };

        let sample = match self.sampler.prepare(position, &frame) {
            Ok(sample) => sample,
            Err(e) => {
                self.coordinator.abort_prepare();
                warn!(position, "[MonitorLoop] Failed to encode sample: {}", e);
                return;
            }
        };

        let captured_at = sample.captured_at;
        let ticket = self.coordinator.dispatch(sample);
        debug!(ticket, position, "[MonitorLoop] Sample dispatched");

        let mut state = self.state.write().await;
        state.ticks = self.ticks;
        state.samples_dispatched += 1;
        state.last_sample_position = Some(position);
        state.last_sample_at = Some(captured_at);
    }

    async fn on_completion(&mut self, completion: InferenceCompletion) {
        let Some(accepted) = self.coordinator.complete(completion) else {
            return;
        };

        let outcome = self
            .recorder
            .ingest(&accepted.result, Some(accepted.position_secs), EventOrigin::Realtime);

        let mut state = self.state.write().await;
        state.last_class = Some(accepted.result.predicted_class.clone());
        state.last_tier = Some(outcome.tier());
        if let IngestOutcome::Recorded { alert, .. } = &outcome {
            state.events_recorded += 1;
            if alert.is_some() {
                state.alerts_raised += 1;
            }
        }
    }

    fn stop_sampling(&mut self, reason: &str) {
        self.sampling = false;
        self.coordinator.cancel_in_flight(reason);
    }

    /// Stop sampling and forget everything tied to the previous media.
    fn detach(&mut self, reason: &str) {
        self.stop_sampling(reason);
        self.sampler.reset();
        self.recorder.store().clear_live();
    }

    async fn fail_source(&mut self, reason: String) {
        self.stop_sampling("source failed");
        error!("[MonitorLoop] Source failed, sampling halted until a new source: {}", reason);
        self.set_status(MonitorStatus::SourceFailed(reason)).await;
    }

    async fn set_status(&self, status: MonitorStatus) {
        self.state.write().await.status = status;
    }

    fn stats(&self) -> MonitorStats {
        MonitorStats {
            ticks: self.ticks,
            capture_timeouts: self.capture_timeouts,
            requests: self.coordinator.stats(),
            ingest: self.recorder.stats(),
            explanations: self.recorder.enricher_stats(),
            store: self.recorder.store().stats(),
        }
    }
}

fn log_final_stats(stats: &MonitorStats) {
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("📊 FINAL STATISTICS");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("   Ticks:                {}", stats.ticks);
    info!("   Capture Timeouts:     {}", stats.capture_timeouts);
    info!("   Requests Dispatched:  {}", stats.requests.dispatched);
    info!("   Requests Completed:   {}", stats.requests.completed);
    info!("   Superseded/Cancelled: {}/{}", stats.requests.superseded, stats.requests.cancelled);
    info!("   Failed:               {}", stats.requests.failed);
    info!("   Confirmed:            {}", stats.ingest.confirmed);
    info!("   Potential:            {}", stats.ingest.potential);
    info!("   Ignored:              {}", stats.ingest.ignored);
    info!("   Alerts:               {}", stats.ingest.alerts);
    if let Some(ref explanations) = stats.explanations {
        info!(
            "   Explanations:         {} requested, {} merged",
            explanations.requested, explanations.merged
        );
    }
    info!(
        "   Buckets:              {}/{}/{} events, {} alerts ({})",
        stats.store.confirmed_recent,
        stats.store.confirmed_historical,
        stats.store.potential_recent,
        stats.store.alerts,
        stats.store.backend
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
