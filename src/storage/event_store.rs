//! Event Store
//!
//! Owns the four capacity-bounded buckets and the live slot. Every mutation
//! serializes the touched bucket and hands it to the [`StatePersistence`]
//! backend before returning; a failed write is logged and counted, never
//! surfaced to the caller.
//!
//! ```text
//! record(confirmed) -> predictions + historicalPredictions
//! record(potential) -> potentialPredictions
//! record_alert      -> alerts            (confirmed, non-baseline only)
//! merge(id, r)      -> every bucket holding id + liveResult
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::persistence::{InMemoryPersistence, PersistenceError, StatePersistence};
use crate::alerts::AlertGenerator;
use crate::config::StoreConfig;
use crate::types::{Alert, Event, EventId, LiveResult, Tier};

/// Persisted key of the recent confirmed bucket
pub const KEY_CONFIRMED_RECENT: &str = "predictions";
/// Persisted key of the historical confirmed bucket
pub const KEY_CONFIRMED_HISTORICAL: &str = "historicalPredictions";
/// Persisted key of the potential bucket
pub const KEY_POTENTIAL_RECENT: &str = "potentialPredictions";
/// Persisted key of the alerts bucket
pub const KEY_ALERTS: &str = "alerts";
/// Persisted key of the live slot
pub const KEY_LIVE_RESULT: &str = "liveResult";

// ============================================================================
// Bucket
// ============================================================================

/// Newest-first list with a fixed capacity: head insertion, tail eviction.
#[derive(Debug, Clone)]
pub struct Bucket<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Bucket<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build from a newest-first list, dropping whatever exceeds capacity.
    pub fn from_newest_first(items: Vec<T>, capacity: usize) -> Self {
        let mut items: VecDeque<T> = items.into();
        items.truncate(capacity);
        Self { items, capacity }
    }

    /// Insert at the head. Returns the evicted tail item, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_front(item);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}

impl<T: Clone> Bucket<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Bucket sizes and write health.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub confirmed_recent: usize,
    pub confirmed_historical: usize,
    pub potential_recent: usize,
    pub alerts: usize,
    pub has_live_result: bool,
    pub persist_failures: u64,
    pub backend: &'static str,
}

// ============================================================================
// Event Store
// ============================================================================

struct Buckets {
    confirmed_recent: Bucket<Event>,
    confirmed_historical: Bucket<Event>,
    potential_recent: Bucket<Event>,
    alerts: Bucket<Alert>,
    live: Option<LiveResult>,
}

/// Durable store for the event stream.
///
/// Cheap to share behind an `Arc`; all access is serialized by an internal lock.
pub struct EventStore {
    buckets: RwLock<Buckets>,
    backend: Arc<dyn StatePersistence>,
    alert_generator: AlertGenerator,
    persist_failures: AtomicU64,
}

/// How [`EventStore::open`] treats buckets left behind by an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// First open of a new session: confirmed buckets and alerts start empty
    /// and the saved live result is dropped. Potential events carry over.
    #[default]
    Fresh,
    /// Reload within the running session: everything is restored.
    Resume,
}

impl EventStore {
    /// Open the store on `backend`, restoring what `mode` allows.
    pub fn open(
        backend: Arc<dyn StatePersistence>,
        config: &StoreConfig,
        alert_generator: AlertGenerator,
        mode: SessionMode,
    ) -> Self {
        let potential_recent = restore_bucket(
            backend.as_ref(),
            KEY_POTENTIAL_RECENT,
            config.potential_recent_capacity,
        );

        let buckets = match mode {
            SessionMode::Resume => {
                let confirmed_historical: Bucket<Event> = restore_bucket(
                    backend.as_ref(),
                    KEY_CONFIRMED_HISTORICAL,
                    config.confirmed_historical_capacity,
                );
                let mut confirmed_recent = restore_bucket(
                    backend.as_ref(),
                    KEY_CONFIRMED_RECENT,
                    config.confirmed_recent_capacity,
                );
                if confirmed_recent.is_empty() && !confirmed_historical.is_empty() {
                    debug!("[EventStore] Recent bucket empty, backfilling from history");
                    confirmed_recent = Bucket::from_newest_first(
                        confirmed_historical.to_vec(),
                        config.confirmed_recent_capacity,
                    );
                }
                Buckets {
                    confirmed_recent,
                    confirmed_historical,
                    potential_recent,
                    alerts: restore_bucket(backend.as_ref(), KEY_ALERTS, config.alerts_capacity),
                    live: restore_value(backend.as_ref(), KEY_LIVE_RESULT),
                }
            }
            SessionMode::Fresh => {
                if let Err(e) = backend.remove(KEY_LIVE_RESULT) {
                    warn!(error = %e, "[EventStore] Failed to drop saved live result");
                }
                Buckets {
                    confirmed_recent: Bucket::new(config.confirmed_recent_capacity),
                    confirmed_historical: Bucket::new(config.confirmed_historical_capacity),
                    potential_recent,
                    alerts: Bucket::new(config.alerts_capacity),
                    live: None,
                }
            }
        };

        info!(
            backend = backend.backend_name(),
            ?mode,
            confirmed_recent = buckets.confirmed_recent.len(),
            confirmed_historical = buckets.confirmed_historical.len(),
            potential_recent = buckets.potential_recent.len(),
            alerts = buckets.alerts.len(),
            "[EventStore] Restored buckets"
        );

        Self {
            buckets: RwLock::new(buckets),
            backend,
            alert_generator,
            persist_failures: AtomicU64::new(0),
        }
    }

    /// Non-durable store with default capacities and baseline class.
    pub fn in_memory() -> Self {
        Self::open(
            Arc::new(InMemoryPersistence::new()),
            &StoreConfig::default(),
            AlertGenerator::default(),
            SessionMode::Fresh,
        )
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Append a triaged event to the buckets its tier selects.
    ///
    /// Returns `false` when the event touched no bucket.
    pub fn record(&self, event: &Event) -> bool {
        let mut buckets = self.write_buckets();
        let mut stored = false;

        if event.counts_toward_monitoring {
            buckets.confirmed_recent.push(event.clone());
            buckets.confirmed_historical.push(event.clone());
            self.persist_list(KEY_CONFIRMED_RECENT, &buckets.confirmed_recent);
            self.persist_list(KEY_CONFIRMED_HISTORICAL, &buckets.confirmed_historical);
            stored = true;
        }
        if event.tier == Tier::Potential {
            buckets.potential_recent.push(event.clone());
            self.persist_list(KEY_POTENTIAL_RECENT, &buckets.potential_recent);
            stored = true;
        }

        if stored {
            debug!(
                id = %event.id,
                class = %event.predicted_class,
                tier = %event.tier,
                "[EventStore] Recorded event"
            );
        } else {
            debug!(id = %event.id, tier = %event.tier, "[EventStore] Event matched no bucket");
        }
        stored
    }

    /// Derive and append the alert for a confirmed, non-baseline event.
    pub fn record_alert(&self, event: &Event) -> Option<Alert> {
        if event.tier != Tier::Confirmed {
            return None;
        }
        let alert = self.alert_generator.generate(event)?;

        let mut buckets = self.write_buckets();
        buckets.alerts.push(alert.clone());
        self.persist_list(KEY_ALERTS, &buckets.alerts);
        drop(buckets);

        info!(
            class = %alert.alert_type,
            confidence = alert.confidence,
            "[EventStore] ALERT: {}",
            alert.message
        );
        Some(alert)
    }

    /// Attach `rationale` to every stored copy of event `id` and to the live
    /// slot when it shows that event.
    ///
    /// Returns the number of places updated; zero for unknown or evicted ids.
    pub fn merge(&self, id: EventId, rationale: serde_json::Value) -> usize {
        let mut buckets = self.write_buckets();
        let mut updated = 0;

        if set_rationale(&mut buckets.confirmed_recent, id, &rationale) {
            self.persist_list(KEY_CONFIRMED_RECENT, &buckets.confirmed_recent);
            updated += 1;
        }
        if set_rationale(&mut buckets.confirmed_historical, id, &rationale) {
            self.persist_list(KEY_CONFIRMED_HISTORICAL, &buckets.confirmed_historical);
            updated += 1;
        }
        if set_rationale(&mut buckets.potential_recent, id, &rationale) {
            self.persist_list(KEY_POTENTIAL_RECENT, &buckets.potential_recent);
            updated += 1;
        }

        if let Some(live) = buckets.live.as_mut().filter(|live| live.event_id == id) {
            live.rationale = Some(rationale);
            self.persist_value(KEY_LIVE_RESULT, live);
            updated += 1;
        }

        if updated == 0 {
            debug!(id = %id, "[EventStore] Merge target no longer stored, dropping rationale");
        } else {
            debug!(id = %id, updated, "[EventStore] Rationale merged");
        }
        updated
    }

    /// Replace the live slot.
    pub fn publish_live(&self, live: LiveResult) {
        let mut buckets = self.write_buckets();
        self.persist_value(KEY_LIVE_RESULT, &live);
        buckets.live = Some(live);
    }

    /// Empty the live slot. Returns whether it held a result.
    pub fn clear_live(&self) -> bool {
        let mut buckets = self.write_buckets();
        let had = buckets.live.take().is_some();
        if had {
            if let Err(e) = self.backend.remove(KEY_LIVE_RESULT) {
                self.note_failure(KEY_LIVE_RESULT, &e);
            }
        }
        had
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    pub fn live(&self) -> Option<LiveResult> {
        self.read_buckets().live.clone()
    }

    /// Recent confirmed events, newest first
    pub fn confirmed_recent(&self) -> Vec<Event> {
        self.read_buckets().confirmed_recent.to_vec()
    }

    /// Historical confirmed events, newest first
    pub fn confirmed_historical(&self) -> Vec<Event> {
        self.read_buckets().confirmed_historical.to_vec()
    }

    /// Potential events, newest first
    pub fn potential_recent(&self) -> Vec<Event> {
        self.read_buckets().potential_recent.to_vec()
    }

    /// Alerts, newest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.read_buckets().alerts.to_vec()
    }

    /// Find a stored event by id in any bucket.
    pub fn get(&self, id: EventId) -> Option<Event> {
        let buckets = self.read_buckets();
        let found = buckets
            .confirmed_recent
            .iter()
            .chain(buckets.confirmed_historical.iter())
            .chain(buckets.potential_recent.iter())
            .find(|e| e.id == id)
            .cloned();
        found
    }

    pub fn stats(&self) -> StoreStats {
        let buckets = self.read_buckets();
        StoreStats {
            confirmed_recent: buckets.confirmed_recent.len(),
            confirmed_historical: buckets.confirmed_historical.len(),
            potential_recent: buckets.potential_recent.len(),
            alerts: buckets.alerts.len(),
            has_live_result: buckets.live.is_some(),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
            backend: self.backend.backend_name(),
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn read_buckets(&self) -> RwLockReadGuard<'_, Buckets> {
        self.buckets.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_buckets(&self) -> RwLockWriteGuard<'_, Buckets> {
        self.buckets.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist_list<T: Serialize>(&self, key: &str, bucket: &Bucket<T>) {
        let items: Vec<&T> = bucket.iter().collect();
        self.persist_value(key, &items);
    }

    fn persist_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_vec(value)
            .map_err(PersistenceError::from)
            .and_then(|bytes| self.backend.save(key, &bytes));
        if let Err(e) = result {
            self.note_failure(key, &e);
        }
    }

    fn note_failure(&self, key: &str, err: &PersistenceError) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
        warn!(key, error = %err, "[EventStore] Failed to persist bucket");
    }
}

fn set_rationale(bucket: &mut Bucket<Event>, id: EventId, rationale: &serde_json::Value) -> bool {
    match bucket.iter_mut().find(|e| e.id == id) {
        Some(event) => {
            event.rationale = Some(rationale.clone());
            true
        }
        None => false,
    }
}

fn restore_bucket<T: DeserializeOwned>(
    backend: &dyn StatePersistence,
    key: &str,
    capacity: usize,
) -> Bucket<T> {
    let items: Vec<T> = restore_value(backend, key).unwrap_or_default();
    if items.len() > capacity {
        warn!(
            key,
            stored = items.len(),
            capacity,
            "[EventStore] Restored bucket over capacity, truncating"
        );
    }
    Bucket::from_newest_first(items, capacity)
}

fn restore_value<T: DeserializeOwned>(backend: &dyn StatePersistence, key: &str) -> Option<T> {
    let bytes = match backend.load(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "[EventStore] Failed to load bucket, starting empty");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "[EventStore] Corrupt bucket, starting empty");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::triage;
    use crate::types::{ClassificationResult, EventOrigin};
    use serde_json::json;

    fn event(class: &str, confidence: f64) -> Event {
        let decision = triage(confidence);
        Event::from_result(
            &ClassificationResult::new(class, confidence, Vec::new()),
            decision.tier,
            decision.counts_toward_monitoring,
            Some(1.0),
            EventOrigin::Realtime,
        )
        .unwrap()
    }

    fn open_resumed(backend: Arc<InMemoryPersistence>, config: &StoreConfig) -> EventStore {
        EventStore::open(backend, config, AlertGenerator::default(), SessionMode::Resume)
    }

    /// Backend whose writes always fail.
    struct BrokenBackend;

    impl StatePersistence for BrokenBackend {
        fn save(&self, _key: &str, _value: &[u8]) -> Result<(), PersistenceError> {
            Err(PersistenceError::Storage("disk full".to_string()))
        }
        fn load(&self, _key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
            Ok(None)
        }
        fn remove(&self, _key: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Storage("disk full".to_string()))
        }
        fn backend_name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn test_bucket_evicts_tail() {
        let mut bucket = Bucket::new(3);
        for i in 0..3 {
            assert!(bucket.push(i).is_none());
        }
        assert_eq!(bucket.push(3), Some(0));
        assert_eq!(bucket.to_vec(), vec![3, 2, 1]);
        assert_eq!(bucket.capacity(), 3);
    }

    #[test]
    fn test_confirmed_goes_to_both_confirmed_buckets() {
        let store = EventStore::in_memory();
        let e = event("Fighting", 0.95);
        assert!(store.record(&e));

        let stats = store.stats();
        assert_eq!(stats.confirmed_recent, 1);
        assert_eq!(stats.confirmed_historical, 1);
        assert_eq!(stats.potential_recent, 0);
        assert_eq!(store.get(e.id).unwrap().predicted_class, "Fighting");
    }

    #[test]
    fn test_potential_goes_to_potential_bucket() {
        let store = EventStore::in_memory();
        let e = event("Stealing", 0.80);
        assert!(store.record(&e));
        assert!(store.record_alert(&e).is_none());

        let stats = store.stats();
        assert_eq!(stats.confirmed_recent, 0);
        assert_eq!(stats.potential_recent, 1);
        assert_eq!(stats.alerts, 0);
    }

    #[test]
    fn test_record_alert_skips_baseline() {
        let store = EventStore::in_memory();
        let baseline = event("NormalVideos", 0.92);
        store.record(&baseline);
        assert!(store.record_alert(&baseline).is_none());

        let fighting = event("Fighting", 0.95);
        store.record(&fighting);
        let alert = store.record_alert(&fighting).unwrap();
        assert_eq!(alert.event_id, Some(fighting.id));
        assert_eq!(store.alerts().len(), 1);
    }

    #[test]
    fn test_recent_bucket_keeps_latest_fifty() {
        let store = EventStore::in_memory();
        let events: Vec<Event> = (0..51).map(|_| event("Fighting", 0.95)).collect();
        for e in &events {
            store.record(e);
        }

        let recent = store.confirmed_recent();
        assert_eq!(recent.len(), 50);
        assert_eq!(recent[0].id, events[50].id);
        assert_eq!(recent[49].id, events[1].id);
        assert_eq!(store.confirmed_historical().len(), 51);
    }

    #[test]
    fn test_merge_updates_every_copy_and_live_slot() {
        let store = EventStore::in_memory();
        let e = event("Arson", 0.97);
        store.record(&e);
        store.publish_live(LiveResult::from(&e));

        let updated = store.merge(e.id, json!({"summary": "flames near exit"}));
        assert_eq!(updated, 3);
        assert!(store.confirmed_recent()[0].has_rationale());
        assert!(store.confirmed_historical()[0].has_rationale());
        assert_eq!(
            store.live().unwrap().rationale,
            Some(json!({"summary": "flames near exit"}))
        );
    }

    #[test]
    fn test_merge_unknown_id_is_noop() {
        let store = EventStore::in_memory();
        store.record(&event("Fighting", 0.95));
        let before = store.confirmed_recent();

        assert_eq!(store.merge(EventId::new(), json!("late")), 0);
        assert_eq!(store.confirmed_recent(), before);
    }

    #[test]
    fn test_live_slot_lifecycle() {
        let store = EventStore::in_memory();
        assert!(!store.clear_live());

        let e = event("Robbery", 0.91);
        store.publish_live(LiveResult::from(&e));
        assert_eq!(store.live().unwrap().event_id, e.id);
        assert!(store.clear_live());
        assert!(store.live().is_none());
    }

    #[test]
    fn test_restore_from_sled_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::default();
        let e = event("Shooting", 0.99);
        {
            let backend = Arc::new(super::super::SledPersistence::open(dir.path()).unwrap());
            let store =
                EventStore::open(backend, &config, AlertGenerator::default(), SessionMode::Resume);
            store.record(&e);
            store.record_alert(&e);
            store.publish_live(LiveResult::from(&e));
        }

        let backend = Arc::new(super::super::SledPersistence::open(dir.path()).unwrap());
        let store = EventStore::open(backend, &config, AlertGenerator::default(), SessionMode::Resume);
        assert_eq!(store.confirmed_recent()[0].id, e.id);
        assert_eq!(store.alerts().len(), 1);
        assert_eq!(store.live().unwrap().event_id, e.id);
    }

    #[test]
    fn test_corrupt_bucket_starts_empty() {
        let backend = Arc::new(InMemoryPersistence::new());
        backend.save(KEY_CONFIRMED_RECENT, b"not json").unwrap();
        backend.save(KEY_ALERTS, b"[]").unwrap();

        let store = open_resumed(backend, &StoreConfig::default());
        assert_eq!(store.stats().confirmed_recent, 0);
        assert_eq!(store.stats().alerts, 0);
    }

    #[test]
    fn test_restore_truncates_over_capacity() {
        let backend = Arc::new(InMemoryPersistence::new());
        let events: Vec<Event> = (0..5).map(|_| event("Fighting", 0.95)).collect();
        backend
            .save(KEY_POTENTIAL_RECENT, &serde_json::to_vec(&events).unwrap())
            .unwrap();

        let config = StoreConfig {
            potential_recent_capacity: 3,
            ..StoreConfig::default()
        };
        let store = open_resumed(backend, &config);
        let restored = store.potential_recent();
        assert_eq!(restored.len(), 3);
        assert_eq!(restored[0].id, events[0].id);
    }

    #[test]
    fn test_persistence_failure_is_not_fatal() {
        let store = EventStore::open(
            Arc::new(BrokenBackend),
            &StoreConfig::default(),
            AlertGenerator::default(),
            SessionMode::Fresh,
        );
        let e = event("Fighting", 0.95);
        assert!(store.record(&e));
        assert!(store.record_alert(&e).is_some());

        let stats = store.stats();
        assert_eq!(stats.confirmed_recent, 1);
        assert_eq!(stats.alerts, 1);
        assert_eq!(stats.persist_failures, 3);
        assert_eq!(stats.backend, "broken");
    }

    #[test]
    fn test_fresh_session_starts_empty_but_keeps_potential() {
        let backend = Arc::new(InMemoryPersistence::new());
        let confirmed = event("Fighting", 0.95);
        let potential = event("Stealing", 0.80);
        {
            let store = open_resumed(Arc::clone(&backend), &StoreConfig::default());
            store.record(&confirmed);
            store.record_alert(&confirmed);
            store.record(&potential);
            store.publish_live(LiveResult::from(&confirmed));
        }

        let store = EventStore::open(
            Arc::clone(&backend) as Arc<dyn StatePersistence>,
            &StoreConfig::default(),
            AlertGenerator::default(),
            SessionMode::Fresh,
        );
        let stats = store.stats();
        assert_eq!(stats.confirmed_recent, 0);
        assert_eq!(stats.confirmed_historical, 0);
        assert_eq!(stats.alerts, 0);
        assert!(!stats.has_live_result);
        assert_eq!(store.potential_recent()[0].id, potential.id);
        assert!(backend.load(KEY_LIVE_RESULT).unwrap().is_none());
    }

    #[test]
    fn test_resume_backfills_recent_from_history() {
        let backend = Arc::new(InMemoryPersistence::new());
        let history: Vec<Event> = (0..60).map(|_| event("Fighting", 0.95)).collect();
        backend
            .save(KEY_CONFIRMED_HISTORICAL, &serde_json::to_vec(&history).unwrap())
            .unwrap();
        backend.save(KEY_CONFIRMED_RECENT, b"[]").unwrap();

        let store = open_resumed(backend, &StoreConfig::default());
        let recent = store.confirmed_recent();
        assert_eq!(recent.len(), 50);
        assert_eq!(recent[0].id, history[0].id);
        assert_eq!(recent[49].id, history[49].id);
        assert_eq!(store.confirmed_historical().len(), 60);
    }

    #[test]
    fn test_resume_keeps_nonempty_recent_bucket() {
        let backend = Arc::new(InMemoryPersistence::new());
        let history: Vec<Event> = (0..3).map(|_| event("Fighting", 0.95)).collect();
        backend
            .save(KEY_CONFIRMED_HISTORICAL, &serde_json::to_vec(&history).unwrap())
            .unwrap();
        backend
            .save(KEY_CONFIRMED_RECENT, &serde_json::to_vec(&history[..1]).unwrap())
            .unwrap();

        let store = open_resumed(backend, &StoreConfig::default());
        assert_eq!(store.confirmed_recent().len(), 1);
    }

    #[test]
    fn test_get_finds_events_in_any_bucket() {
        let store = EventStore::in_memory();
        let potential = event("Stealing", 0.80);
        store.record(&potential);
        assert_eq!(store.get(potential.id).unwrap().id, potential.id);
        assert!(store.get(EventId::new()).is_none());
    }
}
