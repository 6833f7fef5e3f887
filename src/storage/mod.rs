//! Event Persistence
//!
//! Bounded, durable buckets for the classification event stream, backed by a
//! pluggable key/value layer (sled on disk, or in-memory for tests).

mod event_store;
pub mod persistence;

pub use event_store::{
    Bucket, EventStore, SessionMode, StoreStats, KEY_ALERTS, KEY_CONFIRMED_HISTORICAL, KEY_CONFIRMED_RECENT,
    KEY_LIVE_RESULT, KEY_POTENTIAL_RECENT,
};
pub use persistence::{InMemoryPersistence, PersistenceError, SledPersistence, StatePersistence};

use std::sync::Arc;

use crate::alerts::AlertGenerator;
use crate::config::MonitorConfig;

/// Open the sled-backed store under `config.store.data_dir`.
pub fn open_store(config: &MonitorConfig, mode: SessionMode) -> Result<EventStore, PersistenceError> {
    let db_path = config.store.data_dir.join("events.db");
    let backend = SledPersistence::open(&db_path)?;
    Ok(EventStore::open(
        Arc::new(backend),
        &config.store,
        AlertGenerator::from_config(&config.triage),
        mode,
    ))
}
