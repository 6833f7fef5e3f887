//! Monitor Configuration Module
//!
//! Provides pipeline configuration loaded from TOML files, replacing the
//! hardcoded sampling rates, service endpoints, triage floors and bucket
//! capacities with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `FIELD_INTEL_CONFIG` environment variable (path to TOML file)
//! 2. `monitor_config.toml` in the current working directory
//! 3. Built-in defaults (see [`defaults`])
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(MonitorConfig::load());
//! let floor = config::get().triage.confirmed_floor;
//! ```

mod monitor_config;
pub mod defaults;
pub mod validation;

pub use monitor_config::*;

use std::sync::OnceLock;

/// Global monitor configuration, initialized once at startup.
static MONITOR_CONFIG: OnceLock<MonitorConfig> = OnceLock::new();

/// Initialize the global monitor configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: MonitorConfig) {
    if MONITOR_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global monitor configuration.
///
/// Falls back to built-in defaults when `init()` was never called, so library
/// users that pass config explicitly never trip over it.
pub fn get() -> &'static MonitorConfig {
    if !is_initialized() {
        tracing::debug!("config::get() before init(), using defaults");
    }
    MONITOR_CONFIG.get_or_init(MonitorConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    MONITOR_CONFIG.get().is_some()
}
