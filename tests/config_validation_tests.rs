//! Config Validation Tests
//!
//! Typo detection and range validation for `monitor_config.toml`, exercised
//! independently from the rest of the pipeline.

use field_intel::config::validation::{
    known_config_keys, suggest_correction, validate_operating_ranges, validate_unknown_keys,
};
use field_intel::config::{ConfigError, MonitorConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_triage_floor_warns_with_suggestion() {
    let toml_str = r#"
[triage]
confirmd_floor = 0.92
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("confirmd_floor"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("triage.confirmed_floor"),
        "Should suggest the correct spelling"
    );
}

#[test]
fn typo_in_sampler_section_warns() {
    let toml_str = r#"
[sampler]
perod_ms = 250
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("sampler.period_ms"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[sampler]
period_ms = 200
min_gap_secs = 0.15
target_size = 224
jpeg_quality = 50

[inference]
base_url = "http://gpu-box:8000"
timeout_secs = 5
stale_after_periods = 5

[explanation]
enabled = true
base_url = "http://gpu-box:8000"
timeout_secs = 30
min_confidence = 0.5

[triage]
confirmed_floor = 0.9
potential_floor = 0.7
baseline_class = "NormalVideos"

[store]
data_dir = "/var/lib/field-intel"
confirmed_recent_capacity = 50
confirmed_historical_capacity = 100
potential_recent_capacity = 50
alerts_capacity = 20
"#;
    assert!(validate_unknown_keys(toml_str).is_empty());
    let config = MonitorConfig::from_toml_str(toml_str).unwrap();
    assert_eq!(config.inference.base_url, "http://gpu-box:8000");
    assert!(validate_operating_ranges(&config).is_empty());
}

#[test]
fn unknown_section_has_no_suggestion() {
    let warnings = validate_unknown_keys("[dashboard]\nport = 8080\n");
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w.suggestion.is_none()));
}

#[test]
fn unknown_keys_do_not_fail_loading() {
    let config = MonitorConfig::from_toml_str("[store]\nalert_capacity = 5\n").unwrap();
    assert_eq!(config.store.alerts_capacity, 20);
}

#[test]
fn suggestion_ignores_distant_keys() {
    let known = known_config_keys();
    assert!(suggest_correction("completely.unrelated.key", &known).is_none());
    assert_eq!(
        suggest_correction("store.alerts_capacty", &known).as_deref(),
        Some("store.alerts_capacity")
    );
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn potential_floor_above_confirmed_is_rejected() {
    let err = MonitorConfig::from_toml_str(
        r#"
[triage]
confirmed_floor = 0.6
potential_floor = 0.8
"#,
    )
    .unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("potential_floor")));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn every_problem_is_reported_at_once() {
    let err = MonitorConfig::from_toml_str(
        r#"
[sampler]
period_ms = 0
jpeg_quality = 0

[store]
alerts_capacity = 0
"#,
    )
    .unwrap_err();
    match err {
        ConfigError::Validation(errors) => assert!(errors.len() >= 3, "got {errors:?}"),
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn aggressive_sampling_only_warns() {
    let config = MonitorConfig::from_toml_str("[sampler]\nperiod_ms = 20\n").unwrap();
    let warnings = validate_operating_ranges(&config);
    assert!(warnings.iter().any(|w| w.field == "sampler.period_ms"));
    assert!(warnings.iter().any(|w| w.field == "sampler.min_gap_secs"));
}

#[test]
fn config_file_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor_config.toml");

    let mut config = MonitorConfig::default();
    config.triage.baseline_class = "Normal".to_string();
    config.explanation.enabled = false;
    std::fs::write(&path, config.to_toml().unwrap()).unwrap();

    let loaded = MonitorConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.triage.baseline_class, "Normal");
    assert!(!loaded.explanation.enabled);
}
