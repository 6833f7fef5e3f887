//! Config validation: unknown-key detection with Levenshtein suggestions
//! and operating range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " — did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `MonitorConfig`.
///
/// Maintained by hand to match the structs in monitor_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [sampler]
        "sampler",
        "sampler.period_ms",
        "sampler.min_gap_secs",
        "sampler.target_size",
        "sampler.jpeg_quality",
        // [inference]
        "inference",
        "inference.base_url",
        "inference.timeout_secs",
        "inference.stale_after_periods",
        // [explanation]
        "explanation",
        "explanation.enabled",
        "explanation.base_url",
        "explanation.timeout_secs",
        "explanation.min_confidence",
        // [triage]
        "triage",
        "triage.confirmed_floor",
        "triage.potential_floor",
        "triage.baseline_class",
        // [store]
        "store",
        "store.data_dir",
        "store.confirmed_recent_capacity",
        "store.confirmed_historical_capacity",
        "store.potential_recent_capacity",
        "store.alerts_capacity",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// A table `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        // Ties broken alphabetically so suggestions are deterministic
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys — it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Operating Range Warnings
// ============================================================================

/// Flag values that are legal but likely to hurt the live pipeline.
pub fn validate_operating_ranges(config: &super::MonitorConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let s = &config.sampler;

    if s.period_ms < 50 {
        warnings.push(ValidationWarning {
            field: "sampler.period_ms".to_string(),
            message: format!(
                "sampler.period_ms = {} will flood the Inference Service (typical 100-1000 ms)",
                s.period_ms
            ),
            suggestion: None,
        });
    }

    // A gap wider than the period means most ticks are skipped at 1x playback
    if s.min_gap_secs * 1000.0 > s.period_ms as f64 {
        warnings.push(ValidationWarning {
            field: "sampler.min_gap_secs".to_string(),
            message: format!(
                "sampler.min_gap_secs = {:.3} exceeds the tick period ({} ms); ticks will be skipped",
                s.min_gap_secs, s.period_ms
            ),
            suggestion: None,
        });
    }

    if s.target_size > 1024 {
        warnings.push(ValidationWarning {
            field: "sampler.target_size".to_string(),
            message: format!(
                "sampler.target_size = {} is far above classifier input sizes (typical 224-640)",
                s.target_size
            ),
            suggestion: None,
        });
    }

    if config.inference.stale_after_periods < 2 {
        warnings.push(ValidationWarning {
            field: "inference.stale_after_periods".to_string(),
            message: "inference.stale_after_periods < 2 lets almost every slow request be superseded"
                .to_string(),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================
