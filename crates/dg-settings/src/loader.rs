//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`TriggerSettings::default()`]
//! 2. If the file named by `DG_TRIGGER_SETTINGS` exists, deep-merge it over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{ApiKey, TriggerSettings};

/// Env var naming the settings file.
pub const SETTINGS_PATH_ENV: &str = "DG_TRIGGER_SETTINGS";

const DEFAULT_SETTINGS_FILE: &str = "dg-trigger.json";

/// Resolve the path to the settings file.
///
/// `DG_TRIGGER_SETTINGS` wins; otherwise `dg-trigger.json` in the working
/// directory.
pub fn settings_path() -> PathBuf {
    std::env::var(SETTINGS_PATH_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE), PathBuf::from)
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<TriggerSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or a value that fails
/// [`TriggerSettings::validate`] is an error.
pub fn load_settings_from_path(path: &Path) -> Result<TriggerSettings> {
    load_settings_with(path, |name| std::env::var(name).ok())
}

/// Load settings from `path`, reading overrides through `lookup`.
pub fn load_settings_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<TriggerSettings> {
    let defaults = serde_json::to_value(TriggerSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: TriggerSettings = serde_json::from_value(merged)?;
    apply_env_overrides_from(&mut settings, lookup);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply overrides, reading each variable through `lookup`.
///
/// Empty values count as unset. Values that fail to parse or fall out of
/// range are logged and ignored.
pub fn apply_env_overrides_from(
    settings: &mut TriggerSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let env = EnvReader { lookup };

    // ── Integrator target ───────────────────────────────────────────
    let integrator = &mut settings.integrator;
    if let Some(v) = env.string("KVS_DG_INTEGRATOR_URL") {
        integrator.url = Some(v);
    }
    if let Some(v) = env.string("KVS_DG_INTEGRATOR_LAMBDA") {
        integrator.lambda = Some(v);
    }
    if let Some(v) = env.string("KVS_DG_INTEGRATOR_CLUSTER") {
        integrator.cluster = Some(v);
    }
    if let Some(v) = env.string("KVS_DG_INTEGRATOR_TASK_DEFINITION") {
        integrator.task_definition = Some(v);
    }
    if let Some(v) = env.string("KVS_DG_INTEGRATOR_SECURITY_GROUP") {
        integrator.security_group = Some(v);
    }
    if let Some(v) = env.string("KVS_DG_INTEGRATOR_SUBNETS") {
        integrator.subnets = parse_list(&v);
    }
    if let Some(v) = env.string("DEEPGRAM_API_KEY") {
        integrator.deepgram_api_key = Some(ApiKey::new(v));
    }
    if let Some(v) = env.string("AWS_REGION") {
        integrator.aws_region = Some(v);
    }
    if let Some(v) = env.bool("KVS_DG_ENFORCE_REALTIME") {
        integrator.enforce_realtime = v;
    }

    // ── Load test ───────────────────────────────────────────────────
    if let Some(v) = env.u32("LOAD_TEST_SESSION_COUNT", 1, 10_000) {
        settings.load_test.session_count = v;
    }
    if let Some(v) = env.u64("LOAD_TEST_INTERVAL_MS", 1, 3_600_000) {
        settings.load_test.interval_ms = v;
    }

    // ── Server and logging ──────────────────────────────────────────
    if let Some(v) = env.string("DG_TRIGGER_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env.u16("DG_TRIGGER_PORT", 1, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = env.string("DG_TRIGGER_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.bool("DG_TRIGGER_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Split a comma-separated list, dropping blank entries.
pub fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = self.string(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u16(&self, name: &str, min: u16, max: u16) -> Option<u16> {
        let val = self.string(name)?;
        let result = parse_u16_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
        }
        result
    }

    fn u32(&self, name: &str, min: u32, max: u32) -> Option<u32> {
        let val = self.string(name)?;
        let result = parse_u32_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
        }
        result
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = self.string(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
