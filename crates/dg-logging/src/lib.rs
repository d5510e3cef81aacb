//! # dg-logging
//!
//! Structured logging with `tracing`.
//!
//! Deployed functions log JSON lines so the platform's log service can index
//! the fields; local runs use the compact human-readable format. `RUST_LOG`
//! always wins over the configured level.

#![deny(unsafe_code)]

pub mod test_utils;

pub use test_utils::{CapturedEvent, CapturedLogs, capture_logs};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Output format of the stderr subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Compact single-line text.
    Compact,
}

impl LogFormat {
    /// Pick the format from a "log as JSON" flag.
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Compact }
    }
}

/// Build the level filter, preferring `RUST_LOG` when set and valid.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global tracing subscriber on stderr.
///
/// Call once at startup. Later calls are no-ops.
///
/// # Arguments
///
/// * `level` - Default filter directive (e.g. `"info"` or `"dg_trigger=debug"`).
/// * `format` - Output format.
pub fn init_subscriber(level: &str, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails only if a global subscriber is already set
    let _ = match format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
