//! # dg-settings
//!
//! Layered configuration for the DG trigger.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`TriggerSettings::default()`]
//! 2. **Settings file** — `DG_TRIGGER_SETTINGS` or `./dg-trigger.json` (deep-merged)
//! 3. **Environment variables** — `KVS_DG_*`, `LOAD_TEST_*`, `DG_TRIGGER_*` and friends
//!
//! [`LauncherTarget::resolve`] turns the integrator section into the one
//! launcher the trigger will use.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod target;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use target::{FargateTarget, LauncherTarget};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
