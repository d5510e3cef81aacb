//! Settings types.
//!
//! Every struct deserializes with `#[serde(default)]`, so a settings file only
//! needs the keys it overrides.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings for the trigger.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerSettings {
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// Where and how integrator sessions are started.
    pub integrator: IntegratorSettings,
    /// Repeated session starts for load testing.
    pub load_test: LoadTestSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
}

impl TriggerSettings {
    /// Check cross-field and range constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(SettingsError::InvalidValue(
                "server.port must be between 1 and 65535".into(),
            ));
        }
        if self.load_test.session_count == 0 {
            return Err(SettingsError::InvalidValue(
                "loadTest.sessionCount must be at least 1".into(),
            ));
        }
        if self.load_test.interval_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "loadTest.intervalMs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
        }
    }
}

/// Integrator launch settings.
///
/// Which fields matter depends on the launcher picked by
/// [`LauncherTarget::resolve`](crate::LauncherTarget::resolve).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegratorSettings {
    /// Base URL of an integrator service accepting `POST /start-session`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Name of an integrator function to invoke asynchronously.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda: Option<String>,
    /// ECS cluster for Fargate tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    /// ECS task definition for Fargate tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_definition: Option<String>,
    /// Security group attached to Fargate tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group: Option<String>,
    /// Subnets Fargate tasks run in.
    pub subnets: Vec<String>,
    /// Deepgram API key handed to Fargate tasks.
    #[serde(skip_serializing)]
    pub deepgram_api_key: Option<ApiKey>,
    /// Region handed to Fargate tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    /// Name of the container to override in the task definition.
    pub container_name: String,
    /// Whether the integrator should pace audio at real time.
    pub enforce_realtime: bool,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            url: None,
            lambda: None,
            cluster: None,
            task_definition: None,
            security_group: None,
            subnets: Vec::new(),
            deepgram_api_key: None,
            aws_region: None,
            container_name: "kvs-dg-integrator-container".to_string(),
            enforce_realtime: true,
        }
    }
}

/// Load-test repetition of session starts.
///
/// The default of one session with no repetition is normal operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadTestSettings {
    /// How many sessions to start per event.
    pub session_count: u32,
    /// Pause between consecutive session starts.
    pub interval_ms: u64,
}

impl Default for LoadTestSettings {
    fn default() -> Self {
        Self {
            session_count: 1,
            interval_ms: 1_000,
        }
    }
}

impl LoadTestSettings {
    /// Whether more than one session is started per event.
    pub fn is_enabled(&self) -> bool {
        self.session_count > 1
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

/// An API key that never shows up in `Debug` output.
///
/// Read-only from settings: it deserializes from a plain string and is never
/// serialized back.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Wrap a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }
}

impl ExposeSecret<str> for ApiKey {
    fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl PartialEq for ApiKey {
    fn eq(&self, other: &Self) -> bool {
        self.expose_secret() == other.expose_secret()
    }
}

impl Eq for ApiKey {}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
