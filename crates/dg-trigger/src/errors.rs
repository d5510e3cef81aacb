//! Trigger error types.

use std::sync::Arc;

use dg_core::ParamsError;
use dg_launcher::LaunchError;
use dg_settings::SettingsError;
use thiserror::Error;

/// Everything that can turn an invocation into a `fail` result.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The event's `Name` was missing or not `ContactFlowEvent`.
    #[error("unexpected event name {name:?}, expected ContactFlowEvent")]
    UnexpectedEvent {
        /// The name that was sent, if any.
        name: Option<String>,
    },
    /// The event did not have the contact-flow shape.
    #[error("malformed contact flow event: {0}")]
    InvalidEvent(#[source] serde_json::Error),
    /// The contact attributes could not be turned into DG params.
    #[error(transparent)]
    Params(#[from] ParamsError),
    /// The integrator session could not be started.
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// Settings were missing or invalid, so no launcher is available.
    #[error(transparent)]
    Settings(Arc<SettingsError>),
}

impl From<SettingsError> for TriggerError {
    fn from(error: SettingsError) -> Self {
        Self::Settings(Arc::new(error))
    }
}

impl TriggerError {
    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnexpectedEvent { .. } => "unexpected_event",
            Self::InvalidEvent(_) => "invalid_event",
            Self::Params(e) => e.kind(),
            Self::Launch(_) => "launch",
            Self::Settings(_) => "settings",
        }
    }
}
