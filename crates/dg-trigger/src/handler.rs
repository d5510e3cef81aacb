//! One contact-flow invocation, end to end.

use std::sync::Arc;

use dg_core::constants::CONTACT_FLOW_EVENT_NAME;
use dg_core::event::event_name;
use dg_core::{ContactFlowEvent, IntegratorPayload, LambdaResult, build_dg_params};
use dg_launcher::{Launcher, build_launcher};
use dg_settings::{SettingsError, TriggerSettings};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::errors::TriggerError;

/// Turns contact-flow events into integrator sessions.
///
/// A handler built from incomplete settings still answers every event, and
/// each invocation fails with the settings error.
pub struct TriggerHandler {
    launcher: Result<Arc<dyn Launcher>, Arc<SettingsError>>,
    enforce_realtime: bool,
}

impl TriggerHandler {
    /// Create a handler starting sessions through `launcher`.
    pub fn new(launcher: Arc<dyn Launcher>, enforce_realtime: bool) -> Self {
        Self {
            launcher: Ok(launcher),
            enforce_realtime,
        }
    }

    /// Create a handler that fails every invocation with `error`.
    pub fn unavailable(error: SettingsError, enforce_realtime: bool) -> Self {
        Self {
            launcher: Err(Arc::new(error)),
            enforce_realtime,
        }
    }

    /// Pick and build the launcher the settings select.
    pub async fn from_settings(settings: &TriggerSettings) -> Self {
        let enforce_realtime = settings.integrator.enforce_realtime;
        match settings.launcher_target() {
            Ok(target) => {
                info!(launcher = target.kind(), "launcher selected");
                Self::new(build_launcher(&target).await, enforce_realtime)
            }
            Err(error) => {
                error!(%error, "no usable integrator launcher configured");
                Self::unavailable(error, enforce_realtime)
            }
        }
    }

    /// Which launcher sessions go through.
    pub fn launcher_kind(&self) -> &'static str {
        match &self.launcher {
            Ok(launcher) => launcher.kind(),
            Err(_) => "unavailable",
        }
    }

    /// Handle one event. Never panics; every failure becomes `fail`.
    pub async fn handle(&self, event: &Value) -> LambdaResult {
        match self.try_handle(event).await {
            Ok(contact_id) => {
                info!(contact_id = %contact_id, "integrator session started");
                LambdaResult::from_success(true)
            }
            Err(error) => {
                let internal = matches!(&error, TriggerError::Params(e) if e.is_internal());
                error!(%error, kind = error.kind(), internal, "trigger failed");
                LambdaResult::fail()
            }
        }
    }

    /// Handle one event, returning the contact ID on success.
    pub async fn try_handle(&self, event: &Value) -> Result<String, TriggerError> {
        info!(%event, "received event");

        match event_name(event) {
            Some(CONTACT_FLOW_EVENT_NAME) => {}
            other => {
                return Err(TriggerError::UnexpectedEvent {
                    name: other.map(str::to_string),
                });
            }
        }

        let event = ContactFlowEvent::deserialize(event).map_err(TriggerError::InvalidEvent)?;
        let contact_id = event.contact_id().to_string();

        let dg_params = build_dg_params(event.attributes(), &contact_id)?;
        info!(contact_id = %contact_id, params = dg_params.len(), "derived DG params");

        let payload = IntegratorPayload::for_event(&event, dg_params, self.enforce_realtime);
        let launcher = self.launcher.as_ref().map_err(|e| TriggerError::Settings(e.clone()))?;
        info!(contact_id = %contact_id, ?payload, "starting integrator session");
        launcher.start_session(&payload).await?;
        Ok(contact_id)
    }
}
