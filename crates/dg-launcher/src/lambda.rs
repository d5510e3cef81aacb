//! Integrator deployed as a Lambda function.

use async_trait::async_trait;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use dg_core::IntegratorPayload;
use tracing::info;

use crate::Launcher;
use crate::errors::{LaunchError, Result};

/// Status Lambda returns once an `Event` invocation is queued.
pub const ACCEPTED_STATUS: i32 = 202;

/// Starts sessions by invoking the integrator function asynchronously.
pub struct LambdaLauncher {
    client: aws_sdk_lambda::Client,
    function_name: String,
}

impl LambdaLauncher {
    /// Create a launcher for `function_name`.
    pub fn new(client: aws_sdk_lambda::Client, function_name: impl Into<String>) -> Self {
        Self {
            client,
            function_name: function_name.into(),
        }
    }
}

#[async_trait]
impl Launcher for LambdaLauncher {
    async fn start_session(&self, payload: &IntegratorPayload) -> Result<()> {
        let body = payload.to_json()?;
        let output = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .invocation_type(InvocationType::Event)
            .payload(Blob::new(body))
            .send()
            .await
            .map_err(|e| LaunchError::Aws(format!("Invoke failed: {}", DisplayErrorContext(&e))))?;

        check_status(output.status_code())?;
        info!(
            contact_id = %payload.contact_id,
            function = %self.function_name,
            "integrator function invoked"
        );
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "lambda"
    }
}

/// Anything but 202 means the event was not queued.
pub fn check_status(status: i32) -> Result<()> {
    if status == ACCEPTED_STATUS {
        Ok(())
    } else {
        Err(LaunchError::Aws(format!(
            "Invoke returned status {status}, expected {ACCEPTED_STATUS}"
        )))
    }
}
