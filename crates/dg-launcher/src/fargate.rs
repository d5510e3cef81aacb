//! Integrator run as an ECS Fargate task per session.

use async_trait::async_trait;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, Failure, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use dg_core::IntegratorPayload;
use dg_settings::FargateTarget;
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::Launcher;
use crate::errors::{LaunchError, Result};

/// Container env var carrying the payload JSON.
pub const ARGUMENTS_ENV: &str = "INTEGRATOR_ARGUMENTS";
/// Container env var carrying the Deepgram API key.
pub const API_KEY_ENV: &str = "DEEPGRAM_API_KEY";
/// Container env var carrying the region.
pub const REGION_ENV: &str = "APP_REGION";

/// Starts each session as a new Fargate task.
pub struct FargateLauncher {
    client: aws_sdk_ecs::Client,
    target: FargateTarget,
}

impl FargateLauncher {
    /// Create a launcher running tasks described by `target`.
    pub fn new(client: aws_sdk_ecs::Client, target: FargateTarget) -> Self {
        Self { client, target }
    }
}

#[async_trait]
impl Launcher for FargateLauncher {
    async fn start_session(&self, payload: &IntegratorPayload) -> Result<()> {
        let arguments = payload.to_json()?;
        let output = self
            .client
            .run_task()
            .cluster(&self.target.cluster)
            .task_definition(&self.target.task_definition)
            .launch_type(LaunchType::Fargate)
            .network_configuration(network_configuration(&self.target)?)
            .overrides(task_override(&self.target, arguments))
            .send()
            .await
            .map_err(|e| LaunchError::Aws(format!("RunTask failed: {}", DisplayErrorContext(&e))))?;

        check_failures(output.failures())?;
        let task_arns: Vec<&str> = output.tasks().iter().filter_map(|t| t.task_arn()).collect();
        info!(
            contact_id = %payload.contact_id,
            cluster = %self.target.cluster,
            tasks = ?task_arns,
            "integrator task started"
        );
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "fargate"
    }
}

/// awsvpc networking with a public IP so the task can reach Deepgram.
pub fn network_configuration(target: &FargateTarget) -> Result<NetworkConfiguration> {
    let awsvpc = AwsVpcConfiguration::builder()
        .set_subnets(Some(target.subnets.clone()))
        .security_groups(&target.security_group)
        .assign_public_ip(AssignPublicIp::Enabled)
        .build()
        .map_err(|e| LaunchError::Aws(format!("invalid network configuration: {e}")))?;
    Ok(NetworkConfiguration::builder()
        .awsvpc_configuration(awsvpc)
        .build())
}

/// Environment overrides for the integrator container.
pub fn task_override(target: &FargateTarget, arguments: String) -> TaskOverride {
    let container = ContainerOverride::builder()
        .name(&target.container_name)
        .environment(env_var(ARGUMENTS_ENV, arguments))
        .environment(env_var(API_KEY_ENV, target.deepgram_api_key.expose_secret()))
        .environment(env_var(REGION_ENV, &target.aws_region))
        .build();
    TaskOverride::builder().container_overrides(container).build()
}

fn env_var(name: &str, value: impl Into<String>) -> KeyValuePair {
    KeyValuePair::builder().name(name).value(value).build()
}

/// A `RunTask` that lists failures did not start the session.
pub fn check_failures(failures: &[Failure]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    let reasons: Vec<String> = failures
        .iter()
        .map(|f| {
            let reason = f.reason().unwrap_or("unknown");
            match f.detail() {
                Some(detail) => format!("{reason} ({detail})"),
                None => reason.to_string(),
            }
        })
        .collect();
    warn!(failures = ?reasons, "RunTask reported failures");
    Err(LaunchError::Aws(format!(
        "RunTask reported {} failure(s): {}",
        failures.len(),
        reasons.join("; ")
    )))
}
