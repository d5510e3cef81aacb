//! # dg-launcher
//!
//! Starts one Deepgram integrator session per contact.
//!
//! The [`Launcher`] trait has one implementation per transport:
//!
//! - [`HttpLauncher`]: `POST {url}/start-session`, optionally repeated for load tests
//! - [`LambdaLauncher`]: asynchronous function invocation
//! - [`FargateLauncher`]: one ECS `RunTask` per session
//!
//! [`build_launcher`] picks the implementation for a resolved
//! [`LauncherTarget`].

#![deny(unsafe_code)]

pub mod errors;
pub mod fargate;
pub mod http;
pub mod lambda;

pub use errors::{LaunchError, Result};
pub use fargate::FargateLauncher;
pub use http::HttpLauncher;
pub use lambda::LambdaLauncher;

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use dg_core::IntegratorPayload;
use dg_settings::LauncherTarget;

/// Starts integrator sessions.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Start a session for `payload`; `Ok` only once the platform accepted it.
    async fn start_session(&self, payload: &IntegratorPayload) -> Result<()>;

    /// Short name for logs and health output.
    fn kind(&self) -> &'static str;
}

/// Build the launcher for `target`.
///
/// AWS launchers load credentials and region from the ambient environment.
pub async fn build_launcher(target: &LauncherTarget) -> Arc<dyn Launcher> {
    match target {
        LauncherTarget::Http {
            base_url,
            load_test,
        } => Arc::new(HttpLauncher::new(base_url, *load_test)),
        LauncherTarget::Lambda { function_name } => {
            let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
            Arc::new(LambdaLauncher::new(
                aws_sdk_lambda::Client::new(&config),
                function_name.clone(),
            ))
        }
        LauncherTarget::Fargate(fargate) => {
            let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
            Arc::new(FargateLauncher::new(
                aws_sdk_ecs::Client::new(&config),
                fargate.clone(),
            ))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
