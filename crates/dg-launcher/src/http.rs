//! Integrator reachable over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use dg_core::IntegratorPayload;
use dg_settings::LoadTestSettings;
use tracing::{debug, info};

use crate::Launcher;
use crate::errors::{LaunchError, Result};

const START_SESSION_PATH: &str = "/start-session";

/// Starts sessions with `POST {base_url}/start-session`.
///
/// With load testing enabled the same payload is posted
/// `session_count` times, `interval_ms` apart. The first failure stops the
/// run.
pub struct HttpLauncher {
    client: reqwest::Client,
    endpoint: String,
    load_test: LoadTestSettings,
}

impl HttpLauncher {
    /// Create a launcher for the integrator at `base_url`.
    pub fn new(base_url: &str, load_test: LoadTestSettings) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(concat!("dg-trigger/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            endpoint: format!("{}{START_SESSION_PATH}", base_url.trim_end_matches('/')),
            load_test,
        }
    }

    /// Full URL sessions are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_once(&self, body: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(LaunchError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Launcher for HttpLauncher {
    async fn start_session(&self, payload: &IntegratorPayload) -> Result<()> {
        let body = payload.to_json()?;
        let sessions = self.load_test.session_count.max(1);
        let interval = Duration::from_millis(self.load_test.interval_ms);

        if self.load_test.is_enabled() {
            info!(
                sessions,
                interval_ms = self.load_test.interval_ms,
                "load test enabled"
            );
        }

        for attempt in 1..=sessions {
            if attempt > 1 {
                tokio::time::sleep(interval).await;
            }
            debug!(attempt, endpoint = %self.endpoint, "starting integrator session");
            self.post_once(&body).await?;
        }

        info!(contact_id = %payload.contact_id, sessions, "integrator accepted session");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "http"
    }
}
