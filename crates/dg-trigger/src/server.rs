//! `TriggerServer` — axum HTTP front for the handler.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use dg_core::LambdaResult;
use dg_settings::ServerSettings;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handler::TriggerHandler;
use crate::health::{self, HealthResponse};

/// Shared state accessible from axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The event handler.
    pub handler: Arc<TriggerHandler>,
    /// When the server started.
    pub start_time: Instant,
}

/// The trigger server.
pub struct TriggerServer {
    config: ServerSettings,
    handler: Arc<TriggerHandler>,
    shutdown: CancellationToken,
    start_time: Instant,
}

impl TriggerServer {
    /// Create a new server.
    pub fn new(config: ServerSettings, handler: TriggerHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
            shutdown: CancellationToken::new(),
            start_time: Instant::now(),
        }
    }

    /// Build the axum router.
    pub fn router(&self) -> Router {
        let state = AppState {
            handler: self.handler.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route("/invoke", post(invoke_handler))
            .route("/health", get(health_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Token that stops the server when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerSettings {
        &self.config
    }

    /// Bind and serve in the background until the shutdown token fires.
    ///
    /// Returns the bound address (useful with port 0) and the server task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.clone();

        info!(%addr, launcher = self.handler.launcher_kind(), "trigger server listening");

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(error) = result {
                warn!(%error, "server stopped with error");
            }
        });
        Ok((addr, handle))
    }
}

/// POST /invoke
///
/// Always answers 200 with a result object; the caller branches on
/// `lambdaResult`, not on HTTP status.
async fn invoke_handler(State(state): State<AppState>, body: Bytes) -> Json<LambdaResult> {
    let event: Value = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(error) => {
            warn!(%error, "invoke body is not JSON");
            return Json(LambdaResult::fail());
        }
    };
    Json(state.handler.handle(&event).await)
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.handler.launcher_kind(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::tests::{RecordingLauncher, contact_event};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn make_server(launcher: &Arc<RecordingLauncher>) -> TriggerServer {
        let config = ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        };
        TriggerServer::new(config, TriggerHandler::new(launcher.clone(), true))
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn invoke(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/invoke")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    // ── /invoke ──

    #[tokio::test]
    async fn invoke_success() {
        let launcher = Arc::new(RecordingLauncher::default());
        let app = make_server(&launcher).router();

        let event = contact_event(json!({"dg_model": "nova"}));
        let resp = app.oneshot(invoke(event.to_string())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"lambdaResult": "success"}));
        assert_eq!(launcher.recorded().len(), 1);
    }

    #[tokio::test]
    async fn invoke_failure_is_still_200() {
        let launcher = Arc::new(RecordingLauncher::rejecting());
        let app = make_server(&launcher).router();

        let resp = app
            .oneshot(invoke(contact_event(json!({})).to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"lambdaResult": "fail"}));
    }

    #[tokio::test]
    async fn invoke_non_json_fails() {
        let launcher = Arc::new(RecordingLauncher::default());
        let app = make_server(&launcher).router();

        let resp = app.oneshot(invoke("not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"lambdaResult": "fail"}));
        assert!(launcher.recorded().is_empty());
    }

    #[tokio::test]
    async fn invoke_requires_post() {
        let launcher = Arc::new(RecordingLauncher::default());
        let app = make_server(&launcher).router();

        let req = Request::builder().uri("/invoke").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    // ── /health ──

    #[tokio::test]
    async fn health_reports_launcher() {
        let launcher = Arc::new(RecordingLauncher::default());
        let app = make_server(&launcher).router();

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let parsed = body_json(resp).await;
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["launcher"], "recording");
        assert!(parsed["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let launcher = Arc::new(RecordingLauncher::default());
        let app = make_server(&launcher).router();

        let req = Request::builder().uri("/nonexistent").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    // ── listen ──

    #[tokio::test]
    async fn listen_serves_until_shutdown() {
        let launcher = Arc::new(RecordingLauncher::default());
        let server = make_server(&launcher);
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);

        let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert!(resp.status().is_success());

        server.shutdown_token().cancel();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
