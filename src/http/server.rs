//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener and shut down gracefully

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api::{self, API_PREFIX};
use crate::api::handlers::get_status;
use crate::config::ServiceConfig;
use crate::http::request::make_request_span;
use crate::lifecycle::signals::shutdown_signal;
use crate::service::ConfigService;

/// HTTP server for the config API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServiceConfig, service: ConfigService) -> Self {
        Self {
            router: Self::build_router(config, service),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, service: ConfigService) -> Router {
        Router::new()
            .route("/status", get(get_status))
            .nest(API_PREFIX, api::setup_api_router(service))
            // Extractors carry their own 2 MiB cap; the configured limit replaces it.
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until Ctrl+C or the shutdown broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::{ReloadCommand, ShellReloadCommand};
    use crate::store::{ConfigRepository, NamePolicy};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn server(max_body_size: usize) -> (TempDir, HttpServer) {
        let dir = TempDir::new().unwrap();
        let mut config = ServiceConfig::default();
        config.store.root = dir.path().to_path_buf();
        config.security.max_body_size = max_body_size;

        let repository = Arc::new(
            ConfigRepository::open(dir.path(), NamePolicy::default())
                .await
                .unwrap(),
        );
        let command: Arc<dyn ReloadCommand> =
            Arc::new(ShellReloadCommand::from_config(&config.apply).unwrap());
        let service = ConfigService::new(repository, command, Duration::from_secs(1));
        (dir, HttpServer::new(&config, service))
    }

    #[tokio::test]
    async fn test_status_route() {
        let (_dir, server) = server(1024).await;
        let response = server
            .router()
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["name"], "gateway-conf");
    }

    #[tokio::test]
    async fn test_body_limit() {
        let (dir, server) = server(64).await;
        let body = serde_json::json!({
            "name": "big.conf",
            "content": "A".repeat(256),
        });
        let response = server
            .router()
            .oneshot(
                Request::post("/api/gateway/conf")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!dir.path().join("big.conf").exists());
    }

    #[tokio::test]
    async fn test_body_limit_above_extractor_default() {
        let (dir, server) = server(8 * 1024 * 1024).await;
        let raw = vec![b'#'; 2 * 1024 * 1024];
        let body = serde_json::json!({
            "name": "big.conf",
            "content": crate::store::codec::encode(&raw),
        });
        let response = server
            .router()
            .oneshot(
                Request::post("/api/gateway/conf")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(std::fs::read(dir.path().join("big.conf")).unwrap(), raw);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (_dir, server) = server(1024).await;
        let response = server
            .router()
            .oneshot(Request::get("/api/gateway/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
