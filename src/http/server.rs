//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all site handler
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Buffer the body and build `RequestParams` for every request
//! - Dispatch to the virtual host table
//! - Serve plaintext or TLS listeners with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::params::{ParamsSummary, RequestParams};
use crate::http::raw::ConnectionInfo;
use crate::http::request_id::MakeRequestUuidV4;
use crate::lifecycle::shutdown;
use crate::net::tls;
use crate::observability::metrics;
use crate::routing::Router as SiteRouter;

/// Errors raised while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS setup failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub sites: Arc<SiteRouter>,
    /// Whether connections reaching this router are TLS-encrypted.
    pub encrypted: bool,
    pub require_host: bool,
    pub max_body_bytes: usize,
}

/// Body of a successful response: the serving site and the parsed request.
#[derive(Debug, Serialize)]
pub struct SiteResponse<'a> {
    pub site: &'a str,
    pub request: ParamsSummary<'a>,
}

/// HTTP server for the daemon.
pub struct HttpServer {
    config: ServerConfig,
    sites: Arc<SiteRouter>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let sites = Arc::new(SiteRouter::from_config(
            &config.sites,
            config.server.default_site.as_deref(),
        ));
        Self { config, sites }
    }

    /// Build the Axum router for a plaintext or an encrypted listener.
    pub fn router(&self, encrypted: bool) -> Router {
        let state = AppState {
            sites: self.sites.clone(),
            encrypted,
            require_host: self.config.server.require_host,
            max_body_bytes: self.config.limits.max_body_bytes,
        };
        Self::build_router(&self.config, state)
    }

    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(site_handler))
            .route("/", any(site_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// Serve plaintext HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            tls = false,
            sites = self.sites.len(),
            "HTTP server starting"
        );

        let app = self.router(false).into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls_config: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        tracing::info!(
            address = %addr,
            tls = true,
            sites = self.sites.len(),
            "HTTP server starting"
        );

        let handle = axum_server::Handle::new();
        let drain = Duration::from_secs(self.config.timeouts.request_secs);
        let signal = handle.clone();
        tokio::spawn(async move {
            shutdown::wait(shutdown).await;
            signal.graceful_shutdown(Some(drain));
        });

        let app = self.router(true).into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Bind the configured listener and serve until `shutdown` fires.
    pub async fn serve(self, shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let bind_address = self.config.listener.bind_address.clone();

        match self.config.listener.tls.clone() {
            Some(tls_settings) => {
                let addr: SocketAddr = bind_address
                    .parse()
                    .map_err(|_| ServerError::InvalidAddress(bind_address.clone()))?;
                let tls_config = tls::from_config(&tls_settings).await.map_err(ServerError::Tls)?;
                self.run_tls(addr, tls_config, shutdown).await
            }
            None => {
                let listener = TcpListener::bind(&bind_address)
                    .await
                    .map_err(|source| ServerError::Bind {
                        addr: bind_address.clone(),
                        source,
                    })?;
                self.run(listener, shutdown).await
            }
        }
    }
}

/// Catch-all handler: build params, then hand them to the site table.
async fn site_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (mut parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, path = %parts.uri.path(), "Failed to read request body");
            metrics::record_request(parts.method.as_str(), 413, state.encrypted, start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    parts.extensions.insert(ConnectionInfo {
        encrypted: state.encrypted,
        remote_addr,
    });
    let raw = Request::from_parts(parts, bytes);
    let params = RequestParams::from_raw(&raw);

    tracing::debug!(
        request_id = ?params.request_id,
        method = %params.method,
        host = %params.host_port(),
        https = params.https,
        path = %params.path,
        "Request params built"
    );

    let response = dispatch(&state, &params);
    let status = response.status().as_u16();
    metrics::record_request(params.method.as_str(), status, params.https, start);
    response
}

fn dispatch(state: &AppState, params: &RequestParams) -> Response {
    if state.require_host && params.hostname.is_empty() {
        tracing::warn!(
            request_id = ?params.request_id,
            path = %params.path,
            "Rejecting request without host"
        );
        return (StatusCode::BAD_REQUEST, "Missing Host header").into_response();
    }

    match state.sites.match_request(params) {
        Some(site) => Json(SiteResponse {
            site: &site.name,
            request: params.summary(),
        })
        .into_response(),
        None => {
            tracing::warn!(
                request_id = ?params.request_id,
                host = %params.host_port(),
                "No site matched"
            );
            metrics::record_unmatched_host();
            (StatusCode::NOT_FOUND, "No site serves this host").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use serde_json::Value;
    use tower::ServiceExt;

    fn config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.sites.push(SiteConfig {
            name: "main".into(),
            hostname: "example.com".into(),
            port: None,
            path_prefix: None,
            priority: 0,
        });
        config.sites.push(SiteConfig {
            name: "admin".into(),
            hostname: "example.com".into(),
            port: Some(9443),
            path_prefix: None,
            priority: 10,
        });
        config
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Option<Value>) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).ok())
    }

    #[tokio::test]
    async fn test_plaintext_default_port() {
        let router = HttpServer::new(config()).router(false);
        let request = Request::builder()
            .uri("/hello?x=1")
            .header("Host", "example.com")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router, request).await;
        let body = body.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["site"], "main");
        assert_eq!(body["request"]["hostname"], "example.com");
        assert_eq!(body["request"]["port"], 80);
        assert_eq!(body["request"]["https"], false);
        assert_eq!(body["request"]["path"], "/hello");
        assert_eq!(body["request"]["query"], "x=1");
    }

    #[tokio::test]
    async fn test_encrypted_explicit_port() {
        let router = HttpServer::new(config()).router(true);
        let request = Request::builder()
            .uri("/")
            .header("Host", "example.com:9443")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router, request).await;
        let body = body.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["site"], "admin");
        assert_eq!(body["request"]["port"], 9443);
        assert_eq!(body["request"]["https"], true);
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let router = HttpServer::new(config()).router(false);
        let request = Request::builder()
            .uri("/")
            .header("Host", "example.com")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let header = response.headers().get("x-request-id").cloned().unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["request"]["request_id"], header.to_str().unwrap());
    }

    #[tokio::test]
    async fn test_authority_used_without_host_header() {
        let router = HttpServer::new(config()).router(false);
        let request = Request::builder()
            .uri("http://example.com:8081/x")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["request"]["port"], 8081);
    }

    #[tokio::test]
    async fn test_missing_host_rejected() {
        let router = HttpServer::new(config()).router(false);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_host_allowed_goes_to_default_site() {
        let mut config = config();
        config.server.require_host = false;
        config.server.default_site = Some("main".into());
        let router = HttpServer::new(config).router(false);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let (status, body) = send(router, request).await;
        let body = body.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["site"], "main");
        assert_eq!(body["request"]["hostname"], "");
    }

    #[tokio::test]
    async fn test_unknown_host() {
        let router = HttpServer::new(config()).router(false);
        let request = Request::builder()
            .uri("/")
            .header("Host", "other.test")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_is_passed_through() {
        let router = HttpServer::new(config()).router(false);
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header("Host", "example.com:abc")
            .body(Body::from("hello"))
            .unwrap();

        let (status, body) = send(router, request).await;
        let body = body.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["request"]["method"], "POST");
        assert_eq!(body["request"]["body_len"], 5);
        assert_eq!(body["request"]["port"], 80);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut config = config();
        config.limits.max_body_bytes = 4;
        let router = HttpServer::new(config).router(false);
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("Host", "example.com")
            .body(Body::from("far too large"))
            .unwrap();

        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
