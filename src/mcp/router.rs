//! Mounts the MCP transport inside a host axum application.
//!
//! Requests whose path falls under the configured URL prefix are steered to
//! the MCP router (SSE stream, message endpoint, dashboard); everything else
//! flows to the host application untouched. Steering is a pure path check,
//! so the host keeps full ownership of its own routing table.

use crate::config::McpConfig;
use crate::mcp::dashboard;
use crate::mcp::service::BridgeService;
use crate::registry::ComponentRegistry;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

/// Returns true when `path` belongs to the MCP mount at `prefix`.
///
/// Matches the prefix segment exactly: `/mcp` and `/mcp/anything` are MCP
/// paths for prefix `mcp`, while `/mcpx` is not.
pub fn is_mcp_path(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix('/').and_then(|p| p.strip_prefix(prefix)) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Tower service that dispatches each request to one of two routers based
/// on [`is_mcp_path`].
#[derive(Clone)]
pub struct PrefixRouter {
    prefix: String,
    mcp: Router,
    host: Router,
}

impl PrefixRouter {
    pub fn new(prefix: impl Into<String>, mcp: Router, host: Router) -> Self {
        Self {
            prefix: prefix.into(),
            mcp,
            host,
        }
    }
}

impl tower::Service<Request<Body>> for PrefixRouter {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let target = if is_mcp_path(&self.prefix, req.uri().path()) {
            self.mcp.clone()
        } else {
            self.host.clone()
        };
        Box::pin(async move { target.oneshot(req).await })
    }
}

/// Builds the MCP-side router: SSE stream at `GET /<prefix>/`, client
/// messages at `POST /<prefix>/message`, and the HTML dashboard at
/// `GET /<prefix>/dashboard`.
///
/// The returned [`CancellationToken`] tears down live SSE sessions.
pub fn mcp_router(
    registry: Arc<ComponentRegistry>,
    config: &McpConfig,
) -> (Router, CancellationToken) {
    let ct = CancellationToken::new();
    let prefix = config.url_prefix.trim_matches('/');

    let sse_config = SseServerConfig {
        // The bind address is unused here: we serve the router ourselves
        // instead of letting the SSE server listen on its own socket.
        bind: SocketAddr::from(([127, 0, 0, 1], 0)),
        sse_path: format!("/{prefix}/"),
        post_path: format!("/{prefix}/message"),
        ct: ct.clone(),
        sse_keep_alive: Some(config.sse_keepalive),
    };

    let (sse_server, sse_router) = SseServer::new(sse_config);
    let service = BridgeService::new(registry.clone());
    sse_server.with_service(move || service.clone());

    let dashboard = Router::new()
        .route(&format!("/{prefix}/dashboard"), get(dashboard::render))
        .with_state(dashboard::DashboardState {
            registry,
            config: config.clone(),
        });

    let router = sse_router.merge(dashboard).layer(CorsLayer::permissive());
    (router, ct)
}

/// Mounts the MCP router in front of `host`, returning a servable router
/// plus the SSE teardown token.
pub fn mount(
    host: Router,
    registry: Arc<ComponentRegistry>,
    config: &McpConfig,
) -> (Router, CancellationToken) {
    let (mcp, ct) = mcp_router(registry, config);
    let steered = PrefixRouter::new(config.url_prefix.clone(), mcp, host);
    (Router::new().fallback_service(steered), ct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_segment_must_match_exactly() {
        assert!(is_mcp_path("mcp", "/mcp"));
        assert!(is_mcp_path("mcp", "/mcp/"));
        assert!(is_mcp_path("mcp", "/mcp/message"));
        assert!(!is_mcp_path("mcp", "/mcpx"));
        assert!(!is_mcp_path("mcp", "/api/mcp"));
        assert!(!is_mcp_path("mcp", "/"));
    }

    #[test]
    fn surrounding_slashes_in_prefix_are_ignored() {
        assert!(is_mcp_path("/mcp/", "/mcp/dashboard"));
        assert!(!is_mcp_path("", "/anything"));
    }
}
