use appmcp::{apps, db, mcp, McpConfig};

use axum::{response::Html, routing::get, Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appmcp=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = McpConfig::from_env();
    for warning in config.validate() {
        tracing::warn!("{warning}");
    }

    // Database connection
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Walk the app manifest once and freeze the registry
    let manifest = apps::manifest(pool.clone());
    let (registry, report) = appmcp::build_registry(&manifest, &config);
    for (app, error) in &report.failed {
        tracing::warn!(app = %app, error = %error, "app failed to register");
    }
    let registry = Arc::new(registry);

    // Host application routes; everything outside the MCP prefix lands here
    let host_app = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http());

    let (app, _sse_ct) = mcp::mount(host_app, registry, &config);

    // Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()?;

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));

    let prefix = config.url_prefix.trim_matches('/');
    tracing::info!("Server running on http://{}", addr);
    tracing::info!("MCP SSE endpoint at /{}/", prefix);
    tracing::info!("MCP dashboard at /{}/dashboard", prefix);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(
        "<html><body><h1>appmcp</h1>\
         <p>Host application is up. The MCP server is mounted under its \
         configured prefix.</p></body></html>",
    )
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
