//! HTML dashboard listing everything the registry serves.

use crate::config::McpConfig;
use crate::registry::ComponentRegistry;
use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::IntoResponse;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardState {
    pub registry: Arc<ComponentRegistry>,
    pub config: McpConfig,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    server_name: String,
    url_prefix: String,
    auto_discover: bool,
    expose_models: bool,
    expose_admin: bool,
    expose_api: bool,
    keepalive_secs: u64,
    tools: Vec<ToolRow>,
    resources: Vec<ResourceRow>,
    prompts: Vec<PromptRow>,
}

struct ToolRow {
    name: String,
    description: String,
}

struct ResourceRow {
    uri_template: String,
    name: String,
    description: String,
}

struct PromptRow {
    name: String,
    description: String,
    arguments: String,
}

/// GET /<prefix>/dashboard - Read-only overview of registered components
pub async fn render(State(state): State<DashboardState>) -> impl IntoResponse {
    let registry = &state.registry;

    let tools = registry
        .tools()
        .map(|t| ToolRow {
            name: t.name.clone(),
            description: t.description.clone(),
        })
        .collect();

    let resources = registry
        .resources()
        .map(|r| ResourceRow {
            uri_template: r.uri_template.clone(),
            name: r.name.clone(),
            description: r.description.clone(),
        })
        .collect();

    let prompts = registry
        .prompts()
        .map(|p| PromptRow {
            name: p.name.clone(),
            description: p.description.clone(),
            arguments: p
                .arguments
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    DashboardTemplate {
        server_name: registry.identity().name.clone(),
        url_prefix: state.config.url_prefix.clone(),
        auto_discover: state.config.auto_discover,
        expose_models: state.config.expose_models,
        expose_admin: state.config.expose_admin,
        expose_api: state.config.expose_api,
        keepalive_secs: state.config.sse_keepalive.as_secs(),
        tools,
        resources,
        prompts,
    }
}
