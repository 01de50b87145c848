//! Component registry for MCP tools, resources, and prompts.
//!
//! The registry is an explicit object rather than a process-wide global: the
//! binaries construct one, discovery populates it on the single startup
//! thread, and it is then frozen behind an `Arc` for lock-free concurrent
//! reads from the request path. Registrations are append-only for the life
//! of the process; duplicate names/URIs are rejected.

use crate::error::{BridgeError, RegistryError};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// JSON object shorthand used for tool arguments and schemas.
pub type JsonObject = Map<String, Value>;

/// Boxed future returned by registered handlers.
pub type HandlerFuture<T> = Pin<Box<dyn Future<Output = Result<T, BridgeError>> + Send>>;

type ToolHandler = Arc<dyn Fn(JsonObject) -> HandlerFuture<Value> + Send + Sync>;
type ResourceHandler = Arc<dyn Fn(BTreeMap<String, String>) -> HandlerFuture<String> + Send + Sync>;
type PromptHandler = Arc<dyn Fn(JsonObject) -> HandlerFuture<String> + Send + Sync>;

/// Server identity advertised to MCP clients.
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    pub name: String,
    pub instructions: Option<String>,
    pub dependencies: Vec<String>,
}

impl ServerIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: None,
            dependencies: Vec::new(),
        }
    }
}

impl From<&crate::config::McpConfig> for ServerIdentity {
    fn from(config: &crate::config::McpConfig) -> Self {
        Self {
            name: config.server_name.clone(),
            instructions: config.instructions.clone(),
            dependencies: config.dependencies.clone(),
        }
    }
}

/// A named, invocable operation with a JSON Schema for its parameters.
#[derive(Clone)]
pub struct ToolRegistration {
    pub name: String,
    pub description: String,
    pub input_schema: JsonObject,
    handler: ToolHandler,
}

impl ToolRegistration {
    /// Register an async handler. `input_schema` must be a JSON object; any
    /// other value is replaced with an empty object schema.
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(JsonObject) -> HandlerFuture<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: schema_object(input_schema),
            handler: Arc::new(handler),
        }
    }

    /// Register a synchronous handler that may block. The call is dispatched
    /// through `spawn_blocking` so a slow handler never stalls concurrent
    /// MCP sessions on the event loop.
    pub fn new_blocking<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(JsonObject) -> Result<Value, BridgeError> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        Self::new(name, description, input_schema, move |args| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                tokio::task::spawn_blocking(move || handler(args))
                    .await
                    .map_err(|e| BridgeError::Internal(format!("blocking handler failed: {e}")))?
            })
        })
    }

    pub async fn invoke(&self, args: JsonObject) -> Result<Value, BridgeError> {
        (self.handler)(args).await
    }
}

/// A URI-addressable read-only document. The URI may contain `{placeholder}`
/// segments which are matched against concrete request URIs.
#[derive(Clone)]
pub struct ResourceRegistration {
    pub uri_template: String,
    pub name: String,
    pub description: String,
    handler: ResourceHandler,
}

impl ResourceRegistration {
    pub fn new<F>(
        uri_template: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(BTreeMap<String, String>) -> HandlerFuture<String> + Send + Sync + 'static,
    {
        Self {
            uri_template: uri_template.into(),
            name: name.into(),
            description: description.into(),
            handler: Arc::new(handler),
        }
    }

    pub async fn read(&self, params: BTreeMap<String, String>) -> Result<String, BridgeError> {
        (self.handler)(params).await
    }
}

/// Argument descriptor for a prompt.
#[derive(Debug, Clone)]
pub struct PromptArgumentSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// A named, parameterized text template.
#[derive(Clone)]
pub struct PromptRegistration {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgumentSpec>,
    handler: PromptHandler,
}

impl PromptRegistration {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        arguments: Vec<PromptArgumentSpec>,
        handler: F,
    ) -> Self
    where
        F: Fn(JsonObject) -> HandlerFuture<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            arguments,
            handler: Arc::new(handler),
        }
    }

    pub async fn render(&self, args: JsonObject) -> Result<String, BridgeError> {
        (self.handler)(args).await
    }
}

/// The registry itself. `BTreeMap` keeps iteration order deterministic,
/// which the dashboard and `inspect` output rely on.
pub struct ComponentRegistry {
    identity: ServerIdentity,
    tools: BTreeMap<String, ToolRegistration>,
    resources: BTreeMap<String, ResourceRegistration>,
    prompts: BTreeMap<String, PromptRegistration>,
    discovered: BTreeSet<String>,
}

impl ComponentRegistry {
    pub fn new(identity: ServerIdentity) -> Self {
        Self {
            identity,
            tools: BTreeMap::new(),
            resources: BTreeMap::new(),
            prompts: BTreeMap::new(),
            discovered: BTreeSet::new(),
        }
    }

    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    pub fn register_tool(&mut self, tool: ToolRegistration) -> Result<(), RegistryError> {
        if self.tools.contains_key(&tool.name) {
            return Err(RegistryError::DuplicateTool(tool.name));
        }
        self.tools.insert(tool.name.clone(), tool);
        Ok(())
    }

    pub fn register_resource(&mut self, resource: ResourceRegistration) -> Result<(), RegistryError> {
        if self.resources.contains_key(&resource.uri_template) {
            return Err(RegistryError::DuplicateResource(resource.uri_template));
        }
        self.resources.insert(resource.uri_template.clone(), resource);
        Ok(())
    }

    pub fn register_prompt(&mut self, prompt: PromptRegistration) -> Result<(), RegistryError> {
        if self.prompts.contains_key(&prompt.name) {
            return Err(RegistryError::DuplicatePrompt(prompt.name));
        }
        self.prompts.insert(prompt.name.clone(), prompt);
        Ok(())
    }

    pub fn tool(&self, name: &str) -> Option<&ToolRegistration> {
        self.tools.get(name)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn prompt(&self, name: &str) -> Option<&PromptRegistration> {
        self.prompts.get(name)
    }

    pub fn has_prompt(&self, name: &str) -> bool {
        self.prompts.contains_key(name)
    }

    /// Find the resource whose template matches `uri`, returning the
    /// captured placeholder values alongside it.
    pub fn resolve_resource(
        &self,
        uri: &str,
    ) -> Option<(&ResourceRegistration, BTreeMap<String, String>)> {
        self.resources
            .values()
            .find_map(|resource| match_uri(&resource.uri_template, uri).map(|params| (resource, params)))
    }

    pub fn tools(&self) -> impl Iterator<Item = &ToolRegistration> {
        self.tools.values()
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceRegistration> {
        self.resources.values()
    }

    pub fn prompts(&self) -> impl Iterator<Item = &PromptRegistration> {
        self.prompts.values()
    }

    /// (tools, resources, prompts) table sizes.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.tools.len(), self.resources.len(), self.prompts.len())
    }

    /// Record that an app's registrations have run. Returns `false` when the
    /// app was already on the ledger, which makes a second discovery pass a
    /// no-op for it.
    pub fn mark_discovered(&mut self, app_name: &str) -> bool {
        self.discovered.insert(app_name.to_string())
    }

    pub fn is_discovered(&self, app_name: &str) -> bool {
        self.discovered.contains(app_name)
    }
}

/// Segment-wise URI template matching. `{name}` segments capture the
/// corresponding request segment; everything else must match exactly.
/// Template and URI must have the same number of `/`-separated segments.
pub fn match_uri(template: &str, uri: &str) -> Option<BTreeMap<String, String>> {
    let template_parts: Vec<&str> = template.split('/').collect();
    let uri_parts: Vec<&str> = uri.split('/').collect();

    if template_parts.len() != uri_parts.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (t_part, u_part) in template_parts.iter().zip(uri_parts.iter()) {
        if let Some(name) = t_part.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            if u_part.is_empty() {
                return None;
            }
            params.insert(name.to_string(), (*u_part).to_string());
        } else if t_part != u_part {
            return None;
        }
    }

    Some(params)
}

fn schema_object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        _ => {
            let mut map = Map::new();
            map.insert("type".to_string(), Value::String("object".to_string()));
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop_tool(name: &str) -> ToolRegistration {
        ToolRegistration::new(name, "test tool", json!({"type": "object"}), |_args| {
            Box::pin(async { Ok(json!({"ok": true})) })
        })
    }

    #[test]
    fn duplicate_tool_is_rejected() {
        let mut registry = ComponentRegistry::new(ServerIdentity::new("test"));
        registry.register_tool(noop_tool("ping")).unwrap();

        let err = registry.register_tool(noop_tool("ping")).unwrap_err();
        match err {
            RegistryError::DuplicateTool(name) => assert_eq!(name, "ping"),
            other => panic!("expected DuplicateTool, got {other:?}"),
        }
        assert_eq!(registry.counts().0, 1);
    }

    #[test]
    fn match_uri_captures_placeholders() {
        let params = match_uri("notes://{id}", "notes://42").expect("should match");
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        assert!(match_uri("notes://{id}", "tags://42").is_none());
        assert!(match_uri("notes://{id}", "notes://42/extra").is_none());
        assert!(match_uri("notes://{id}", "notes://").is_none());
    }

    #[tokio::test]
    async fn blocking_tool_runs_off_the_event_loop() {
        let tool = ToolRegistration::new_blocking(
            "sum",
            "sum of a and b",
            json!({"type": "object"}),
            |args| {
                let a = args.get("a").and_then(Value::as_i64).unwrap_or(0);
                let b = args.get("b").and_then(Value::as_i64).unwrap_or(0);
                Ok(json!(a + b))
            },
        );

        let mut args = JsonObject::new();
        args.insert("a".to_string(), json!(2));
        args.insert("b".to_string(), json!(3));
        let result = tool.invoke(args).await.unwrap();
        assert_eq!(result, json!(5));
    }
}
