//! MCP ServerHandler implementation over the component registry.
//!
//! [`BridgeService`] serves the three registration tables through the rmcp
//! protocol: `tools/list`, `tools/call`, `resources/list`, `resources/read`,
//! `prompts/list`, and `prompts/get`. The registry is a frozen snapshot by
//! the time a service exists, so every method is a lock-free read.
//!
//! Handler failures never tear down a session: tool faults come back as
//! error-flagged tool results, and protocol-level misses map to MCP error
//! codes via [`McpServiceError`].

use crate::error::McpServiceError;
use crate::registry::{ComponentRegistry, JsonObject};
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    AnnotateAble, CallToolRequestParam, CallToolResult, Content, GetPromptRequestParam,
    GetPromptResult, Implementation, ListPromptsResult, ListResourcesResult, ListToolsResult,
    PaginatedRequestParam, Prompt, PromptArgument, PromptMessage, PromptMessageRole,
    ProtocolVersion, RawResource, ReadResourceRequestParam, ReadResourceResult, Resource,
    ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::ErrorData;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct BridgeService {
    registry: Arc<ComponentRegistry>,
}

impl BridgeService {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    fn render_payload(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        }
    }

    /// Tool dispatch shared by the protocol method. An unknown name is a
    /// protocol error; a failing handler is an error-flagged result, not a
    /// session fault.
    async fn dispatch_tool(
        &self,
        name: &str,
        args: JsonObject,
    ) -> Result<CallToolResult, McpServiceError> {
        let tool = self
            .registry
            .tool(name)
            .ok_or_else(|| McpServiceError::ToolNotFound(name.to_string()))?;

        match tool.invoke(args).await {
            Ok(payload) => Ok(CallToolResult::success(vec![Content::text(
                Self::render_payload(&payload),
            )])),
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool handler failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }

    /// Prompt rendering shared by the protocol method. Required arguments
    /// are checked before the handler runs.
    async fn render_prompt(
        &self,
        name: &str,
        args: JsonObject,
    ) -> Result<GetPromptResult, McpServiceError> {
        let prompt = self
            .registry
            .prompt(name)
            .ok_or_else(|| McpServiceError::PromptNotFound(name.to_string()))?;

        for spec in &prompt.arguments {
            if spec.required && !args.contains_key(&spec.name) {
                return Err(McpServiceError::InvalidArguments(format!(
                    "Missing required prompt argument '{}'",
                    spec.name
                )));
            }
        }

        let text = prompt.render(args).await.map_err(McpServiceError::Bridge)?;

        Ok(GetPromptResult {
            description: Some(prompt.description.clone()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

impl ServerHandler for BridgeService {
    fn get_info(&self) -> ServerInfo {
        let identity = self.registry.identity();
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: identity.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                website_url: None,
                icons: None,
            },
            instructions: identity.instructions.clone(),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self
            .registry
            .tools()
            .map(|tool| rmcp::model::Tool {
                name: tool.name.clone().into(),
                description: Some(tool.description.clone().into()),
                input_schema: Arc::new(tool.input_schema.clone()),
                annotations: None,
                title: None,
                icons: None,
                output_schema: None,
            })
            .collect();

        Ok(ListToolsResult {
            tools,
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.dispatch_tool(&request.name, request.arguments.unwrap_or_default())
            .await
            .map_err(ErrorData::from)
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let resources = self
            .registry
            .resources()
            .map(|resource| {
                let mut raw = RawResource::new(resource.uri_template.clone(), resource.name.clone());
                raw.description = Some(resource.description.clone());
                raw.mime_type = Some("text/markdown".to_string());
                let annotated: Resource = raw.no_annotation();
                annotated
            })
            .collect();

        Ok(ListResourcesResult {
            resources,
            ..Default::default()
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let (resource, params) = self
            .registry
            .resolve_resource(&request.uri)
            .ok_or_else(|| McpServiceError::ResourceNotFound(request.uri.clone()))?;

        let text = resource
            .read(params)
            .await
            .map_err(McpServiceError::Bridge)?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        let prompts = self
            .registry
            .prompts()
            .map(|prompt| {
                let arguments: Vec<PromptArgument> = prompt
                    .arguments
                    .iter()
                    .map(|arg| PromptArgument {
                        name: arg.name.clone(),
                        title: None,
                        description: Some(arg.description.clone()),
                        required: Some(arg.required),
                    })
                    .collect();
                Prompt::new(
                    prompt.name.clone(),
                    Some(prompt.description.clone()),
                    Some(arguments),
                )
            })
            .collect();

        Ok(ListPromptsResult {
            prompts,
            ..Default::default()
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        self.render_prompt(&request.name, request.arguments.unwrap_or_default())
            .await
            .map_err(ErrorData::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::registry::{
        PromptArgumentSpec, PromptRegistration, ServerIdentity, ToolRegistration,
    };
    use rmcp::model::ErrorCode;

    fn service_with_fixtures() -> BridgeService {
        let mut registry = ComponentRegistry::new(ServerIdentity::new("test-server"));
        registry
            .register_tool(ToolRegistration::new(
                "explode",
                "Always fails",
                serde_json::json!({"type": "object"}),
                |_args| Box::pin(async { Err(BridgeError::Internal("storage offline".to_string())) }),
            ))
            .unwrap();
        registry
            .register_prompt(PromptRegistration::new(
                "greet",
                "Greets someone by name",
                vec![PromptArgumentSpec {
                    name: "name".to_string(),
                    description: "Who to greet".to_string(),
                    required: true,
                }],
                |args| {
                    Box::pin(async move {
                        let name = args.get("name").and_then(Value::as_str).unwrap_or("?");
                        Ok(format!("Hello, {name}"))
                    })
                },
            ))
            .unwrap();
        BridgeService::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn unknown_tool_maps_to_method_not_found() {
        let service = service_with_fixtures();
        let err = service
            .dispatch_tool("no_such_tool", JsonObject::new())
            .await
            .unwrap_err();
        assert_eq!(ErrorData::from(err).code, ErrorCode::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn failing_tool_handler_becomes_an_error_result() {
        let service = service_with_fixtures();
        let result = service
            .dispatch_tool("explode", JsonObject::new())
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn missing_required_prompt_argument_is_invalid_params() {
        let service = service_with_fixtures();
        let err = service
            .render_prompt("greet", JsonObject::new())
            .await
            .unwrap_err();
        assert_eq!(ErrorData::from(err).code, ErrorCode::INVALID_PARAMS);

        let mut args = JsonObject::new();
        args.insert("name".to_string(), serde_json::json!("Ada"));
        let rendered = service.render_prompt("greet", args).await.unwrap();
        assert_eq!(rendered.messages.len(), 1);
    }

    #[test]
    fn server_info_reflects_the_registry_identity() {
        let mut identity = ServerIdentity::new("test-server");
        identity.instructions = Some("Use the tools".to_string());
        let service = BridgeService::new(Arc::new(ComponentRegistry::new(identity)));

        let info = service.get_info();
        assert_eq!(info.server_info.name, "test-server");
        assert_eq!(info.instructions.as_deref(), Some("Use the tools"));
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.capabilities.prompts.is_some());
    }

    #[test]
    fn string_payloads_render_unquoted() {
        assert_eq!(
            BridgeService::render_payload(&serde_json::json!("plain")),
            "plain"
        );
        assert_eq!(
            BridgeService::render_payload(&serde_json::json!({"a": 1})),
            "{\n  \"a\": 1\n}"
        );
    }
}
