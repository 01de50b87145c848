//! Renders the registry contents for the `inspect` CLI command.

use crate::registry::ComponentRegistry;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectFormat {
    Text,
    Json,
}

/// Which component table to show; `All` shows every table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectKind {
    All,
    Tools,
    Resources,
    Prompts,
}

impl InspectKind {
    fn includes(self, other: InspectKind) -> bool {
        self == InspectKind::All || self == other
    }
}

pub fn render(registry: &ComponentRegistry, format: InspectFormat, kind: InspectKind) -> String {
    match format {
        InspectFormat::Text => render_text(registry, kind),
        InspectFormat::Json => render_json(registry, kind),
    }
}

fn render_text(registry: &ComponentRegistry, kind: InspectKind) -> String {
    let (tools, resources, prompts) = registry.counts();
    let mut out = format!("MCP Server: {}\n", registry.identity().name);

    if kind.includes(InspectKind::Tools) {
        out.push_str(&format!("\nTools ({tools}):\n"));
        for tool in registry.tools() {
            out.push_str(&format!("  - {}: {}\n", tool.name, tool.description));
        }
    }

    if kind.includes(InspectKind::Resources) {
        out.push_str(&format!("\nResources ({resources}):\n"));
        for resource in registry.resources() {
            out.push_str(&format!(
                "  - {}: {}\n",
                resource.uri_template, resource.name
            ));
        }
    }

    if kind.includes(InspectKind::Prompts) {
        out.push_str(&format!("\nPrompts ({prompts}):\n"));
        for prompt in registry.prompts() {
            out.push_str(&format!("  - {}: {}\n", prompt.name, prompt.description));
        }
    }

    out
}

fn render_json(registry: &ComponentRegistry, kind: InspectKind) -> String {
    let mut map = serde_json::Map::new();
    map.insert("server".to_string(), json!(registry.identity().name));

    if kind.includes(InspectKind::Tools) {
        map.insert(
            "tools".to_string(),
            registry
                .tools()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.input_schema,
                    })
                })
                .collect(),
        );
    }

    if kind.includes(InspectKind::Resources) {
        map.insert(
            "resources".to_string(),
            registry
                .resources()
                .map(|r| {
                    json!({
                        "uri": r.uri_template,
                        "name": r.name,
                        "description": r.description,
                    })
                })
                .collect(),
        );
    }

    if kind.includes(InspectKind::Prompts) {
        map.insert(
            "prompts".to_string(),
            registry
                .prompts()
                .map(|p| {
                    json!({
                        "name": p.name,
                        "description": p.description,
                        "arguments": p.arguments.iter().map(|a| json!({
                            "name": a.name,
                            "description": a.description,
                            "required": a.required,
                        })).collect::<Vec<_>>(),
                    })
                })
                .collect(),
        );
    }

    let doc = serde_json::Value::Object(map);
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| doc.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ServerIdentity, ToolRegistration};
    use serde_json::json;

    fn sample_registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new(ServerIdentity::new("test-server"));
        registry
            .register_tool(ToolRegistration::new(
                "ping",
                "Reply with pong",
                json!({"type": "object"}),
                |_| Box::pin(async { Ok(json!("pong")) }),
            ))
            .ok();
        registry
    }

    #[test]
    fn text_output_lists_counts_and_names() {
        let registry = sample_registry();
        let out = render(&registry, InspectFormat::Text, InspectKind::All);
        assert!(out.contains("MCP Server: test-server"));
        assert!(out.contains("Tools (1):"));
        assert!(out.contains("  - ping: Reply with pong"));
        assert!(out.contains("Resources (0):"));
    }

    #[test]
    fn kind_filter_limits_sections() {
        let registry = sample_registry();
        let out = render(&registry, InspectFormat::Text, InspectKind::Tools);
        assert!(out.contains("Tools (1):"));
        assert!(!out.contains("Resources"));
    }

    #[test]
    fn json_output_is_parseable() {
        let registry = sample_registry();
        let out = render(&registry, InspectFormat::Json, InspectKind::All);
        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["server"], "test-server");
        assert_eq!(doc["tools"][0]["name"], "ping");
    }
}
