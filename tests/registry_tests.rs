//! Registry behavior: uniqueness, lookup, and URI template resolution.

use appmcp::error::RegistryError;
use appmcp::registry::{
    ComponentRegistry, PromptArgumentSpec, PromptRegistration, ResourceRegistration,
    ServerIdentity, ToolRegistration,
};
use serde_json::json;

fn ping_tool(name: &str) -> ToolRegistration {
    ToolRegistration::new(name, "Reply with pong", json!({"type": "object"}), |_| {
        Box::pin(async { Ok(json!("pong")) })
    })
}

fn static_resource(uri: &str) -> ResourceRegistration {
    ResourceRegistration::new(uri, "doc", "a document", |_| {
        Box::pin(async { Ok("content".to_string()) })
    })
}

fn static_prompt(name: &str) -> PromptRegistration {
    PromptRegistration::new(name, "a prompt", Vec::new(), |_| {
        Box::pin(async { Ok("text".to_string()) })
    })
}

#[test]
fn second_tool_under_same_name_is_rejected() {
    let mut registry = ComponentRegistry::new(ServerIdentity::new("test"));

    registry.register_tool(ping_tool("ping")).unwrap();
    let err = registry.register_tool(ping_tool("ping")).unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateTool(ref name) if name == "ping"));
    // The original registration is untouched
    assert_eq!(registry.counts(), (1, 0, 0));
    assert!(registry.has_tool("ping"));
}

#[test]
fn duplicate_resource_and_prompt_are_rejected() {
    let mut registry = ComponentRegistry::new(ServerIdentity::new("test"));

    registry
        .register_resource(static_resource("notes://{id}"))
        .unwrap();
    assert!(matches!(
        registry.register_resource(static_resource("notes://{id}")),
        Err(RegistryError::DuplicateResource(_))
    ));

    registry.register_prompt(static_prompt("greet")).unwrap();
    assert!(matches!(
        registry.register_prompt(static_prompt("greet")),
        Err(RegistryError::DuplicatePrompt(_))
    ));
}

#[test]
fn tools_iterate_in_name_order() {
    let mut registry = ComponentRegistry::new(ServerIdentity::new("test"));
    registry.register_tool(ping_tool("zeta")).unwrap();
    registry.register_tool(ping_tool("alpha")).unwrap();
    registry.register_tool(ping_tool("mid")).unwrap();

    let names: Vec<&str> = registry.tools().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[tokio::test]
async fn resource_resolution_extracts_placeholders() {
    let mut registry = ComponentRegistry::new(ServerIdentity::new("test"));
    registry
        .register_resource(ResourceRegistration::new(
            "notes://{id}",
            "note detail",
            "a note",
            |params| {
                Box::pin(async move {
                    Ok(format!("note {}", params.get("id").cloned().unwrap_or_default()))
                })
            },
        ))
        .unwrap();

    let (resource, params) = registry.resolve_resource("notes://42").unwrap();
    assert_eq!(resource.uri_template, "notes://{id}");
    assert_eq!(resource.read(params).await.unwrap(), "note 42");

    // Wrong scheme and extra segments do not match
    assert!(registry.resolve_resource("tags://42").is_none());
    assert!(registry.resolve_resource("notes://42/extra").is_none());
}

#[test]
fn prompt_arguments_are_preserved() {
    let mut registry = ComponentRegistry::new(ServerIdentity::new("test"));
    registry
        .register_prompt(PromptRegistration::new(
            "greet",
            "Greet someone",
            vec![PromptArgumentSpec {
                name: "who".to_string(),
                description: "Person to greet".to_string(),
                required: true,
            }],
            |_| Box::pin(async { Ok("hello".to_string()) }),
        ))
        .unwrap();

    let prompt = registry.prompt("greet").unwrap();
    assert_eq!(prompt.arguments.len(), 1);
    assert!(prompt.arguments[0].required);
}
