//! Discovery semantics: manifest order, idempotency, failure isolation, and
//! the configuration toggles.

use appmcp::discovery::{discover, AppManifest, McpApp, RegistrationContext};
use appmcp::registry::{ComponentRegistry, ServerIdentity, ToolRegistration};
use appmcp::test_utils::test_helpers::create_test_db;
use appmcp::{apps, McpConfig};
use serde_json::json;

struct StubApp {
    name: &'static str,
    tool: &'static str,
}

impl McpApp for StubApp {
    fn name(&self) -> &str {
        self.name
    }

    fn register(&self, ctx: &mut RegistrationContext<'_>) -> anyhow::Result<()> {
        ctx.tool(ToolRegistration::new(
            self.tool,
            "stub tool",
            json!({"type": "object"}),
            |_| Box::pin(async { Ok(json!(null)) }),
        ))?;
        Ok(())
    }
}

struct FailingApp;

impl McpApp for FailingApp {
    fn name(&self) -> &str {
        "broken"
    }

    fn register(&self, _ctx: &mut RegistrationContext<'_>) -> anyhow::Result<()> {
        anyhow::bail!("intentional failure")
    }
}

fn fresh_registry() -> ComponentRegistry {
    ComponentRegistry::new(ServerIdentity::new("test"))
}

#[test]
fn discovery_is_idempotent() {
    let manifest = AppManifest::new().with_app(StubApp {
        name: "stub",
        tool: "stub_tool",
    });
    let config = McpConfig::default();
    let mut registry = fresh_registry();

    let first = discover(&manifest, &config, &mut registry);
    assert_eq!(first.discovered, vec!["stub"]);
    assert_eq!(registry.counts(), (1, 0, 0));

    // A second pass finds everything already discovered and changes nothing.
    let second = discover(&manifest, &config, &mut registry);
    assert!(second.discovered.is_empty());
    assert!(second.failed.is_empty());
    assert_eq!(registry.counts(), (1, 0, 0));
}

#[test]
fn one_failing_app_does_not_block_the_rest() {
    let manifest = AppManifest::new()
        .with_app(StubApp {
            name: "first",
            tool: "first_tool",
        })
        .with_app(FailingApp)
        .with_app(StubApp {
            name: "last",
            tool: "last_tool",
        });
    let config = McpConfig::default();
    let mut registry = fresh_registry();

    let report = discover(&manifest, &config, &mut registry);

    assert_eq!(report.discovered, vec!["first", "last"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "broken");
    assert!(registry.has_tool("first_tool"));
    assert!(registry.has_tool("last_tool"));
}

#[test]
fn auto_discover_off_skips_the_manifest() {
    let manifest = AppManifest::new().with_app(StubApp {
        name: "stub",
        tool: "stub_tool",
    });
    let config = McpConfig {
        auto_discover: false,
        ..McpConfig::default()
    };
    let mut registry = fresh_registry();

    let report = discover(&manifest, &config, &mut registry);

    assert!(report.discovered.is_empty());
    assert_eq!(registry.counts(), (0, 0, 0));
}

#[tokio::test]
async fn each_model_contributes_four_tools_and_one_resource() {
    let pool = create_test_db().await.unwrap();
    let manifest = apps::manifest(pool);
    let config = McpConfig::default();

    let (registry, report) = appmcp::build_registry(&manifest, &config);
    assert!(report.failed.is_empty());

    // Notes model
    for name in ["get_note", "list_notes", "search_notes", "create_note"] {
        assert!(registry.has_tool(name), "missing tool {name}");
    }
    // Tags model
    for name in ["get_tag", "list_tags", "search_tags", "create_tag"] {
        assert!(registry.has_tool(name), "missing tool {name}");
    }

    let resource_uris: Vec<&str> = registry
        .resources()
        .map(|r| r.uri_template.as_str())
        .collect();
    assert_eq!(resource_uris, vec!["notes://{id}", "tags://{id}"]);
}

#[tokio::test]
async fn expose_toggles_gate_each_bridge_kind() {
    let pool = create_test_db().await.unwrap();
    let manifest = apps::manifest(pool);
    let config = McpConfig {
        expose_models: false,
        expose_admin: false,
        expose_api: false,
        ..McpConfig::default()
    };

    let (registry, report) = appmcp::build_registry(&manifest, &config);
    assert!(report.failed.is_empty());

    assert!(!registry.has_tool("get_note"));
    assert!(!registry.has_tool("admin_note_publish"));
    assert!(!registry.has_tool("api_notes_published"));
    // Hand-registered components are not gated by the bridge toggles.
    assert!(registry.has_tool("count_words"));
    assert!(registry.has_prompt("summarize_note"));
}
