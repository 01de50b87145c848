//! Manifest-driven discovery of MCP components.
//!
//! Instead of scanning for conventionally named modules at import time, the
//! host application hands over an explicit, ordered [`AppManifest`]. Each
//! app implements [`McpApp`] and contributes its registrations through a
//! [`RegistrationContext`] when `discover` runs once at startup, after the
//! manifest is fully assembled.
//!
//! A failing app is isolated: its error lands in the report and the walk
//! continues with the remaining apps. Running discovery a second time is a
//! no-op thanks to the registry's discovered-app ledger.

use crate::bridge::{register_admin, register_api, register_model, AdminBridge, ApiBridge, ModelBridge};
use crate::config::McpConfig;
use crate::error::RegistryError;
use crate::registry::{
    ComponentRegistry, PromptRegistration, ResourceRegistration, ToolRegistration,
};
use std::sync::Arc;

/// A unit of the host application contributing MCP components.
pub trait McpApp: Send + Sync {
    /// Stable identifier, unique within the manifest.
    fn name(&self) -> &str;

    /// Contribute registrations. Called at most once per process.
    fn register(&self, ctx: &mut RegistrationContext<'_>) -> anyhow::Result<()>;
}

/// Ordered collection of apps; declaration order is registration order.
#[derive(Default)]
pub struct AppManifest {
    apps: Vec<Box<dyn McpApp>>,
}

impl AppManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(mut self, app: impl McpApp + 'static) -> Self {
        self.apps.push(Box::new(app));
        self
    }

    pub fn push(&mut self, app: impl McpApp + 'static) {
        self.apps.push(Box::new(app));
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn McpApp> {
        self.apps.iter().map(Box::as_ref)
    }
}

/// Registration surface handed to each app. Direct registrations go through
/// `tool`/`resource`/`prompt`; bridge adapters go through the `expose_*`
/// entry points, which respect the per-category configuration toggles.
pub struct RegistrationContext<'a> {
    registry: &'a mut ComponentRegistry,
    config: &'a McpConfig,
}

impl<'a> RegistrationContext<'a> {
    pub fn new(registry: &'a mut ComponentRegistry, config: &'a McpConfig) -> Self {
        Self { registry, config }
    }

    pub fn tool(&mut self, tool: ToolRegistration) -> Result<(), RegistryError> {
        self.registry.register_tool(tool)
    }

    pub fn resource(&mut self, resource: ResourceRegistration) -> Result<(), RegistryError> {
        self.registry.register_resource(resource)
    }

    pub fn prompt(&mut self, prompt: PromptRegistration) -> Result<(), RegistryError> {
        self.registry.register_prompt(prompt)
    }

    pub fn expose_model(&mut self, bridge: Arc<dyn ModelBridge>) -> Result<(), RegistryError> {
        if !self.config.expose_models {
            return Ok(());
        }
        register_model(self.registry, bridge)
    }

    pub fn expose_admin(&mut self, bridge: Arc<dyn AdminBridge>) -> Result<(), RegistryError> {
        if !self.config.expose_admin {
            return Ok(());
        }
        register_admin(self.registry, bridge)
    }

    pub fn expose_api(&mut self, bridge: Arc<dyn ApiBridge>) -> Result<(), RegistryError> {
        if !self.config.expose_api {
            return Ok(());
        }
        register_api(self.registry, bridge)
    }
}

/// What a discovery pass did. Apps skipped by the ledger appear in neither
/// list.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub discovered: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Walk the manifest in declaration order and let each app register its
/// components. Disabled entirely by `config.auto_discover = false`.
pub fn discover(
    manifest: &AppManifest,
    config: &McpConfig,
    registry: &mut ComponentRegistry,
) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();

    if !config.auto_discover {
        tracing::debug!("auto-discovery disabled; skipping manifest walk");
        return report;
    }

    for app in manifest.iter() {
        if !registry.mark_discovered(app.name()) {
            tracing::debug!(app = app.name(), "already discovered, skipping");
            continue;
        }

        let mut ctx = RegistrationContext::new(registry, config);
        match app.register(&mut ctx) {
            Ok(()) => {
                tracing::debug!(app = app.name(), "registered MCP components");
                report.discovered.push(app.name().to_string());
            }
            Err(e) => {
                tracing::warn!(app = app.name(), error = %e, "app registration failed, continuing");
                report.failed.push((app.name().to_string(), e.to_string()));
            }
        }
    }

    let (tools, resources, prompts) = registry.counts();
    tracing::info!(
        apps = report.discovered.len(),
        failed = report.failed.len(),
        tools,
        resources,
        prompts,
        "discovery complete"
    );

    report
}
