//! appmcp exposes application data models, admin actions, and API endpoints
//! as MCP tools, resources, and prompts, mounted inside an axum application.
//!
//! The flow mirrors application startup: build an [`AppManifest`] of apps,
//! run [`discovery::discover`] once to populate a [`ComponentRegistry`],
//! freeze the registry behind an `Arc`, then hand it to [`mcp::mount`] to
//! splice the MCP transport into the host router.

pub mod apps;
pub mod bridge;
pub mod config;
pub mod db;
pub mod discovery;
pub mod error;
pub mod inspect;
pub mod mcp;
pub mod registry;
pub mod test_utils;

pub use config::McpConfig;
pub use discovery::{AppManifest, DiscoveryReport, McpApp, RegistrationContext};
pub use registry::{ComponentRegistry, ServerIdentity};

/// Build a registry from a manifest in one call: identity from config,
/// followed by a single discovery pass.
pub fn build_registry(
    manifest: &AppManifest,
    config: &McpConfig,
) -> (ComponentRegistry, DiscoveryReport) {
    let mut registry = ComponentRegistry::new(ServerIdentity::from(config));
    let report = discovery::discover(manifest, config, &mut registry);
    (registry, report)
}
