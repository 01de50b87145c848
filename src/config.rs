//! Environment-driven configuration for the MCP integration.
//!
//! Every setting is optional with a sensible default, so a host application
//! can mount the MCP server with zero configuration and tighten things up
//! later via environment variables.

use std::env;
use std::time::Duration;

/// Typed view of the `MCP_*` environment variables.
#[derive(Debug, Clone)]
pub struct McpConfig {
    /// Display name reported to MCP clients during initialization.
    pub server_name: String,
    /// URL prefix the MCP endpoints are mounted under (no slashes).
    pub url_prefix: String,
    /// Optional instruction text handed to connecting clients.
    pub instructions: Option<String>,
    /// Ordered dependency list advertised by the server.
    pub dependencies: Vec<String>,
    /// Whether discovery walks the app manifest at startup.
    pub auto_discover: bool,
    /// Per-category exposure toggles for the bridge adapters.
    pub expose_models: bool,
    pub expose_admin: bool,
    pub expose_api: bool,
    /// Keep-alive interval for the SSE stream.
    pub sse_keepalive: Duration,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            server_name: "Appmcp MCP Server".to_string(),
            url_prefix: "mcp".to_string(),
            instructions: None,
            dependencies: Vec::new(),
            auto_discover: true,
            expose_models: true,
            expose_admin: true,
            expose_api: true,
            sse_keepalive: Duration::from_secs(15),
        }
    }
}

impl McpConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let dependencies = env::var("MCP_DEPENDENCIES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.dependencies);

        let sse_keepalive = env::var("MCP_SSE_KEEPALIVE_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.sse_keepalive);

        Self {
            server_name: env::var("MCP_SERVER_NAME").unwrap_or(defaults.server_name),
            url_prefix: env::var("MCP_URL_PREFIX").unwrap_or(defaults.url_prefix),
            instructions: env::var("MCP_INSTRUCTIONS").ok().filter(|s| !s.is_empty()),
            dependencies,
            auto_discover: env_flag("MCP_AUTO_DISCOVER", defaults.auto_discover),
            expose_models: env_flag("MCP_EXPOSE_MODELS", defaults.expose_models),
            expose_admin: env_flag("MCP_EXPOSE_ADMIN", defaults.expose_admin),
            expose_api: env_flag("MCP_EXPOSE_API", defaults.expose_api),
            sse_keepalive,
        }
    }

    /// Non-fatal configuration checks, reported as warnings at startup.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.url_prefix.is_empty() {
            warnings.push("MCP_URL_PREFIX should not be empty".to_string());
        } else if self.url_prefix.contains('/') {
            warnings.push("MCP_URL_PREFIX should be a single path segment".to_string());
        }

        if self.server_name.trim().is_empty() {
            warnings.push("MCP_SERVER_NAME should not be blank".to_string());
        }

        if self.sse_keepalive.is_zero() {
            warnings.push("MCP_SSE_KEEPALIVE_SECS should be a positive integer".to_string());
        }

        warnings
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => {
                tracing::warn!(key, value = other, "unrecognized boolean flag, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_mcp_env() {
        for key in [
            "MCP_SERVER_NAME",
            "MCP_URL_PREFIX",
            "MCP_INSTRUCTIONS",
            "MCP_DEPENDENCIES",
            "MCP_AUTO_DISCOVER",
            "MCP_EXPOSE_MODELS",
            "MCP_EXPOSE_ADMIN",
            "MCP_EXPOSE_API",
            "MCP_SSE_KEEPALIVE_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_without_env() {
        clear_mcp_env();
        let config = McpConfig::from_env();

        assert_eq!(config.url_prefix, "mcp");
        assert!(config.auto_discover);
        assert!(config.expose_models);
        assert!(config.expose_admin);
        assert!(config.expose_api);
        assert_eq!(config.sse_keepalive, Duration::from_secs(15));
        assert!(config.validate().is_empty());
    }

    #[test]
    #[serial]
    fn env_overrides_are_parsed() {
        clear_mcp_env();
        std::env::set_var("MCP_SERVER_NAME", "Inventory MCP");
        std::env::set_var("MCP_URL_PREFIX", "tools");
        std::env::set_var("MCP_DEPENDENCIES", "sqlite, ripgrep ,");
        std::env::set_var("MCP_EXPOSE_ADMIN", "off");
        std::env::set_var("MCP_SSE_KEEPALIVE_SECS", "30");

        let config = McpConfig::from_env();
        assert_eq!(config.server_name, "Inventory MCP");
        assert_eq!(config.url_prefix, "tools");
        assert_eq!(config.dependencies, vec!["sqlite", "ripgrep"]);
        assert!(!config.expose_admin);
        assert!(config.expose_models);
        assert_eq!(config.sse_keepalive, Duration::from_secs(30));

        clear_mcp_env();
    }

    #[test]
    #[serial]
    fn unrecognized_flag_values_keep_the_default() {
        clear_mcp_env();
        std::env::set_var("MCP_AUTO_DISCOVER", "maybe");
        std::env::set_var("MCP_EXPOSE_MODELS", "0");

        let config = McpConfig::from_env();
        assert!(config.auto_discover);
        assert!(!config.expose_models);

        clear_mcp_env();
    }

    #[test]
    #[serial]
    fn validate_flags_bad_prefix() {
        clear_mcp_env();
        let mut config = McpConfig::default();
        config.url_prefix = "a/b".to_string();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("single path segment"));
    }
}
