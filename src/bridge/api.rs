//! API-endpoint bridge: one tool per HTTP-method-to-action mapping.
//!
//! Metadata methods (`head`, `options`) are skipped. Generated tools accept
//! arbitrary keyword parameters and forward them to the adapter's action
//! method; the adapter returns the raw payload it would have wrapped in an
//! HTTP response.

use crate::error::{BridgeError, RegistryError};
use crate::registry::{ComponentRegistry, JsonObject, ToolRegistration};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

const SKIPPED_METHODS: [&str; 2] = ["head", "options"];

#[derive(Debug, Clone)]
pub struct ApiActionMapping {
    pub method: String,
    pub action: String,
}

impl ApiActionMapping {
    pub fn new(method: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            action: action.into(),
        }
    }
}

/// Descriptor interface an API adapter implements.
#[async_trait]
pub trait ApiBridge: Send + Sync {
    /// Snake-case endpoint identifier used in tool names.
    fn endpoint_name(&self) -> &str;
    /// Declared HTTP-method-to-action table.
    fn action_map(&self) -> Vec<ApiActionMapping>;
    /// Run one action with the forwarded parameters, returning the raw
    /// payload.
    async fn invoke(&self, action: &str, params: JsonObject) -> Result<Value, BridgeError>;
}

/// Register one tool per declared mapping, skipping metadata methods.
pub fn register_api(
    registry: &mut ComponentRegistry,
    bridge: Arc<dyn ApiBridge>,
) -> Result<(), RegistryError> {
    for mapping in bridge.action_map() {
        if SKIPPED_METHODS.contains(&mapping.method.to_ascii_lowercase().as_str()) {
            continue;
        }

        let schema = json!({
            "type": "object",
            "additionalProperties": true
        });

        let action = mapping.action.clone();
        let bridge = Arc::clone(&bridge);
        let tool = ToolRegistration::new(
            format!("api_{}_{}", bridge.endpoint_name(), mapping.action),
            format!("API action: {} {}", mapping.action, bridge.endpoint_name()),
            schema,
            move |args| {
                let bridge = Arc::clone(&bridge);
                let action = action.clone();
                Box::pin(async move {
                    match bridge.invoke(&action, args).await {
                        Ok(payload) => Ok(payload),
                        Err(e) => Ok(json!({"error": e.to_string()})),
                    }
                })
            },
        );
        registry.register_tool(tool)?;
    }

    Ok(())
}
