//! Admin-action bridge: one tool per declared bulk action.
//!
//! The bulk-delete action is never exposed, even when an adapter declares
//! it. Generated tools accept a list of record identifiers and report the
//! affected count plus a textual result.

use crate::error::{BridgeError, RegistryError};
use crate::registry::{ComponentRegistry, ToolRegistration};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Action name excluded from tool generation for safety.
pub const BULK_DELETE_ACTION: &str = "delete_selected";

#[derive(Debug, Clone)]
pub struct AdminAction {
    pub name: String,
    pub description: String,
}

impl AdminAction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub affected: u64,
    pub message: String,
}

/// Descriptor interface an admin adapter implements: the action table plus
/// an executor that resolves identifiers to persisted records itself.
#[async_trait]
pub trait AdminBridge: Send + Sync {
    fn model_name(&self) -> &str;
    fn verbose_name(&self) -> &str;
    fn actions(&self) -> Vec<AdminAction>;
    async fn execute(&self, action: &str, ids: &[i64]) -> Result<ActionOutcome, BridgeError>;
}

/// Register one tool per declared action, skipping the bulk delete.
pub fn register_admin(
    registry: &mut ComponentRegistry,
    bridge: Arc<dyn AdminBridge>,
) -> Result<(), RegistryError> {
    for action in bridge.actions() {
        if action.name == BULK_DELETE_ACTION {
            continue;
        }

        let schema = json!({
            "type": "object",
            "properties": {
                "ids": {
                    "type": "array",
                    "items": {"type": "integer"},
                    "description": format!("Identifiers of the {} records to act on", bridge.verbose_name())
                }
            },
            "required": ["ids"]
        });

        let action_name = action.name.clone();
        let bridge = Arc::clone(&bridge);
        let tool = ToolRegistration::new(
            format!("admin_{}_{}", bridge.model_name(), action.name),
            format!(
                "Admin action: {} for {}",
                action.description,
                bridge.verbose_name()
            ),
            schema,
            move |args| {
                let bridge = Arc::clone(&bridge);
                let action_name = action_name.clone();
                Box::pin(async move {
                    let Some(ids) = args.get("ids").and_then(Value::as_array) else {
                        return Ok(json!({
                            "success": false,
                            "error": "Missing 'ids' argument (expected an array of integers)"
                        }));
                    };
                    let mut parsed = Vec::with_capacity(ids.len());
                    for value in ids {
                        match value.as_i64() {
                            Some(id) => parsed.push(id),
                            None => {
                                return Ok(json!({
                                    "success": false,
                                    "error": "Every entry in 'ids' must be an integer"
                                }));
                            }
                        }
                    }
                    let ids = parsed;

                    match bridge.execute(&action_name, &ids).await {
                        Ok(outcome) => Ok(json!({
                            "success": true,
                            "action": action_name,
                            "affected_count": outcome.affected,
                            "result": outcome.message,
                        })),
                        Err(e) => Ok(json!({"success": false, "error": e.to_string()})),
                    }
                })
            },
        );
        registry.register_tool(tool)?;
    }

    Ok(())
}
