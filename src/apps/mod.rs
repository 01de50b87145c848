//! Built-in demo apps backed by the SQLite schema in `migrations/`.
//!
//! These double as living documentation for the bridge adapters and as
//! fixtures for the integration tests.

pub mod notes;
pub mod tags;

use crate::discovery::AppManifest;
use crate::error::BridgeError;
use crate::registry::JsonObject;
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;

/// Manifest holding every built-in app, in registration order.
pub fn manifest(pool: SqlitePool) -> AppManifest {
    AppManifest::new()
        .with_app(notes::NotesApp::new(pool.clone()))
        .with_app(tags::TagsApp::new(pool))
}

/// Serialize a row struct into the JSON object shape bridges traffic in.
pub(crate) fn record_object<T: Serialize>(record: &T) -> Result<JsonObject, BridgeError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BridgeError::Internal(
            "record did not serialize to an object".to_string(),
        )),
        Err(e) => Err(BridgeError::Internal(e.to_string())),
    }
}
