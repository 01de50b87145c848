//! Tags app: a second, minimal model so multi-app setups have something to
//! discover.

use crate::apps::record_object;
use crate::bridge::{CreateOutcome, FieldDescriptor, FieldKind, ModelBridge};
use crate::discovery::{McpApp, RegistrationContext};
use crate::error::BridgeError;
use crate::registry::JsonObject;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: chrono::NaiveDateTime,
}

pub struct TagBridge {
    pool: SqlitePool,
}

impl TagBridge {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModelBridge for TagBridge {
    fn app_label(&self) -> &str {
        "tags"
    }

    fn model_name(&self) -> &str {
        "tag"
    }

    fn model_name_plural(&self) -> &str {
        "tags"
    }

    fn verbose_name(&self) -> &str {
        "tag"
    }

    fn verbose_name_plural(&self) -> &str {
        "tags"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("name", FieldKind::Text).required(),
            FieldDescriptor::new("created_at", FieldKind::DateTime),
        ]
    }

    async fn get(&self, id: i64) -> Result<Option<JsonObject>, BridgeError> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name, created_at FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        tag.as_ref().map(record_object).transpose()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<JsonObject>, BridgeError> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, created_at FROM tags ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        tags.iter().map(record_object).collect()
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<JsonObject>, BridgeError> {
        let pattern = format!("%{query}%");
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, created_at FROM tags WHERE name LIKE ? ORDER BY id LIMIT ?",
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        tags.iter().map(record_object).collect()
    }

    async fn create(&self, fields: JsonObject) -> Result<CreateOutcome, BridgeError> {
        let name = fields.get("name").and_then(Value::as_str).unwrap_or_default();

        // UNIQUE constraint surfaces as a validation failure, not a fault.
        let inserted = sqlx::query("INSERT INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await;

        let id = match inserted {
            Ok(result) => result.last_insert_rowid(),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                let mut errors = BTreeMap::new();
                errors.insert(
                    "name".to_string(),
                    vec!["A tag with this name already exists.".to_string()],
                );
                return Ok(CreateOutcome::Invalid(errors));
            }
            Err(e) => return Err(e.into()),
        };

        match self.get(id).await? {
            Some(record) => Ok(CreateOutcome::Created(record)),
            None => Err(BridgeError::Internal(format!(
                "tag {id} vanished after insert"
            ))),
        }
    }
}

pub struct TagsApp {
    pool: SqlitePool,
}

impl TagsApp {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl McpApp for TagsApp {
    fn name(&self) -> &str {
        "tags"
    }

    fn register(&self, ctx: &mut RegistrationContext<'_>) -> anyhow::Result<()> {
        ctx.expose_model(Arc::new(TagBridge::new(self.pool.clone())))?;
        Ok(())
    }
}
