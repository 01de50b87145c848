//! Notes app: one content model wired through every bridge kind, plus a
//! hand-registered tool and prompt.

use crate::apps::record_object;
use crate::bridge::{
    ActionOutcome, AdminAction, AdminBridge, ApiActionMapping, ApiBridge, CreateOutcome,
    FieldDescriptor, FieldKind, ModelBridge, RelatedPreview,
};
use crate::discovery::{McpApp, RegistrationContext};
use crate::error::BridgeError;
use crate::registry::{JsonObject, PromptArgumentSpec, PromptRegistration, ToolRegistration};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub created_at: chrono::NaiveDateTime,
}

pub struct NoteBridge {
    pool: SqlitePool,
}

impl NoteBridge {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModelBridge for NoteBridge {
    fn app_label(&self) -> &str {
        "notes"
    }

    fn model_name(&self) -> &str {
        "note"
    }

    fn model_name_plural(&self) -> &str {
        "notes"
    }

    fn verbose_name(&self) -> &str {
        "note"
    }

    fn verbose_name_plural(&self) -> &str {
        "notes"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("title", FieldKind::Text).required(),
            FieldDescriptor::new("body", FieldKind::Text),
            FieldDescriptor::new("published", FieldKind::Boolean),
            FieldDescriptor::new("created_at", FieldKind::DateTime),
        ]
    }

    async fn get(&self, id: i64) -> Result<Option<JsonObject>, BridgeError> {
        let note = sqlx::query_as::<_, Note>(
            "SELECT id, title, body, published, created_at FROM notes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        note.as_ref().map(record_object).transpose()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<JsonObject>, BridgeError> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT id, title, body, published, created_at FROM notes \
             ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        notes.iter().map(record_object).collect()
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<JsonObject>, BridgeError> {
        let pattern = format!("%{query}%");
        let notes = sqlx::query_as::<_, Note>(
            "SELECT id, title, body, published, created_at FROM notes \
             WHERE title LIKE ?1 OR body LIKE ?1 ORDER BY id LIMIT ?2",
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        notes.iter().map(record_object).collect()
    }

    async fn create(&self, fields: JsonObject) -> Result<CreateOutcome, BridgeError> {
        let title = fields
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let body = fields.get("body").and_then(Value::as_str).unwrap_or_default();
        let published = fields
            .get("published")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let id = sqlx::query("INSERT INTO notes (title, body, published) VALUES (?, ?, ?)")
            .bind(title)
            .bind(body)
            .bind(published)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        match self.get(id).await? {
            Some(record) => Ok(CreateOutcome::Created(record)),
            None => Err(BridgeError::Internal(format!(
                "note {id} vanished after insert"
            ))),
        }
    }

    async fn related_preview(
        &self,
        id: i64,
        cap: usize,
    ) -> Result<Vec<RelatedPreview>, BridgeError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM note_comments WHERE note_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if total == 0 {
            return Ok(Vec::new());
        }

        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT author, body FROM note_comments WHERE note_id = ? ORDER BY id LIMIT ?",
        )
        .bind(id)
        .bind(cap as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(vec![RelatedPreview {
            relation: "comments".to_string(),
            entries: rows
                .into_iter()
                .map(|(author, body)| format!("{author}: {body}"))
                .collect(),
            total: total as usize,
        }])
    }
}

pub struct NoteAdmin {
    pool: SqlitePool,
}

impl NoteAdmin {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminBridge for NoteAdmin {
    fn model_name(&self) -> &str {
        "note"
    }

    fn verbose_name(&self) -> &str {
        "note"
    }

    fn actions(&self) -> Vec<AdminAction> {
        vec![
            AdminAction::new("publish", "Mark selected notes as published"),
            AdminAction::new("unpublish", "Mark selected notes as drafts"),
            // Declared like any other action; the bridge refuses to expose
            // bulk deletion as a tool.
            AdminAction::new("delete_selected", "Delete selected notes"),
        ]
    }

    async fn execute(&self, action: &str, ids: &[i64]) -> Result<ActionOutcome, BridgeError> {
        let published = match action {
            "publish" => true,
            "unpublish" => false,
            other => return Err(BridgeError::UnknownAction(other.to_string())),
        };

        let mut affected = 0u64;
        for id in ids {
            affected += sqlx::query("UPDATE notes SET published = ? WHERE id = ?")
                .bind(published)
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();
        }

        Ok(ActionOutcome {
            affected,
            message: format!("{affected} note(s) updated"),
        })
    }
}

pub struct NotesApi {
    pool: SqlitePool,
}

impl NotesApi {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiBridge for NotesApi {
    fn endpoint_name(&self) -> &str {
        "notes"
    }

    fn action_map(&self) -> Vec<ApiActionMapping> {
        vec![
            ApiActionMapping::new("get", "published"),
            ApiActionMapping::new("post", "draft"),
            // Metadata method; the bridge drops it.
            ApiActionMapping::new("head", "published"),
        ]
    }

    async fn invoke(&self, action: &str, params: JsonObject) -> Result<Value, BridgeError> {
        match action {
            "published" => {
                let notes = sqlx::query_as::<_, Note>(
                    "SELECT id, title, body, published, created_at FROM notes \
                     WHERE published = 1 ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await?;
                let records = notes
                    .iter()
                    .map(record_object)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
            }
            "draft" => {
                let title = params
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or("Untitled");
                let body = params.get("body").and_then(Value::as_str).unwrap_or_default();
                let id = sqlx::query("INSERT INTO notes (title, body, published) VALUES (?, ?, 0)")
                    .bind(title)
                    .bind(body)
                    .execute(&self.pool)
                    .await?
                    .last_insert_rowid();
                Ok(json!({"id": id, "title": title}))
            }
            other => Err(BridgeError::UnknownAction(other.to_string())),
        }
    }
}

/// Plain tool registered alongside the bridged ones. CPU-bound, so it goes
/// through the blocking constructor.
fn word_count_tool() -> ToolRegistration {
    ToolRegistration::new_blocking(
        "count_words",
        "Count the words in a piece of text",
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "Text to count words in"}
            },
            "required": ["text"]
        }),
        |args| {
            let text = args.get("text").and_then(Value::as_str).unwrap_or_default();
            Ok(json!({"words": text.split_whitespace().count()}))
        },
    )
}

fn summarize_prompt() -> PromptRegistration {
    PromptRegistration::new(
        "summarize_note",
        "Ask for a summary of a note",
        vec![
            PromptArgumentSpec {
                name: "title".to_string(),
                description: "Title of the note to summarize".to_string(),
                required: true,
            },
            PromptArgumentSpec {
                name: "tone".to_string(),
                description: "Tone of the summary, e.g. formal or casual".to_string(),
                required: false,
            },
        ],
        |args| {
            Box::pin(async move {
                let title = args
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let tone = args
                    .get("tone")
                    .and_then(Value::as_str)
                    .unwrap_or("neutral")
                    .to_string();
                Ok(format!(
                    "Summarize the note titled '{title}' in three sentences, \
                     using a {tone} tone."
                ))
            })
        },
    )
}

pub struct NotesApp {
    pool: SqlitePool,
}

impl NotesApp {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl McpApp for NotesApp {
    fn name(&self) -> &str {
        "notes"
    }

    fn register(&self, ctx: &mut RegistrationContext<'_>) -> anyhow::Result<()> {
        ctx.expose_model(Arc::new(NoteBridge::new(self.pool.clone())))?;
        ctx.expose_admin(Arc::new(NoteAdmin::new(self.pool.clone())))?;
        ctx.expose_api(Arc::new(NotesApi::new(self.pool.clone())))?;
        ctx.tool(word_count_tool())?;
        ctx.prompt(summarize_prompt())?;
        Ok(())
    }
}
