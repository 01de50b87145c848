//! Data-model bridge: CRUD tools plus a record resource for one model.
//!
//! Registering a model produces exactly four tools (get/list/search/create)
//! and one resource (`<app>://{id}` rendered as Markdown with a bounded
//! preview of related records).

use crate::error::{BridgeError, RegistryError};
use crate::registry::{ComponentRegistry, JsonObject, ResourceRegistration, ToolRegistration};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maximum related records shown per relation in the record resource.
pub const RELATED_PREVIEW_CAP: usize = 5;

const DEFAULT_LIST_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    Boolean,
    Text,
    DateTime,
}

/// One column of the model, as the bridge generator sees it.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Must be supplied on create.
    pub required: bool,
    /// Empty strings accepted (text fields only).
    pub blank: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            blank: true,
        }
    }

    /// Field must be present and, for text, non-blank.
    pub fn required(mut self) -> Self {
        self.required = true;
        self.blank = false;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        self.blank = true;
        self
    }
}

/// Outcome of a create call after validation has already passed.
pub enum CreateOutcome {
    Created(JsonObject),
    /// Field-level messages from constraints the adapter enforces itself.
    Invalid(BTreeMap<String, Vec<String>>),
}

/// A bounded look at one relation of a record.
#[derive(Debug, Clone)]
pub struct RelatedPreview {
    pub relation: String,
    pub entries: Vec<String>,
    pub total: usize,
}

/// Descriptor interface a model adapter implements. Identifier columns are
/// `i64` throughout; records travel as JSON objects keyed by field name.
#[async_trait]
pub trait ModelBridge: Send + Sync {
    /// Scheme of the record resource URI (`notes://{id}`).
    fn app_label(&self) -> &str;
    /// Snake-case singular identifier used in tool names.
    fn model_name(&self) -> &str;
    /// Snake-case plural identifier used in tool names.
    fn model_name_plural(&self) -> &str;
    /// Human-readable singular name used in descriptions.
    fn verbose_name(&self) -> &str;
    fn verbose_name_plural(&self) -> &str;
    /// Field table, excluding the identifier column.
    fn fields(&self) -> Vec<FieldDescriptor>;

    async fn get(&self, id: i64) -> Result<Option<JsonObject>, BridgeError>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<JsonObject>, BridgeError>;
    /// Case-insensitive substring search over text fields.
    async fn search(&self, query: &str, limit: i64) -> Result<Vec<JsonObject>, BridgeError>;
    /// Fields have already been filtered to known names and validated
    /// against the descriptor table.
    async fn create(&self, fields: JsonObject) -> Result<CreateOutcome, BridgeError>;

    /// Related records for the resource view; `cap` bounds each relation.
    async fn related_preview(
        &self,
        _id: i64,
        _cap: usize,
    ) -> Result<Vec<RelatedPreview>, BridgeError> {
        Ok(Vec::new())
    }
}

/// Register the four CRUD tools and the record resource for one model.
pub fn register_model(
    registry: &mut ComponentRegistry,
    bridge: Arc<dyn ModelBridge>,
) -> Result<(), RegistryError> {
    register_get_tool(registry, Arc::clone(&bridge))?;
    register_list_tool(registry, Arc::clone(&bridge))?;
    register_search_tool(registry, Arc::clone(&bridge))?;
    register_create_tool(registry, Arc::clone(&bridge))?;
    register_record_resource(registry, bridge)
}

fn register_get_tool(
    registry: &mut ComponentRegistry,
    bridge: Arc<dyn ModelBridge>,
) -> Result<(), RegistryError> {
    let verbose = bridge.verbose_name().to_string();
    let schema = json!({
        "type": "object",
        "properties": {
            "id": {"type": "integer", "description": format!("Identifier of the {verbose} to retrieve")}
        },
        "required": ["id"]
    });

    let tool = ToolRegistration::new(
        format!("get_{}", bridge.model_name()),
        format!("Get a {verbose} by ID"),
        schema,
        move |args| {
            let bridge = Arc::clone(&bridge);
            let verbose = verbose.clone();
            Box::pin(async move {
                let Some(id) = args.get("id").and_then(Value::as_i64) else {
                    return Ok(json!({"error": "Missing or non-integer 'id' argument"}));
                };
                match bridge.get(id).await? {
                    Some(record) => Ok(Value::Object(record)),
                    None => Ok(json!({"error": format!("{verbose} with ID {id} not found")})),
                }
            })
        },
    );
    registry.register_tool(tool)
}

fn register_list_tool(
    registry: &mut ComponentRegistry,
    bridge: Arc<dyn ModelBridge>,
) -> Result<(), RegistryError> {
    let schema = json!({
        "type": "object",
        "properties": {
            "limit": {"type": "integer", "description": "Maximum number of records to return", "default": DEFAULT_LIST_LIMIT},
            "offset": {"type": "integer", "description": "Number of records to skip", "default": 0}
        }
    });

    let description = format!("List {}", bridge.verbose_name_plural());
    let tool = ToolRegistration::new(
        format!("list_{}", bridge.model_name_plural()),
        description,
        schema,
        move |args| {
            let bridge = Arc::clone(&bridge);
            Box::pin(async move {
                let limit = args
                    .get("limit")
                    .and_then(Value::as_i64)
                    .unwrap_or(DEFAULT_LIST_LIMIT)
                    .max(0);
                let offset = args.get("offset").and_then(Value::as_i64).unwrap_or(0).max(0);
                let records = bridge.list(limit, offset).await?;
                Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
            })
        },
    );
    registry.register_tool(tool)
}

fn register_search_tool(
    registry: &mut ComponentRegistry,
    bridge: Arc<dyn ModelBridge>,
) -> Result<(), RegistryError> {
    let has_text_fields = bridge
        .fields()
        .iter()
        .any(|field| field.kind == FieldKind::Text);

    let schema = json!({
        "type": "object",
        "properties": {
            "query": {"type": "string", "description": "Search query"},
            "limit": {"type": "integer", "description": "Maximum number of records to return", "default": DEFAULT_LIST_LIMIT}
        },
        "required": ["query"]
    });

    let description = format!("Search for {}", bridge.verbose_name_plural());
    let tool = ToolRegistration::new(
        format!("search_{}", bridge.model_name_plural()),
        description,
        schema,
        move |args| {
            let bridge = Arc::clone(&bridge);
            Box::pin(async move {
                let Some(query) = args.get("query").and_then(Value::as_str) else {
                    return Ok(json!({"error": "Missing or non-string 'query' argument"}));
                };
                let query = query.to_string();
                // A model without text fields has nothing to search over.
                if !has_text_fields {
                    return Ok(Value::Array(Vec::new()));
                }
                let limit = args
                    .get("limit")
                    .and_then(Value::as_i64)
                    .unwrap_or(DEFAULT_LIST_LIMIT)
                    .max(0);
                let records = bridge.search(&query, limit).await?;
                Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
            })
        },
    );
    registry.register_tool(tool)
}

fn register_create_tool(
    registry: &mut ComponentRegistry,
    bridge: Arc<dyn ModelBridge>,
) -> Result<(), RegistryError> {
    let fields = bridge.fields();

    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for field in &fields {
        let type_name = match field.kind {
            FieldKind::Integer => "integer",
            FieldKind::Float => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Text | FieldKind::DateTime => "string",
        };
        properties.insert(field.name.clone(), json!({"type": type_name}));
        if field.required {
            required.push(Value::String(field.name.clone()));
        }
    }
    let schema = json!({
        "type": "object",
        "properties": properties,
        "required": required
    });

    let description = format!("Create a new {}", bridge.verbose_name());
    let tool = ToolRegistration::new(
        format!("create_{}", bridge.model_name()),
        description,
        schema,
        move |args| {
            let bridge = Arc::clone(&bridge);
            let fields = fields.clone();
            Box::pin(async move {
                let (accepted, errors) = validate_create_args(&fields, args);
                if !errors.is_empty() {
                    return Ok(json!({"success": false, "errors": errors}));
                }

                match bridge.create(accepted).await? {
                    CreateOutcome::Created(mut record) => {
                        record.insert("success".to_string(), Value::Bool(true));
                        Ok(Value::Object(record))
                    }
                    CreateOutcome::Invalid(errors) => {
                        Ok(json!({"success": false, "errors": errors}))
                    }
                }
            })
        },
    );
    registry.register_tool(tool)
}

/// Drop unknown keys and collect field-level validation messages.
fn validate_create_args(
    fields: &[FieldDescriptor],
    args: JsonObject,
) -> (JsonObject, BTreeMap<String, Vec<String>>) {
    let mut accepted = JsonObject::new();
    let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for field in fields {
        match args.get(&field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    errors
                        .entry(field.name.clone())
                        .or_default()
                        .push("This field is required.".to_string());
                }
            }
            Some(value) => {
                if field.kind == FieldKind::Text && !field.blank {
                    let blank = value.as_str().map(|s| s.trim().is_empty()).unwrap_or(false);
                    if blank {
                        errors
                            .entry(field.name.clone())
                            .or_default()
                            .push("This field cannot be blank.".to_string());
                        continue;
                    }
                }
                accepted.insert(field.name.clone(), value.clone());
            }
        }
    }

    (accepted, errors)
}

fn register_record_resource(
    registry: &mut ComponentRegistry,
    bridge: Arc<dyn ModelBridge>,
) -> Result<(), RegistryError> {
    let uri_template = format!("{}://{{id}}", bridge.app_label());
    let name = format!("{} detail", bridge.verbose_name());
    let description = format!(
        "Formatted view of a single {} including related records",
        bridge.verbose_name()
    );

    let resource = ResourceRegistration::new(uri_template, name, description, move |params| {
        let bridge = Arc::clone(&bridge);
        Box::pin(async move {
            let Some(id) = params.get("id").and_then(|raw| raw.parse::<i64>().ok()) else {
                return Ok("# Error\n\nResource identifier must be an integer.".to_string());
            };

            let Some(record) = bridge.get(id).await? else {
                return Ok(format!(
                    "# Not Found\n\nThe {} with id={id} does not exist.",
                    bridge.verbose_name()
                ));
            };

            let mut lines = vec![
                format!("# {}: {}", title_case(bridge.verbose_name()), id),
                String::new(),
                "## Attributes".to_string(),
                String::new(),
            ];
            for (field, value) in &record {
                lines.push(format!("- **{field}**: {}", display_value(value)));
            }

            for preview in bridge.related_preview(id, RELATED_PREVIEW_CAP).await? {
                lines.push(String::new());
                lines.push(format!("## {}", title_case(&preview.relation)));
                lines.push(String::new());
                for entry in preview.entries.iter().take(RELATED_PREVIEW_CAP) {
                    lines.push(format!("- {entry}"));
                }
                if preview.total > RELATED_PREVIEW_CAP {
                    lines.push(format!(
                        "- … and {} more",
                        preview.total - RELATED_PREVIEW_CAP
                    ));
                }
            }

            Ok(lines.join("\n"))
        })
    });
    registry.register_resource(resource)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
