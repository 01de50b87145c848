use thiserror::Error;

/// Errors raised while populating the component registry.
///
/// Duplicate registration is rejected rather than overwritten: a second tool
/// under an existing name is a configuration bug in the contributing app, and
/// rejecting it keeps the conflict visible in the discovery report.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Resource already registered: {0}")]
    DuplicateResource(String),

    #[error("Prompt already registered: {0}")]
    DuplicatePrompt(String),
}

/// Errors raised by bridge adapters while touching application data.
///
/// Bridge-generated tools convert expected conditions (missing record,
/// validation failure) into structured payloads before an error ever
/// surfaces; `BridgeError` covers the unexpected remainder.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error types for MCP protocol dispatch.
///
/// All variants convert into [`rmcp::ErrorData`] with an appropriate MCP
/// error code via the `From` implementation below, so handlers can use `?`
/// freely inside the protocol methods.
#[derive(Debug, Error)]
pub enum McpServiceError {
    /// Requested tool is not in the registry. Maps to METHOD_NOT_FOUND.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// No resource template matches the requested URI. Maps to
    /// METHOD_NOT_FOUND.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Requested prompt is not in the registry. Maps to METHOD_NOT_FOUND.
    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    /// Arguments failed to parse against the handler's expectations. Maps to
    /// INVALID_PARAMS.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A bridge adapter failed underneath a live call. Maps to
    /// INTERNAL_ERROR.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Catch-all for unexpected failures. Maps to INTERNAL_ERROR.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for McpServiceError {
    fn from(err: anyhow::Error) -> Self {
        McpServiceError::Internal(err.to_string())
    }
}

/// Convert McpServiceError to rmcp::ErrorData for MCP protocol responses.
///
/// | Variant          | MCP Error Code   |
/// |------------------|------------------|
/// | ToolNotFound     | METHOD_NOT_FOUND |
/// | ResourceNotFound | METHOD_NOT_FOUND |
/// | PromptNotFound   | METHOD_NOT_FOUND |
/// | InvalidArguments | INVALID_PARAMS   |
/// | Bridge           | INTERNAL_ERROR   |
/// | Internal         | INTERNAL_ERROR   |
impl From<McpServiceError> for rmcp::ErrorData {
    fn from(err: McpServiceError) -> Self {
        use rmcp::model::{ErrorCode, ErrorData};

        let (code, message) = match err {
            McpServiceError::ToolNotFound(msg) => (ErrorCode::METHOD_NOT_FOUND, msg),
            McpServiceError::ResourceNotFound(msg) => (ErrorCode::METHOD_NOT_FOUND, msg),
            McpServiceError::PromptNotFound(msg) => (ErrorCode::METHOD_NOT_FOUND, msg),
            McpServiceError::InvalidArguments(msg) => (ErrorCode::INVALID_PARAMS, msg),
            McpServiceError::Bridge(e) => (ErrorCode::INTERNAL_ERROR, e.to_string()),
            McpServiceError::Internal(msg) => (ErrorCode::INTERNAL_ERROR, msg),
        };

        ErrorData {
            code,
            message: message.into(),
            data: None,
        }
    }
}
