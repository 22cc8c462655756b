use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Error as SerdeJsonError, Value};
use thiserror::Error;

/// Errors surfaced to the agent when a tool call fails.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments missing, mistyped or outside what the tool accepts.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The tool understood the call but could not complete it.
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// JSON arguments of a single tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInput {
    pub params: Value,
}

impl ToolInput {
    pub fn new(params: Value) -> Self {
        Self { params }
    }

    /// Deserialize the arguments into the tool's typed request.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> ToolResult<T> {
        serde_json::from_value(self.params.clone()).map_err(|e| ToolError::InvalidInput(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    /// Text handed back to the model.
    pub message: String,
    pub data: Option<Value>,
}

impl ToolOutput {
    pub fn success<T: Into<String>>(message: T) -> Self {
        Self { success: true, message: message.into(), data: None }
    }

    pub fn success_with_data<T: Into<String>>(message: T, data: Value) -> Self {
        Self { success: true, message: message.into(), data: Some(data) }
    }
}

/// A capability an agent can call: a name, a JSON Schema for its arguments and
/// an async invocation.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema object describing `ToolInput::params`.
    fn input_schema(&self) -> Value;

    /// # Errors
    ///
    /// `ToolError::InvalidInput` for bad arguments, `ToolError::ExecutionFailed`
    /// when the underlying operation fails.
    async fn invoke(&self, input: ToolInput) -> ToolResult<ToolOutput>;
}
