//! Tool trait definition
//!
//! Defines the core trait for operations an agent can invoke by name
//! with JSON input.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::{Error, Result};

/// Tool execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Human-readable output
    pub output: String,
    /// Whether the execution resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: true,
        }
    }

    /// Error result naming the failed operation and its cause
    pub fn failure(operation: &str, err: &Error) -> Self {
        Self::error(format!("Error during {}: {}", operation, err))
    }
}

/// Agent-callable tool
///
/// Failures the caller should read (missing files, backend faults, storage
/// errors) come back as [`ToolResult::error`]; `Err` is reserved for input
/// the tool cannot interpret at all.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used to look the tool up and in its definition
    fn name(&self) -> &str;

    /// Description shown to the agent when it selects tools
    fn description(&self) -> &str;

    /// JSON schema of the tool's input
    fn input_schema(&self) -> JsonValue;

    /// Run the tool
    async fn execute(&self, input: JsonValue) -> Result<ToolResult>;
}
