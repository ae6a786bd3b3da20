//! Tool manager for registering and executing tools

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::Result;
use crate::tool::{Tool, ToolDefinition, ToolResult};

/// Registry of tools, keyed and iterated by name
pub struct ToolManager {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolManager {
    /// Create a new empty tool manager
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!(tool = tool.name(), "Registering tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Definitions of all registered tools, ordered by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect()
    }

    /// Execute a tool by name
    ///
    /// # Errors
    /// Returns [`Error::ToolExecution`](crate::Error::ToolExecution) if no tool
    /// has that name, or whatever the tool itself returns.
    pub async fn execute(&self, name: &str, input: JsonValue) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| {
            crate::Error::ToolExecution(format!("Unknown tool: {}", name))
        })?;
        tool.execute(input).await
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Names of all registered tools, in order
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn input_schema(&self) -> JsonValue {
            json!({"type": "object"})
        }

        async fn execute(&self, input: JsonValue) -> Result<ToolResult> {
            Ok(ToolResult::success(input.to_string()))
        }
    }

    #[test]
    fn test_register_and_names_sorted() {
        let mut manager = ToolManager::new();
        assert!(manager.is_empty());

        manager.register(Arc::new(EchoTool("search_memory")));
        manager.register(Arc::new(EchoTool("delete_memory")));
        manager.register(Arc::new(EchoTool("search_memory")));

        assert_eq!(manager.len(), 2);
        assert!(manager.contains("delete_memory"));
        assert_eq!(manager.tool_names(), vec!["delete_memory", "search_memory"]);
        assert_eq!(manager.definitions()[0].name, "delete_memory");
    }

    #[tokio::test]
    async fn test_execute() {
        let mut manager = ToolManager::new();
        manager.register(Arc::new(EchoTool("echo")));

        let result = manager.execute("echo", json!({"a": 1})).await.unwrap();
        assert!(!result.is_error);
        assert_eq!(result.output, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let manager = ToolManager::new();
        let result = manager.execute("missing", json!({})).await;
        assert!(matches!(result, Err(crate::Error::ToolExecution(_))));
    }
}
