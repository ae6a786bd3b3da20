//! Tool definitions and schema helpers

use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

/// Name, description and input schema of a tool, as handed to an agent host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: JsonValue,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: JsonValue,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Helper functions for creating tool schemas
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Object schema from `(name, type, description, required)` tuples
    ///
    /// # Example
    /// ```
    /// use mnemo_core::tool::SchemaBuilder;
    ///
    /// let schema = SchemaBuilder::object_schema(&[
    ///     ("key", "string", "Memory key", true),
    ///     ("value", "string", "Content to save", true),
    /// ]);
    /// assert_eq!(schema["required"][1], "value");
    /// ```
    pub fn object_schema(properties: &[(&str, &str, &str, bool)]) -> JsonValue {
        let props: serde_json::Map<String, JsonValue> = properties
            .iter()
            .map(|(name, type_str, desc, _)| {
                (
                    name.to_string(),
                    json!({"type": type_str, "description": desc}),
                )
            })
            .collect();

        let required: Vec<&str> = properties
            .iter()
            .filter(|(_, _, _, required)| *required)
            .map(|(name, _, _, _)| *name)
            .collect();

        json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }
}
