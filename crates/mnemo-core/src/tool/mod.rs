//! Tool system
//!
//! Tools are the agent-facing surface: each takes JSON input and returns a
//! human-readable [`ToolResult`].

pub mod definition;
pub mod manager;
pub mod traits;

pub use definition::{SchemaBuilder, ToolDefinition};
pub use manager::ToolManager;
pub use traits::{Tool, ToolResult};
