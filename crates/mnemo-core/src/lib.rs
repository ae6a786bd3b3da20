//! mnemo-core: durable agent memory
//!
//! Provides the SQLite-backed [`MemoryStore`], configuration, the error
//! taxonomy and the tool system shared by the other mnemo crates.

pub mod config;
pub mod error;
pub mod memory;
pub mod tool;

pub use config::{Config, MemoryConfig, PdfConfig, WebSearchConfig};
pub use error::{Error, Result};
pub use memory::{DeleteOutcome, MemoryEntry, MemoryStore, MemorySummary, SaveOutcome, SearchHit};
pub use tool::{SchemaBuilder, Tool, ToolDefinition, ToolManager, ToolResult};
