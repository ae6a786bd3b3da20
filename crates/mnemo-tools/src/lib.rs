//! mnemo-tools: agent-facing tools for mnemo
//!
//! The memory tools wrap a shared [`MemoryStore`]; `read_pdf` and
//! `web_search` are stateless wrappers over pdf-extract and the search APIs.

use mnemo_core::{Config, MemoryStore, ToolManager};

pub mod memory;
pub mod read_pdf;
pub mod web_search;

pub use memory::{
    DeleteMemoryTool, ListMemoriesTool, RecallMemoryTool, SaveMemoryTool, SearchMemoryTool,
    memory_tools,
};
pub use read_pdf::ReadPdfTool;
pub use web_search::WebSearchTool;

use std::sync::Arc;

/// Register the memory, PDF and web search tools with the tool manager
pub fn register_default_tools(manager: &mut ToolManager, store: &MemoryStore, config: &Config) {
    for tool in memory_tools(store) {
        manager.register(tool);
    }
    manager.register(Arc::new(ReadPdfTool::new(&config.pdf)));
    manager.register(Arc::new(WebSearchTool::new(&config.web_search)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_register_default_tools() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::open(dir.path().join("registry.db")).unwrap();
        let mut manager = ToolManager::new();
        register_default_tools(&mut manager, &store, &Config::default());

        assert_eq!(
            manager.tool_names(),
            vec![
                "delete_memory",
                "list_memories",
                "read_pdf",
                "recall_memory",
                "save_memory",
                "search_memory",
                "web_search"
            ]
        );

        let result = manager
            .execute("save_memory", json!({"key": "k", "value": "v"}))
            .await
            .unwrap();
        assert!(!result.is_error);
        assert_eq!(store.recall("k").unwrap().unwrap().value, "v");
    }
}
