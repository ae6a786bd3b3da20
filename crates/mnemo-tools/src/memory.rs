//! Memory tools: save, recall, list, delete and search over a [`MemoryStore`]
//!
//! Store calls are blocking SQLite work, so they run on tokio's blocking
//! pool. Every store error is turned into an error [`ToolResult`] naming
//! the operation; an absent key is an ordinary answer, not an error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mnemo_core::{
    DeleteOutcome, Error, MemoryEntry, MemoryStore, MemorySummary, Result, SaveOutcome,
    SchemaBuilder, SearchHit, Tool, ToolResult,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// All memory tools sharing one store
pub fn memory_tools(store: &MemoryStore) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(SaveMemoryTool::new(store.clone())),
        Arc::new(RecallMemoryTool::new(store.clone())),
        Arc::new(ListMemoriesTool::new(store.clone())),
        Arc::new(DeleteMemoryTool::new(store.clone())),
        Arc::new(SearchMemoryTool::new(store.clone())),
    ]
}

#[derive(Debug, Deserialize)]
struct KeyInput {
    key: String,
}

#[derive(Debug, Deserialize)]
struct SaveInput {
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    term: String,
}

fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T> {
    serde_json::from_value(input)
        .map_err(|e| Error::ToolExecution(format!("Invalid input parameters: {}", e)))
}

/// Run a store operation on the blocking pool
async fn run_store<T, F>(store: &MemoryStore, op: F) -> Result<T>
where
    F: FnOnce(&MemoryStore) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| Error::ToolExecution(format!("Memory task failed: {}", e)))?
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn format_saved(key: &str, outcome: &SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Created(_) => format!("✓ Memory '{}' saved successfully.", key),
        SaveOutcome::Updated(_) => format!("✓ Memory '{}' updated successfully.", key),
    }
}

fn not_found(key: &str) -> String {
    format!("No memory found for '{}'.", key)
}

fn format_entry(entry: &MemoryEntry) -> String {
    let mut output = format!(
        "[Memory: {}]\nStored: {}\n",
        entry.key,
        format_timestamp(&entry.created_at)
    );
    if entry.was_updated() {
        output.push_str(&format!("Updated: {}\n", format_timestamp(&entry.updated_at)));
    }
    output.push('\n');
    output.push_str(&entry.value);
    output
}

fn format_list(summaries: &[MemorySummary]) -> String {
    if summaries.is_empty() {
        return "Memory is empty.".to_string();
    }

    let mut output = format!("Stored memories ({}):\n\n", summaries.len());
    for summary in summaries {
        if summary.was_updated() {
            output.push_str(&format!(
                "• {} (saved: {}, updated: {})\n",
                summary.key,
                format_timestamp(&summary.created_at),
                format_timestamp(&summary.updated_at)
            ));
        } else {
            output.push_str(&format!(
                "• {} (saved: {})\n",
                summary.key,
                format_timestamp(&summary.created_at)
            ));
        }
    }
    output
}

fn format_hits(term: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No memories matching '{}'.", term);
    }

    let mut output = format!("Found {} memories matching '{}':\n\n", hits.len(), term);
    for hit in hits {
        output.push_str(&format!(
            "• {} (updated: {})\n  {}\n",
            hit.key,
            format_timestamp(&hit.updated_at),
            hit.preview.replace('\n', " ")
        ));
    }
    output
}

/// Save or overwrite a memory
pub struct SaveMemoryTool {
    store: MemoryStore,
}

impl SaveMemoryTool {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SaveMemoryTool {
    fn name(&self) -> &str {
        "save_memory"
    }

    fn description(&self) -> &str {
        "Save information to persistent memory under a key. Saving an existing key overwrites its value."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(&[
            ("key", "string", "Memory key/name", true),
            ("value", "string", "Content to save", true),
        ])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let SaveInput { key, value } = parse_input(input)?;
        tracing::info!(key = %key, bytes = value.len(), "Saving memory");

        let store_key = key.clone();
        match run_store(&self.store, move |s| s.save(&store_key, &value)).await {
            Ok(outcome) => Ok(ToolResult::success(format_saved(&key, &outcome))),
            Err(e) => Ok(ToolResult::failure("save", &e)),
        }
    }
}

/// Retrieve a memory by key
pub struct RecallMemoryTool {
    store: MemoryStore,
}

impl RecallMemoryTool {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RecallMemoryTool {
    fn name(&self) -> &str {
        "recall_memory"
    }

    fn description(&self) -> &str {
        "Retrieve information from persistent memory by key."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(&[("key", "string", "Memory key to retrieve", true)])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let KeyInput { key } = parse_input(input)?;
        tracing::debug!(key = %key, "Recalling memory");

        let store_key = key.clone();
        match run_store(&self.store, move |s| s.recall(&store_key)).await {
            Ok(Some(entry)) => Ok(ToolResult::success(format_entry(&entry))),
            Ok(None) => Ok(ToolResult::success(not_found(&key))),
            Err(e) => Ok(ToolResult::failure("recall", &e)),
        }
    }
}

/// List all memory keys
pub struct ListMemoriesTool {
    store: MemoryStore,
}

impl ListMemoriesTool {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListMemoriesTool {
    fn name(&self) -> &str {
        "list_memories"
    }

    fn description(&self) -> &str {
        "List all keys stored in persistent memory, in alphabetical order."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(&[])
    }

    async fn execute(&self, _input: Value) -> Result<ToolResult> {
        match run_store(&self.store, |s| s.list()).await {
            Ok(summaries) => Ok(ToolResult::success(format_list(&summaries))),
            Err(e) => Ok(ToolResult::failure("list", &e)),
        }
    }
}

/// Delete a memory by key
pub struct DeleteMemoryTool {
    store: MemoryStore,
}

impl DeleteMemoryTool {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for DeleteMemoryTool {
    fn name(&self) -> &str {
        "delete_memory"
    }

    fn description(&self) -> &str {
        "Delete a memory entry permanently."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(&[("key", "string", "Memory key to delete", true)])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let KeyInput { key } = parse_input(input)?;
        tracing::info!(key = %key, "Deleting memory");

        let store_key = key.clone();
        match run_store(&self.store, move |s| s.delete(&store_key)).await {
            Ok(DeleteOutcome::Deleted) => Ok(ToolResult::success(format!(
                "✓ Memory '{}' deleted successfully.",
                key
            ))),
            Ok(DeleteOutcome::NotFound) => Ok(ToolResult::success(not_found(&key))),
            Err(e) => Ok(ToolResult::failure("delete", &e)),
        }
    }
}

/// Substring search over keys and values
pub struct SearchMemoryTool {
    store: MemoryStore,
}

impl SearchMemoryTool {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SearchMemoryTool {
    fn name(&self) -> &str {
        "search_memory"
    }

    fn description(&self) -> &str {
        "Search memory keys and values for a piece of text. Matching ignores case for ASCII letters only. Most recently updated entries come first."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(&[("term", "string", "Text to look for", true)])
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let SearchInput { term } = parse_input(input)?;
        tracing::debug!(term = %term, "Searching memory");

        let store_term = term.clone();
        match run_store(&self.store, move |s| s.search(&store_term)).await {
            Ok(hits) => Ok(ToolResult::success(format_hits(&term, &hits))),
            Err(e) => Ok(ToolResult::failure("search", &e)),
        }
    }
}
