//! Memory system for mnemo-core
//!
//! Durable key-value memory backed by a single SQLite file: atomic upsert,
//! point lookup, sorted listing, deletion and substring search.

mod store;
mod types;

pub use store::MemoryStore;
pub use types::{
    DeleteOutcome, MemoryEntry, MemorySummary, PREVIEW_CHARS, SaveOutcome, SearchHit, preview,
};
