//! Memory type definitions for mnemo-core

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters kept in a search preview
pub const PREVIEW_CHARS: usize = 100;

/// A memory entry stored in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Unique key of the entry
    pub key: String,
    /// The stored text
    pub value: String,
    /// When the key was first saved
    pub created_at: DateTime<Utc>,
    /// When the key was last saved
    pub updated_at: DateTime<Utc>,
}

impl MemoryEntry {
    /// Whether `updated_at` moved past `created_at`
    pub fn was_updated(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// Key and timestamps of an entry, as returned by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemorySummary {
    pub fn was_updated(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// A search match with a bounded preview of its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub key: String,
    /// First [`PREVIEW_CHARS`] characters of the value, `...` appended when cut
    pub preview: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The key did not exist before
    Created(MemoryEntry),
    /// An existing key was overwritten
    Updated(MemoryEntry),
}

impl SaveOutcome {
    /// The entry as stored after the save
    pub fn entry(&self) -> &MemoryEntry {
        match self {
            Self::Created(entry) | Self::Updated(entry) => entry,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Truncate `value` to at most `max_chars` characters, appending `...` when cut
pub fn preview(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &value[..byte_idx]),
        None => value.to_string(),
    }
}

/// Encode a timestamp for storage
///
/// Fixed nanosecond precision keeps the strings the same width, so comparing
/// them as text orders them chronologically.
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Decode a stored timestamp
pub(crate) fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}
