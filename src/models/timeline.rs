//! Append-only message timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a timeline entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    /// The human operator.
    Human,
    /// The remote agent (including locally synthesized agent entries).
    Agent,
}

/// One rendered message in the conversation.
///
/// Entries are never mutated or removed once appended; insertion order is
/// the display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimelineEntry {
    /// Unique entry identifier.
    pub id: String,
    /// Who authored the entry.
    pub author: Author,
    /// Plain-text body.
    pub body: String,
    /// Local creation timestamp.
    pub timestamp: DateTime<Utc>,
}

impl TimelineEntry {
    /// Construct a new entry with a generated identifier and current time.
    #[must_use]
    pub fn new(author: Author, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            author,
            body: body.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only ordered sequence of timeline entries.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Append a new entry and return a reference to it.
    pub fn append(&mut self, author: Author, body: impl Into<String>) -> &TimelineEntry {
        self.entries.push(TimelineEntry::new(author, body));
        // Just pushed, so the slice is non-empty.
        &self.entries[self.entries.len() - 1]
    }

    /// All entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// The most recently appended entry, if any.
    #[must_use]
    pub fn last(&self) -> Option<&TimelineEntry> {
        self.entries.last()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the timeline has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
