// Note model
// Integer id (creation timestamp, made unique by the id generator), pin flag for ordering

use serde::{Deserialize, Serialize};

pub type NoteId = i64;

pub const UNTITLED: &str = "Untitled Note";

/// A single note as held in the active or deleted collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String, // Rich-text markup
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub last_modified: i64,
}

impl Note {
    pub fn new(id: NoteId, now: i64) -> Self {
        Self {
            id,
            title: String::new(),
            content: String::new(),
            is_pinned: false,
            last_modified: now,
        }
    }

    /// Clear title, content and pin in place (used when the last active note is deleted)
    pub fn reset(&mut self, now: i64) {
        self.title.clear();
        self.content.clear();
        self.is_pinned = false;
        self.last_modified = now;
    }

    pub fn touch(&mut self, now: i64) {
        self.last_modified = now;
    }
}
