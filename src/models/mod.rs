// Models module for notebin
// On-disk/persisted field names use camelCase to match the extension's storage layout

pub mod common;
pub mod config;
pub mod note;
pub mod snapshot;

pub use common::{SortOrder, Theme, ViewMode};
pub use config::{SearchMatch, Settings};
pub use note::{Note, NoteId, UNTITLED};
pub use snapshot::{Snapshot, SNAPSHOT_KEYS};
