// View controller - editor vs recycle bin, and the derived frame a UI renders
// Editing intents are rejected here while the recycle bin is shown

use chrono::TimeZone;
use tracing::debug;

use crate::autosave::{AutosaveCoordinator, EditOutcome};
use crate::markup::{self, Counters};
use crate::models::{Note, NoteId, SearchMatch, SortOrder, Theme, ViewMode};
use crate::store::{Deletion, NoteStore};

/// What a view operation did to the displayed pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Pane unchanged
    Stay,
    ToEditor,
    ToRecycleBin,
    /// Recycle bin re-rendered in place
    RefreshRecycleBin,
}

#[derive(Debug, Default)]
pub struct ViewController {
    mode: ViewMode,
}

impl ViewController {
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_recycle_bin(&self) -> bool {
        self.mode == ViewMode::RecycleBin
    }

    /// Show the bin. The editor goes inert, so the selection is dropped.
    pub fn open_recycle_bin(&mut self, store: &mut NoteStore) -> Transition {
        if self.is_recycle_bin() {
            return Transition::RefreshRecycleBin;
        }
        debug!("opening recycle bin");
        self.mode = ViewMode::RecycleBin;
        store.clear_selection();
        Transition::ToRecycleBin
    }

    /// Back to the editor, re-selecting a note if the selection no longer resolves
    pub fn show_editor(&mut self, store: &mut NoteStore) -> Transition {
        if !self.is_recycle_bin() {
            return Transition::Stay;
        }
        debug!("returning to editor");
        self.mode = ViewMode::Editor;
        store.repair_selection();
        Transition::ToEditor
    }

    /// Select a note from the side list. Works from either pane.
    pub fn select_note(&mut self, store: &mut NoteStore, id: NoteId) -> Transition {
        if store.find(id).is_none() {
            return Transition::Stay;
        }
        let transition = self.show_editor(store);
        store.select(id);
        transition
    }

    pub fn create_note(&mut self, store: &mut NoteStore) -> (Note, Transition) {
        let transition = self.show_editor(store);
        (store.create(true), transition)
    }

    /// Insert a note with initial content through the same path as `create_note`
    pub fn insert_note(&mut self, store: &mut NoteStore, title: String, content: String) -> (Note, Transition) {
        let transition = self.show_editor(store);
        (store.insert(title, content, true), transition)
    }

    /// Restore always lands in the editor with the restored note selected
    pub fn restore(&mut self, store: &mut NoteStore, id: NoteId) -> Option<Transition> {
        if !store.restore(id) {
            return None;
        }
        let transition = self.show_editor(store);
        store.select(id);
        Some(transition)
    }

    pub fn purge(&mut self, store: &mut NoteStore, id: NoteId, confirmed: bool) -> Option<Transition> {
        if !store.purge(id, confirmed) {
            return None;
        }
        Some(if self.is_recycle_bin() { Transition::RefreshRecycleBin } else { Transition::Stay })
    }

    pub fn toggle_pin(&self, store: &mut NoteStore, id: NoteId) -> bool {
        if self.is_recycle_bin() {
            debug!(id, "pin rejected while recycle bin is shown");
            return false;
        }
        store.toggle_pin(id)
    }

    pub fn delete_current(&self, store: &mut NoteStore) -> Option<Deletion> {
        if self.is_recycle_bin() {
            debug!("delete rejected while recycle bin is shown");
            return None;
        }
        store.delete_current()
    }

    /// Keystroke in the title or editor. Rejected with no note selected or in the bin.
    pub fn edit(
        &self,
        store: &NoteStore,
        autosave: &mut AutosaveCoordinator,
        title: &str,
        content: &str,
    ) -> Option<EditOutcome> {
        if self.is_recycle_bin() {
            return None;
        }
        let id = store.current_note()?.id;
        Some(autosave.on_edit(id, title, content))
    }
}

// ============================================
// FRAME
// ============================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: NoteId,
    pub title: String,
    pub pinned: bool,
    pub active: bool,
}

/// Side list contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteList {
    Items(Vec<ListItem>),
    /// Notes exist but none match the search
    NoMatches,
    /// No active notes at all
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorPane {
    pub note_id: NoteId,
    pub title: String,
    pub content: String,
    pub counters: Counters,
    pub last_saved: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinItem {
    pub id: NoteId,
    pub title: String,
    pub last_modified: i64,
}

/// Everything the presentation layer needs for one render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub view: ViewMode,
    pub theme: Theme,
    pub sort_order: SortOrder,
    pub search_query: String,
    pub deleted_count: usize,
    pub list: NoteList,
    /// None while the bin is shown or when nothing is selected
    pub editor: Option<EditorPane>,
    /// Deleted notes, newest first; only while the bin is shown
    pub recycle_bin: Option<Vec<BinItem>>,
}

pub fn frame(view: &ViewController, store: &NoteStore, target: SearchMatch, now: i64) -> Frame {
    let in_bin = view.is_recycle_bin();
    let current = store.current_note_id();

    let visible = store.visible_notes(target);
    let list = if visible.is_empty() {
        if store.notes().is_empty() { NoteList::Empty } else { NoteList::NoMatches }
    } else {
        NoteList::Items(
            visible
                .iter()
                .map(|n| ListItem {
                    id: n.id,
                    title: markup::list_title(n),
                    pinned: n.is_pinned,
                    active: !in_bin && Some(n.id) == current,
                })
                .collect(),
        )
    };

    let editor = if in_bin {
        None
    } else {
        store.current_note().map(|n| EditorPane {
            note_id: n.id,
            title: n.title.clone(),
            content: n.content.clone(),
            counters: markup::count(&n.content),
            last_saved: last_saved_label(n.last_modified, now),
        })
    };

    let recycle_bin = in_bin.then(|| {
        store
            .deleted_by_recency()
            .into_iter()
            .map(|n| BinItem { id: n.id, title: markup::bin_title(n), last_modified: n.last_modified })
            .collect()
    });

    Frame {
        view: view.mode(),
        theme: store.theme(),
        sort_order: store.sort_order(),
        search_query: store.search_query().to_string(),
        deleted_count: store.deleted_count(),
        list,
        editor,
        recycle_bin,
    }
}

/// Relative "last saved" text for the editor footer
pub fn last_saved_label(saved: i64, now: i64) -> String {
    let seconds = ((now - saved) as f64 / 1000.0).round() as i64;
    if seconds < 5 {
        return "Saved just now".to_string();
    }
    if seconds < 60 {
        return format!("Saved {seconds}s ago");
    }
    let minutes = (seconds as f64 / 60.0).round() as i64;
    if minutes < 60 {
        return format!("Saved {minutes}m ago");
    }
    match chrono::Local.timestamp_millis_opt(saved).single() {
        Some(time) => format!("Saved: {}", time.format("%H:%M")),
        None => String::new(),
    }
}
