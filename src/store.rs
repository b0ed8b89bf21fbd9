// Note store - sole owner of the active and deleted collections and the selection
// Every mutation re-derives the active order and hands a full snapshot to the sink

use std::sync::Arc;

use tracing::debug;

use crate::clock::{Clock, IdGenerator};
use crate::filter;
use crate::models::{Note, NoteId, SearchMatch, Snapshot, SortOrder, Theme};
use crate::ordering;
use crate::storage::SnapshotSink;

/// What `delete_current` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// The only active note was cleared in place
    Reset(NoteId),
    /// The note moved to the deleted collection; selection moved to its neighbour
    Trashed { id: NoteId, selected: Option<NoteId> },
}

pub struct NoteStore {
    notes: Vec<Note>,   // Always in derived order
    deleted: Vec<Note>, // Most recently deleted first
    current: Option<NoteId>,
    query: String,
    sort_order: SortOrder,
    theme: Theme,
    ids: IdGenerator,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn SnapshotSink>,
}

impl NoteStore {
    pub fn new(clock: Arc<dyn Clock>, sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            notes: Vec::new(),
            deleted: Vec::new(),
            current: None,
            query: String::new(),
            sort_order: SortOrder::default(),
            theme: Theme::default(),
            ids: IdGenerator::default(),
            clock,
            sink,
        }
    }

    // ============================================
    // READ ACCESS
    // ============================================

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn deleted_notes(&self) -> &[Note] {
        &self.deleted
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Deleted notes newest first, independent of the active sort mode
    pub fn deleted_by_recency(&self) -> Vec<&Note> {
        let mut deleted: Vec<&Note> = self.deleted.iter().collect();
        deleted.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        deleted
    }

    pub fn current_note_id(&self) -> Option<NoteId> {
        self.current
    }

    /// The selected note, if the selection resolves in the active collection
    pub fn current_note(&self) -> Option<&Note> {
        self.current.and_then(|id| self.find(id))
    }

    pub fn find(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn find_deleted(&self, id: NoteId) -> Option<&Note> {
        self.deleted.iter().find(|n| n.id == id)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn search_query(&self) -> &str {
        &self.query
    }

    /// Active notes passing the current search query, in display order
    pub fn visible_notes(&self, target: SearchMatch) -> Vec<&Note> {
        filter::filter(&self.notes, &self.query, target)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            notes: self.notes.clone(),
            deleted_notes: self.deleted.clone(),
            sort_order: self.sort_order,
            theme: self.theme,
        }
    }

    // ============================================
    // LIFECYCLE
    // ============================================

    /// Hydrate from a persisted snapshot. Seeds one empty note when nothing exists.
    pub fn load(&mut self, snapshot: Snapshot) {
        self.notes = snapshot.notes;
        self.deleted = snapshot.deleted_notes;
        self.sort_order = snapshot.sort_order;
        self.theme = snapshot.theme;
        for note in self.notes.iter().chain(self.deleted.iter()) {
            self.ids.observe(note.id);
        }
        debug!(
            active = self.notes.len(),
            deleted = self.deleted.len(),
            sort = self.sort_order.as_str(),
            "loaded snapshot"
        );

        if self.notes.is_empty() && self.deleted.is_empty() {
            self.create(false);
        } else {
            self.resort();
            self.repair_selection();
        }
    }

    /// New empty note at the head of the list, selected, with the search cleared
    pub fn create(&mut self, should_persist: bool) -> Note {
        self.insert(String::new(), String::new(), should_persist)
    }

    /// Shared insertion path for new notes (blank or with initial content)
    pub fn insert(&mut self, title: String, content: String, should_persist: bool) -> Note {
        let now = self.clock.now();
        let mut note = Note::new(self.ids.next(now), now);
        note.title = title;
        note.content = content;
        debug!(id = note.id, "creating note");

        self.notes.insert(0, note.clone());
        self.current = Some(note.id);
        self.query.clear();
        self.resort();
        if should_persist {
            self.persist();
        }
        note
    }

    /// Soft-delete the selected note. The last active note is reset instead of removed.
    pub fn delete_current(&mut self) -> Option<Deletion> {
        let id = self.current?;
        let index = self.notes.iter().position(|n| n.id == id)?;
        let now = self.clock.now();

        let deletion = if self.notes.len() == 1 {
            debug!(id, "resetting last active note instead of deleting");
            self.notes[0].reset(now);
            Deletion::Reset(id)
        } else {
            let mut note = self.notes.remove(index);
            note.touch(now);
            self.deleted.insert(0, note);
            let selected = self.notes.get(index.saturating_sub(1)).map(|n| n.id);
            self.current = selected;
            debug!(id, ?selected, "moved note to recycle bin");
            Deletion::Trashed { id, selected }
        };

        self.resort();
        self.persist();
        Some(deletion)
    }

    /// Move a deleted note back to the active collection and select it
    pub fn restore(&mut self, id: NoteId) -> bool {
        let Some(index) = self.deleted.iter().position(|n| n.id == id) else {
            debug!(id, "restore ignored: not in recycle bin");
            return false;
        };
        let mut note = self.deleted.remove(index);
        note.touch(self.clock.now());
        self.notes.insert(0, note);
        self.current = Some(id);
        debug!(id, "restored note");

        self.resort();
        self.persist();
        true
    }

    /// Permanently remove a deleted note. Does nothing unless `confirmed`.
    pub fn purge(&mut self, id: NoteId, confirmed: bool) -> bool {
        if !confirmed {
            debug!(id, "purge declined");
            return false;
        }
        let before = self.deleted.len();
        self.deleted.retain(|n| n.id != id);
        if self.deleted.len() == before {
            debug!(id, "purge ignored: not in recycle bin");
            return false;
        }
        debug!(id, "purged note");
        self.persist();
        true
    }

    pub fn toggle_pin(&mut self, id: NoteId) -> bool {
        let now = self.clock.now();
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            debug!(id, "pin ignored: not an active note");
            return false;
        };
        note.is_pinned = !note.is_pinned;
        note.touch(now);
        debug!(id, pinned = note.is_pinned, "toggled pin");

        self.resort();
        self.persist();
        true
    }

    /// Apply title and content if either differs. Unchanged input writes nothing.
    pub fn update_title_and_content(&mut self, id: NoteId, title: &str, content: &str) -> bool {
        let now = self.clock.now();
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            debug!(id, "update ignored: not an active note");
            return false;
        };
        if note.title == title && note.content == content {
            return false;
        }
        note.title = title.to_string();
        note.content = content.to_string();
        note.touch(now);
        debug!(id, "saved note edits");

        self.resort();
        self.persist();
        true
    }

    // ============================================
    // SELECTION, SEARCH, PREFERENCES
    // ============================================

    /// Select an active note. Ids outside the active collection are ignored.
    pub fn select(&mut self, id: NoteId) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.current = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.current = None;
    }

    /// Point the selection at the first note in display order if it no longer resolves
    pub fn repair_selection(&mut self) {
        if self.current_note().is_none() {
            self.current = self.notes.first().map(|n| n.id);
        }
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        debug!(sort = sort_order.as_str(), "sort order changed");
        self.sort_order = sort_order;
        self.resort();
        self.persist();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.persist();
    }

    // ============================================
    // INTERNALS
    // ============================================

    fn resort(&mut self) {
        ordering::sort(&mut self.notes, self.sort_order);
    }

    fn persist(&self) {
        self.sink.persist(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::RecordingSink;
    use std::collections::HashSet;

    fn store() -> (NoteStore, ManualClock, Arc<RecordingSink>) {
        let clock = ManualClock::at(1_000);
        let sink = Arc::new(RecordingSink::default());
        let store = NoteStore::new(Arc::new(clock.clone()), sink.clone());
        (store, clock, sink)
    }

    fn note(id: i64, title: &str, pinned: bool, last_modified: i64) -> Note {
        Note { id, title: title.into(), content: String::new(), is_pinned: pinned, last_modified }
    }

    fn active_ids(store: &NoteStore) -> Vec<i64> {
        store.notes().iter().map(|n| n.id).collect()
    }

    /// Active notes 1, 2, 3 in date-desc order
    fn three_notes() -> (NoteStore, ManualClock, Arc<RecordingSink>) {
        let (mut store, clock, sink) = store();
        store.load(Snapshot {
            notes: vec![note(3, "C", false, 100), note(1, "A", false, 300), note(2, "B", false, 200)],
            ..Snapshot::default()
        });
        (store, clock, sink)
    }

    #[test]
    fn test_load_empty_seeds_one_note_without_persisting() {
        let (mut store, _, sink) = store();
        store.load(Snapshot::default());
        assert_eq!(store.notes().len(), 1);
        assert!(store.deleted_notes().is_empty());
        assert_eq!(store.current_note_id(), Some(store.notes()[0].id));
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_load_sorts_and_selects_first() {
        let (store, _, _) = three_notes();
        assert_eq!(active_ids(&store), vec![1, 2, 3]);
        assert_eq!(store.current_note_id(), Some(1));
    }

    #[test]
    fn test_load_with_only_deleted_leaves_selection_empty() {
        let (mut store, _, _) = store();
        store.load(Snapshot { deleted_notes: vec![note(9, "gone", false, 1)], ..Snapshot::default() });
        assert!(store.notes().is_empty());
        assert_eq!(store.current_note_id(), None);
    }

    #[test]
    fn test_create_prepends_selects_and_clears_search() {
        let (mut store, clock, sink) = three_notes();
        store.set_search_query("zzz");
        clock.advance(10);
        let created = store.create(true);
        assert_eq!(store.notes()[0].id, created.id);
        assert_eq!(store.current_note_id(), Some(created.id));
        assert_eq!(store.search_query(), "");
        assert!(created.title.is_empty() && !created.is_pinned);
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn test_ids_unique_when_created_in_same_millisecond() {
        let (mut store, _, _) = store();
        store.load(Snapshot::default());
        let a = store.create(true).id;
        let b = store.create(true).id;
        assert_ne!(a, b);
    }

    #[test]
    fn test_delete_middle_selects_predecessor() {
        let (mut store, _, _) = three_notes();
        store.select(2);
        let deletion = store.delete_current();
        assert_eq!(deletion, Some(Deletion::Trashed { id: 2, selected: Some(1) }));
        assert_eq!(active_ids(&store), vec![1, 3]);
        assert_eq!(store.current_note_id(), Some(1));
        assert_eq!(store.deleted_notes()[0].id, 2);
    }

    #[test]
    fn test_delete_first_clamps_to_head() {
        let (mut store, _, _) = three_notes();
        store.select(1);
        store.delete_current();
        assert_eq!(store.current_note_id(), Some(2));
    }

    #[test]
    fn test_delete_last_remaining_note_resets_in_place() {
        let (mut store, clock, _) = store();
        store.load(Snapshot { notes: vec![Note { content: "body".into(), ..note(1, "T", true, 5) }], ..Snapshot::default() });
        clock.advance(50);
        assert_eq!(store.delete_current(), Some(Deletion::Reset(1)));
        let only = &store.notes()[0];
        assert_eq!(store.notes().len(), 1);
        assert_eq!((only.title.as_str(), only.content.as_str(), only.is_pinned), ("", "", false));
        assert_eq!(only.last_modified, 1_050);
        assert!(store.deleted_notes().is_empty());
    }

    #[test]
    fn test_delete_without_selection_is_noop() {
        let (mut store, _, sink) = three_notes();
        store.clear_selection();
        assert_eq!(store.delete_current(), None);
        assert_eq!(store.notes().len(), 3);
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_delete_then_restore_round_trip() {
        let (mut store, clock, _) = three_notes();
        store.select(3);
        clock.advance(10);
        store.delete_current();
        let deleted_at = store.find_deleted(3).unwrap().last_modified;
        clock.advance(10);
        assert!(store.restore(3));
        let restored = store.find(3).unwrap();
        assert!(restored.last_modified > deleted_at);
        assert!(store.find_deleted(3).is_none());
        assert_eq!(store.current_note_id(), Some(3));
        // Newest timestamp, so it leads in date-desc
        assert_eq!(active_ids(&store)[0], 3);
    }

    #[test]
    fn test_restore_unknown_is_noop() {
        let (mut store, _, sink) = three_notes();
        assert!(!store.restore(42));
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_purge_requires_confirmation() {
        let (mut store, _, _) = three_notes();
        store.select(2);
        store.delete_current();
        assert!(!store.purge(2, false));
        assert_eq!(store.deleted_count(), 1);
        assert!(store.purge(2, true));
        assert_eq!(store.deleted_count(), 0);
        assert!(store.find(2).is_none());
        assert!(!store.purge(2, true));
    }

    #[test]
    fn test_toggle_pin_reorders_and_ignores_stale_ids() {
        let (mut store, clock, _) = three_notes();
        clock.set(50);
        assert!(store.toggle_pin(3));
        assert_eq!(active_ids(&store), vec![3, 1, 2]);
        assert!(store.find(3).unwrap().is_pinned);
        assert!(!store.toggle_pin(77));
    }

    #[test]
    fn test_update_unchanged_writes_nothing() {
        let (mut store, clock, sink) = three_notes();
        clock.advance(100);
        assert!(!store.update_title_and_content(1, "A", ""));
        assert_eq!(store.find(1).unwrap().last_modified, 300);
        assert_eq!(sink.count(), 0);

        assert!(store.update_title_and_content(1, "A2", ""));
        assert_eq!(store.find(1).unwrap().last_modified, 1_100);
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn test_sort_order_change_persists() {
        let (mut store, _, sink) = three_notes();
        store.set_sort_order(SortOrder::DateAsc);
        assert_eq!(active_ids(&store), vec![3, 2, 1]);
        assert_eq!(sink.last().unwrap().sort_order, SortOrder::DateAsc);
    }

    #[test]
    fn test_deleted_by_recency() {
        let (mut store, _, _) = store();
        store.load(Snapshot {
            notes: vec![note(1, "", false, 0)],
            deleted_notes: vec![note(5, "", false, 10), note(6, "", false, 30), note(7, "", false, 20)],
            ..Snapshot::default()
        });
        let order: Vec<i64> = store.deleted_by_recency().iter().map(|n| n.id).collect();
        assert_eq!(order, vec![6, 7, 5]);
    }

    #[test]
    fn test_ids_stay_unique_across_collections() {
        let (mut store, _, _) = three_notes();
        for _ in 0..5 {
            store.create(true);
            store.delete_current();
        }
        let all: Vec<i64> = store.notes().iter().chain(store.deleted_notes()).map(|n| n.id).collect();
        let unique: HashSet<i64> = all.iter().copied().collect();
        assert_eq!(all.len(), unique.len());
    }
}
