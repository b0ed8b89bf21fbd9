//! Autosave coordinator.
//!
//! Keystroke-level edits arm a debounce timer; once input has been quiet for
//! the configured interval the timer reports the edit back to the session as
//! [`SessionEvent::AutosaveDue`], which commits it to the store. The target
//! note id is captured when the edit happens, so a flush that fires after the
//! selection moved still lands on the note that was edited.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::markup::{self, Counters};
use crate::models::NoteId;
use crate::session::SessionEvent;

/// An edit waiting for the debounce interval to elapse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub note_id: NoteId,
    pub title: String,
    pub content: String,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    Pending,
}

/// Result of registering one edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Live counters for the edited content
    pub counters: Counters,
    /// Pending edit for a different note that this edit displaced; commit it now
    pub superseded: Option<PendingEdit>,
}

pub struct AutosaveCoordinator {
    debounce: Duration,
    events: mpsc::UnboundedSender<SessionEvent>,
    pending: Option<(PendingEdit, CancellationToken)>,
    generation: u64,
}

impl AutosaveCoordinator {
    pub fn new(debounce: Duration, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { debounce, events, pending: None, generation: 0 }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn state(&self) -> AutosaveState {
        if self.pending.is_some() { AutosaveState::Pending } else { AutosaveState::Idle }
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        self.pending.as_ref().map(|(edit, _)| edit)
    }

    /// Register an edit to `note_id` and (re)arm the timer. Must be called from within a tokio runtime.
    pub fn on_edit(&mut self, note_id: NoteId, title: &str, content: &str) -> EditOutcome {
        let counters = markup::count(content);

        let superseded = match self.pending.take() {
            Some((previous, token)) => {
                token.cancel();
                (previous.note_id != note_id).then_some(previous)
            }
            None => None,
        };
        if let Some(previous) = &superseded {
            debug!(from = previous.note_id, to = note_id, "edit stream switched notes, flushing previous edit");
        }

        self.generation += 1;
        let edit = PendingEdit {
            note_id,
            title: title.to_string(),
            content: content.to_string(),
            generation: self.generation,
        };
        let token = self.arm(edit.clone());
        self.pending = Some((edit, token));

        EditOutcome { counters, superseded }
    }

    fn arm(&self, edit: PendingEdit) -> CancellationToken {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let events = self.events.clone();
        let delay = self.debounce;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = events.send(SessionEvent::AutosaveDue(edit));
                }
            }
        });
        token
    }

    /// Accept a fired timer. Returns the edit to commit, or `None` if a newer edit replaced it.
    pub fn take_due(&mut self, fired: PendingEdit) -> Option<PendingEdit> {
        match &self.pending {
            Some((current, _)) if current.generation == fired.generation => {
                self.pending = None;
                Some(fired)
            }
            _ => {
                debug!(note_id = fired.note_id, "ignoring superseded autosave timer");
                None
            }
        }
    }

    /// Cancel the timer and hand back the pending edit for immediate commit
    pub fn flush_now(&mut self) -> Option<PendingEdit> {
        let (edit, token) = self.pending.take()?;
        token.cancel();
        Some(edit)
    }
}

impl Drop for AutosaveCoordinator {
    fn drop(&mut self) {
        if let Some((_, token)) = &self.pending {
            token.cancel();
        }
    }
}
