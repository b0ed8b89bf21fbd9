// Commands module - intent dispatch table
// The UI layer translates input events into `Intent`s; each maps onto store/view operations

pub mod export;
pub mod screenshot;

use tracing::debug;

use crate::markup::Counters;
use crate::models::{NoteId, SortOrder};
use crate::session::Session;
use crate::view::Transition;

pub use export::ExportedFile;
pub use screenshot::{ClipboardWriter, ScreenCapture};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient, non-blocking message for the user (a toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// User intents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateNote,
    DeleteCurrent,
    SelectNote(NoteId),
    TogglePin(NoteId),
    /// Keystroke in the title or editor; carries the full current values
    Edit { title: String, content: String },
    Search(String),
    SetSortOrder(SortOrder),
    OpenRecycleBin,
    ShowEditor,
    Restore(NoteId),
    /// `confirmed` is the caller's answer to the "cannot be undone" prompt
    Purge { id: NoteId, confirmed: bool },
    CycleTheme,
    Export,
}

/// What dispatching an intent produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// False when the intent was a no-op (stale id, rejected in the bin, declined, ...)
    pub applied: bool,
    pub transition: Option<Transition>,
    pub notice: Option<Notice>,
    pub counters: Option<Counters>,
    pub export: Option<ExportedFile>,
}

impl Outcome {
    fn applied() -> Self {
        Self { applied: true, ..Self::default() }
    }

    fn ignored() -> Self {
        Self::default()
    }

    fn from_flag(applied: bool) -> Self {
        Self { applied, ..Self::default() }
    }

    fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }
}

impl Session {
    /// Route one intent to the store. Must be called from within a tokio runtime (edits arm a timer).
    pub fn dispatch(&mut self, intent: Intent) -> Outcome {
        debug!(?intent, "dispatch");
        match intent {
            Intent::CreateNote => {
                let (_, transition) = self.view.create_note(&mut self.store);
                Outcome::applied().with_transition(transition)
            }
            Intent::DeleteCurrent => {
                Outcome::from_flag(self.view.delete_current(&mut self.store).is_some())
            }
            Intent::SelectNote(id) => {
                let transition = self.view.select_note(&mut self.store, id);
                Outcome::from_flag(self.store.current_note_id() == Some(id)).with_transition(transition)
            }
            Intent::TogglePin(id) => Outcome::from_flag(self.view.toggle_pin(&mut self.store, id)),
            Intent::Edit { title, content } => {
                let Some(outcome) = self.view.edit(&self.store, &mut self.autosave, &title, &content) else {
                    return Outcome::ignored();
                };
                if let Some(previous) = &outcome.superseded {
                    self.commit_edit(previous);
                }
                Outcome { counters: Some(outcome.counters), ..Outcome::applied() }
            }
            Intent::Search(query) => {
                self.store.set_search_query(&query);
                Outcome::applied()
            }
            Intent::SetSortOrder(sort_order) => {
                self.store.set_sort_order(sort_order);
                Outcome::applied()
            }
            Intent::OpenRecycleBin => {
                let transition = self.view.open_recycle_bin(&mut self.store);
                Outcome::applied().with_transition(transition)
            }
            Intent::ShowEditor => {
                let transition = self.view.show_editor(&mut self.store);
                Outcome::from_flag(transition != Transition::Stay).with_transition(transition)
            }
            Intent::Restore(id) => match self.view.restore(&mut self.store, id) {
                Some(transition) => Outcome::applied()
                    .with_transition(transition)
                    .with_notice(Notice::success("Note restored successfully.")),
                None => Outcome::ignored(),
            },
            Intent::Purge { id, confirmed } => match self.view.purge(&mut self.store, id, confirmed) {
                Some(transition) => Outcome::applied()
                    .with_transition(transition)
                    .with_notice(Notice::error("Note permanently deleted.")),
                None => Outcome::ignored(),
            },
            Intent::CycleTheme => {
                let theme = self.store.theme().next();
                self.store.set_theme(theme);
                Outcome::applied().with_notice(Notice::info(format!("Theme changed to {}", theme.label())))
            }
            Intent::Export => self.export_current(),
        }
    }
}
