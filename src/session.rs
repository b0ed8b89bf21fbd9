// Session - one editing session: store, view, autosave and search state on a single task
// External events (timers, persistence failures) arrive on one channel and are applied in order

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::autosave::{AutosaveCoordinator, PendingEdit};
use crate::clock::Clock;
use crate::commands::Notice;
use crate::error::Result;
use crate::models::{Settings, Snapshot, ViewMode};
use crate::storage::{self, KeyValueStore, Persister, SnapshotSink};
use crate::store::NoteStore;
use crate::view::{self, Frame, ViewController};

/// Asynchronous completions fed back into the session
#[derive(Debug)]
pub enum SessionEvent {
    /// Debounce interval elapsed for a captured edit
    AutosaveDue(PendingEdit),
    /// A background snapshot write failed
    PersistFailed(String),
}

pub struct Session {
    pub(crate) store: NoteStore,
    pub(crate) view: ViewController,
    pub(crate) autosave: AutosaveCoordinator,
    pub(crate) settings: Settings,
    pub(crate) clock: Arc<dyn Clock>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    writer: Option<JoinHandle<()>>,
}

impl Session {
    /// Load the persisted snapshot and start the background writer.
    /// Must be called from within a tokio runtime.
    pub async fn open(
        kv: Arc<dyn KeyValueStore>,
        settings: Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let snapshot = storage::load_snapshot(kv.as_ref()).await?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (persister, writer) = Persister::spawn(kv, tx.clone());
        let mut session = Self::build(snapshot, Arc::new(persister), settings, clock, tx, rx);
        session.writer = Some(writer);
        info!(
            active = session.store.notes().len(),
            deleted = session.store.deleted_count(),
            "session opened"
        );
        Ok(session)
    }

    /// Session over an already loaded snapshot, persisting through `sink`
    pub fn with_sink(
        snapshot: Snapshot,
        sink: Arc<dyn SnapshotSink>,
        settings: Settings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self::build(snapshot, sink, settings, clock, tx, rx)
    }

    fn build(
        snapshot: Snapshot,
        sink: Arc<dyn SnapshotSink>,
        settings: Settings,
        clock: Arc<dyn Clock>,
        tx: mpsc::UnboundedSender<SessionEvent>,
        rx: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Self {
        let mut store = NoteStore::new(clock.clone(), sink);
        store.load(snapshot);
        Self {
            store,
            view: ViewController::default(),
            autosave: AutosaveCoordinator::new(settings.debounce(), tx),
            settings,
            clock,
            events: rx,
            writer: None,
        }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn autosave(&self) -> &AutosaveCoordinator {
        &self.autosave
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view.mode()
    }

    /// Derived state for the next render
    pub fn frame(&self) -> Frame {
        view::frame(&self.view, &self.store, self.settings.search_match, self.clock.now())
    }

    /// Wait for the next timer or persistence completion
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Apply a completion. Returns a notice when the user should hear about it.
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<Notice> {
        match event {
            SessionEvent::AutosaveDue(fired) => {
                if let Some(edit) = self.autosave.take_due(fired) {
                    self.commit_edit(&edit);
                }
                None
            }
            SessionEvent::PersistFailed(reason) => {
                debug!(%reason, "reporting persistence failure");
                Some(Notice::error("Could not save notes. Changes are kept in memory."))
            }
        }
    }

    /// Commit a captured edit to the note it was made on, whatever is selected now
    pub(crate) fn commit_edit(&mut self, edit: &PendingEdit) -> bool {
        let changed = self.store.update_title_and_content(edit.note_id, &edit.title, &edit.content);
        if !changed {
            debug!(note_id = edit.note_id, "autosave flush had no net change");
        }
        changed
    }

    /// Flush any pending edit, stop the background writer and wait for queued writes
    pub async fn shutdown(mut self) {
        if let Some(edit) = self.autosave.flush_now() {
            self.commit_edit(&edit);
        }
        let Session { store, writer, .. } = self;
        drop(store);
        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                error!(error = %e, "snapshot writer did not finish cleanly");
            }
        }
        info!("session closed");
    }
}
