// notebin - note lifecycle core for a browser notes panel
// Active notes, recycle bin, ordering, search and debounced autosave behind one session

pub mod autosave;
pub mod clock;
pub mod commands;
pub mod error;
pub mod filter;
pub mod markup;
pub mod models;
pub mod ordering;
pub mod session;
pub mod storage;
pub mod store;
pub mod view;

pub use commands::{Intent, Notice, NoticeLevel, Outcome};
pub use error::{Error, Result};
pub use models::{Note, NoteId, SearchMatch, Settings, Snapshot, SortOrder, Theme, ViewMode};
pub use session::{Session, SessionEvent};
pub use store::NoteStore;
pub use view::Frame;

/// Install the global fmt subscriber. Later calls are ignored.
pub fn init_logging(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
