// Time source and id generation

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::models::NoteId;

/// Millisecond wall clock
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn at(millis: i64) -> Self {
        Self(Arc::new(AtomicI64::new(millis)))
    }

    pub fn advance(&self, millis: i64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.0.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Timestamp ids with a tiebreak: never returns a value at or below one already issued or observed
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: NoteId,
}

impl IdGenerator {
    pub fn next(&mut self, now: i64) -> NoteId {
        self.last = now.max(self.last + 1);
        self.last
    }

    /// Account for ids that already exist (e.g. loaded from storage)
    pub fn observe(&mut self, id: NoteId) {
        self.last = self.last.max(id);
    }
}
