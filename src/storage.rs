// Storage layer for notebin
// Key-value persistence of note snapshots plus the YAML-frontmatter config file

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::models::{SNAPSHOT_KEYS, Settings, Snapshot};
use crate::session::SessionEvent;

// ============================================
// PATH HELPERS
// ============================================

/// Global config directory (~/.notebin/)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".notebin"))
}

/// Global config file path
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.md"))
}

/// JSON file backing the note snapshot
pub fn data_path(settings: &Settings) -> Option<PathBuf> {
    settings
        .data_dir
        .as_ref()
        .map(PathBuf::from)
        .or_else(config_dir)
        .map(|dir| dir.join("notes.json"))
}

// ============================================
// FRONTMATTER PARSING
// ============================================

/// Parse YAML frontmatter from markdown content
pub fn parse_frontmatter<T: serde::de::DeserializeOwned>(content: &str) -> Option<(T, String)> {
    let content = content.trim();
    let rest = content.strip_prefix("---")?;
    let end = rest.find("\n---")?;
    let yaml = rest[..end].trim();
    let body = rest[end + 4..].trim().to_string();

    let frontmatter: T = serde_yaml::from_str(yaml).ok()?;
    Some((frontmatter, body))
}

/// Serialize frontmatter + body to markdown
pub fn to_markdown<T: serde::Serialize>(frontmatter: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(frontmatter)
        .map_err(|e| Error::Config(format!("YAML error: {e}")))?;
    Ok(format!("---\n{yaml}---\n\n{body}"))
}

// ============================================
// SETTINGS
// ============================================

/// Read settings; a missing or unreadable file yields defaults
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Settings::default();
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read config, using defaults");
            return Settings::default();
        }
    };
    match parse_frontmatter::<Settings>(&content) {
        Some((settings, _)) => settings,
        None => {
            warn!(path = %path.display(), "failed to parse config frontmatter, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = to_markdown(settings, "# notebin settings\n")?;
    fs::write(path, content)?;
    Ok(())
}

// ============================================
// KEY-VALUE STORES
// ============================================

pub type Values = Map<String, Value>;

/// Asynchronous key-value persistence. Each `set` is atomic.
pub trait KeyValueStore: Send + Sync {
    /// Values for the requested keys; absent keys are simply missing from the map
    fn get<'a>(&'a self, keys: &'a [&'a str]) -> BoxFuture<'a, Result<Values>>;

    /// Merge `values` into the store
    fn set(&self, values: Values) -> BoxFuture<'_, Result<()>>;
}

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<Values>>,
}

impl MemoryStore {
    pub fn with_values(values: Values) -> Self {
        Self { values: Arc::new(Mutex::new(values)) }
    }

    pub fn contents(&self) -> Values {
        self.values.lock().clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, keys: &'a [&'a str]) -> BoxFuture<'a, Result<Values>> {
        let values = self.values.lock();
        let found = pick(&values, keys);
        async move { Ok(found) }.boxed()
    }

    fn set(&self, values: Values) -> BoxFuture<'_, Result<()>> {
        self.values.lock().extend(values);
        async { Ok(()) }.boxed()
    }
}

/// Store backed by a single JSON object on disk
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: tokio::sync::Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Values> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Values::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Values::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get<'a>(&'a self, keys: &'a [&'a str]) -> BoxFuture<'a, Result<Values>> {
        async move {
            let values = self.read_all().await?;
            Ok(pick(&values, keys))
        }
        .boxed()
    }

    fn set(&self, values: Values) -> BoxFuture<'_, Result<()>> {
        async move {
            let _guard = self.write_lock.lock().await;
            let mut all = self.read_all().await?;
            all.extend(values);

            if let Some(parent) = self.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            // Write beside the target then rename, so readers never see a partial file
            let tmp = self.path.with_extension("json.tmp");
            tokio::fs::write(&tmp, serde_json::to_vec_pretty(&all)?).await?;
            tokio::fs::rename(&tmp, &self.path).await?;
            Ok(())
        }
        .boxed()
    }
}

fn pick(values: &Values, keys: &[&str]) -> Values {
    keys.iter()
        .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect()
}

/// Read the persisted snapshot
pub async fn load_snapshot(store: &dyn KeyValueStore) -> Result<Snapshot> {
    let values = store.get(&SNAPSHOT_KEYS).await?;
    Ok(Snapshot::from_map(&values))
}

// ============================================
// SNAPSHOT SINKS
// ============================================

/// Receives the full snapshot after every mutation. Must not block.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, snapshot: Snapshot);
}

/// Keeps every snapshot it is given, for hosts that persist on their own schedule
#[derive(Debug, Default)]
pub struct RecordingSink {
    snapshots: Mutex<Vec<Snapshot>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.snapshots.lock().len()
    }

    pub fn last(&self) -> Option<Snapshot> {
        self.snapshots.lock().last().cloned()
    }

    pub fn take(&self) -> Vec<Snapshot> {
        std::mem::take(&mut *self.snapshots.lock())
    }
}

impl SnapshotSink for RecordingSink {
    fn persist(&self, snapshot: Snapshot) {
        self.snapshots.lock().push(snapshot);
    }
}

/// Fire-and-forget writer: snapshots are queued and written by a background task
#[derive(Debug, Clone)]
pub struct Persister {
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl Persister {
    /// Start the writer task. It ends once every `Persister` clone is dropped and the queue is drained.
    /// Failed writes are logged and reported on `events`.
    pub fn spawn(
        store: Arc<dyn KeyValueStore>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_loop(store, rx, events));
        (Self { tx }, handle)
    }
}

impl SnapshotSink for Persister {
    fn persist(&self, snapshot: Snapshot) {
        if self.tx.send(snapshot).is_err() {
            warn!("persister stopped, snapshot dropped");
        }
    }
}

async fn write_loop(
    store: Arc<dyn KeyValueStore>,
    mut rx: mpsc::UnboundedReceiver<Snapshot>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    while let Some(mut snapshot) = rx.recv().await {
        // Only the newest queued snapshot matters
        while let Ok(newer) = rx.try_recv() {
            snapshot = newer;
        }
        let notes = snapshot.notes.len();
        match store.set(snapshot.into_map()).await {
            Ok(()) => debug!(notes, "snapshot persisted"),
            Err(e) => {
                error!(error = %e, "failed to persist notes");
                let _ = events.send(SessionEvent::PersistFailed(e.to_string()));
            }
        }
    }
    debug!("persister finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Note, SearchMatch, SortOrder};
    use serde_json::json;

    #[test]
    fn test_parse_frontmatter() {
        let raw = "---\nsearchMatch: text\nautosaveDebounceMs: 300\n---\n\n# notebin settings\n";
        let (settings, body) = parse_frontmatter::<Settings>(raw).unwrap();
        assert_eq!(settings.search_match, SearchMatch::Text);
        assert_eq!(settings.autosave_debounce_ms, 300);
        assert_eq!(body, "# notebin settings");
        assert!(parse_frontmatter::<Settings>("no frontmatter").is_none());
    }

    #[test]
    fn test_settings_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.md");
        assert_eq!(load_settings(&path), Settings::default());

        let settings = Settings { autosave_debounce_ms: 300, ..Settings::default() };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);
    }

    #[test]
    fn test_data_path_prefers_configured_dir() {
        let settings = Settings { data_dir: Some("/tmp/nb".into()), ..Settings::default() };
        assert_eq!(data_path(&settings), Some(PathBuf::from("/tmp/nb/notes.json")));
    }

    #[tokio::test]
    async fn test_memory_store_get_only_returns_requested_keys() {
        let store = MemoryStore::default();
        store.set(json!({"theme": "dark", "other": 1}).as_object().unwrap().clone()).await.unwrap();
        let values = store.get(&["theme", "notes"]).await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["theme"], json!("dark"));
    }

    #[tokio::test]
    async fn test_file_store_merges_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let store = FileStore::new(&path);
        assert!(store.get(&SNAPSHOT_KEYS).await.unwrap().is_empty());

        let snapshot = Snapshot {
            notes: vec![Note::new(1, 10)],
            sort_order: SortOrder::TitleAz,
            ..Snapshot::default()
        };
        store.set(snapshot.clone().into_map()).await.unwrap();
        store.set(json!({"extra": true}).as_object().unwrap().clone()).await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(load_snapshot(&reopened).await.unwrap(), snapshot);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_persister_writes_latest_snapshot() {
        let store = MemoryStore::default();
        let (events, _rx) = mpsc::unbounded_channel();
        let (persister, handle) = Persister::spawn(Arc::new(store.clone()), events);

        persister.persist(Snapshot { notes: vec![Note::new(1, 1)], ..Snapshot::default() });
        persister.persist(Snapshot { notes: vec![Note::new(1, 1), Note::new(2, 2)], ..Snapshot::default() });
        drop(persister);
        handle.await.unwrap();

        let saved = load_snapshot(&store).await.unwrap();
        assert_eq!(saved.notes.len(), 2);
    }
}
