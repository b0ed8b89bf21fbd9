// Persisted snapshot: the full record written to the key-value store on every mutation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{SortOrder, Theme};
use super::note::Note;

pub const KEY_NOTES: &str = "notes";
pub const KEY_DELETED_NOTES: &str = "deletedNotes";
pub const KEY_SORT_ORDER: &str = "sortOrder";
pub const KEY_THEME: &str = "theme";

pub const SNAPSHOT_KEYS: [&str; 4] = [KEY_NOTES, KEY_DELETED_NOTES, KEY_SORT_ORDER, KEY_THEME];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub notes: Vec<Note>,
    pub deleted_notes: Vec<Note>,
    pub sort_order: SortOrder,
    pub theme: Theme,
}

impl Snapshot {
    /// Build from the values returned by a key-value `get`.
    /// Absent keys load as defaults; malformed ones are logged and treated as absent.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            notes: field(map, KEY_NOTES),
            deleted_notes: field(map, KEY_DELETED_NOTES),
            sort_order: field(map, KEY_SORT_ORDER),
            theme: field(map, KEY_THEME),
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

fn field<T: serde::de::DeserializeOwned + Default>(map: &Map<String, Value>, key: &str) -> T {
    match map.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "ignoring malformed persisted field");
            T::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_empty_map_is_default() {
        let snapshot = Snapshot::from_map(&Map::new());
        assert_eq!(snapshot, Snapshot::default());
        assert_eq!(snapshot.theme, Theme::Glassmorphism);
    }

    #[test]
    fn test_malformed_field_is_dropped_not_fatal() {
        let value = json!({
            "notes": "not a list",
            "deletedNotes": [{"id": 5, "title": "gone", "content": "", "isPinned": false, "lastModified": 1}],
            "sortOrder": "title-az",
        });
        let snapshot = Snapshot::from_map(value.as_object().unwrap());
        assert!(snapshot.notes.is_empty());
        assert_eq!(snapshot.deleted_notes.len(), 1);
        assert_eq!(snapshot.sort_order, SortOrder::TitleAz);
    }

    #[test]
    fn test_into_map_writes_all_keys() {
        let map = Snapshot::default().into_map();
        for key in SNAPSHOT_KEYS {
            assert!(map.contains_key(key), "missing {key}");
        }
        assert_eq!(map[KEY_SORT_ORDER], json!("date-desc"));
    }
}
