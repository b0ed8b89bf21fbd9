// Configuration model
// Stored as YAML frontmatter in ~/.notebin/config.md

use serde::{Deserialize, Serialize};

/// What the search query is matched against in note content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMatch {
    /// Raw rich-text markup, so tag and attribute text can match too
    #[default]
    Markup,
    /// Markup-stripped plain text
    Text,
}

/// All settings (every field optional on disk)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub autosave_debounce_ms: u64,
    pub search_match: SearchMatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 500,
            search_match: SearchMatch::Markup,
            data_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
