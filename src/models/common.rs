// Common enums shared by the store, the persisted snapshot and the render frame
// String forms match the values the extension persists

use serde::{Deserialize, Serialize};

/// Sort mode for the active collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    TitleAz,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::TitleAz => "title-az",
        }
    }

    /// Unrecognised values fall back to `date-desc`
    pub fn parse(value: &str) -> Self {
        match value {
            "date-asc" => Self::DateAsc,
            "title-az" => Self::TitleAz,
            _ => Self::DateDesc,
        }
    }
}

impl From<String> for SortOrder {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SortOrder> for String {
    fn from(value: SortOrder) -> Self {
        value.as_str().to_string()
    }
}

/// Visual theme, cycled in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    Light,
    Dark,
    Slate,
    #[default]
    Glassmorphism,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Light, Theme::Dark, Theme::Slate, Theme::Glassmorphism];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Slate => "slate",
            Self::Glassmorphism => "glassmorphism",
        }
    }

    pub fn parse(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .unwrap_or_default()
    }

    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Display name, e.g. "Glassmorphism"
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<String> for Theme {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Theme> for String {
    fn from(value: Theme) -> Self {
        value.as_str().to_string()
    }
}

/// Which pane the main area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Editor,
    RecycleBin,
}
