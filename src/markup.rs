//! Helpers for the rich-text markup stored in note content.
//!
//! The editor stores HTML fragments. These helpers derive the plain text used
//! for live counters, list previews, plain-text search and export.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::{Note, UNTITLED};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static LINE_BREAK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(div|p|li|h[1-6]|blockquote|pre)\s*>").expect("static regex")
});
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("static regex"));
static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("static regex"));

const PREVIEW_CHARS: usize = 40;

/// Text content of the fragment: tags removed, entities decoded
pub fn text_content(markup: &str) -> String {
    decode_entities(&TAG.replace_all(markup, "")).into_owned()
}

/// Rendered text as the editor shows it: block ends and `<br>` become newlines
pub fn rendered_text(markup: &str) -> String {
    let with_breaks = LINE_BREAK_TAG.replace_all(markup, "\n");
    text_content(&with_breaks)
}

pub fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY.replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => numeric_entity(name),
        };
        decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
    })
}

fn numeric_entity(name: &str) -> Option<char> {
    let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        name.strip_prefix('#')?.parse().ok()?
    };
    char::from_u32(code)
}

/// Live word/character counters for the editor footer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub words: usize,
    pub characters: usize,
}

pub fn count(markup: &str) -> Counters {
    let text = rendered_text(markup);
    Counters {
        words: text.split_whitespace().count(),
        characters: text.chars().count(),
    }
}

/// Title shown in the side list: the title, else the start of the content, else a placeholder
pub fn list_title(note: &Note) -> String {
    let title = note.title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    let preview: String = TAG
        .replace_all(&note.content, " ")
        .trim()
        .chars()
        .take(PREVIEW_CHARS)
        .collect();
    if preview.is_empty() { UNTITLED.to_string() } else { preview }
}

/// Title shown in the recycle bin
pub fn bin_title(note: &Note) -> String {
    let title = note.title.trim();
    if title.is_empty() { UNTITLED.to_string() } else { title.to_string() }
}

/// Download name for an exported note, e.g. "Shopping List!" -> "shopping_list_.txt"
pub fn export_file_name(title: &str) -> String {
    let title = title.trim();
    let base = if title.is_empty() { "untitled_note" } else { title };
    format!("{}.txt", NON_ALNUM.replace_all(base, "_").to_lowercase())
}
