//! Filter policy: the subset of notes matching a free-text query, in input order.

use crate::markup;
use crate::models::{Note, SearchMatch};

/// Normalised query: lower-cased and trimmed
pub fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

pub fn matches(note: &Note, query: &str, target: SearchMatch) -> bool {
    let query = normalize(query);
    matches_normalized(note, &query, target)
}

fn matches_normalized(note: &Note, query: &str, target: SearchMatch) -> bool {
    if query.is_empty() || note.title.to_lowercase().contains(query) {
        return true;
    }
    match target {
        SearchMatch::Markup => note.content.to_lowercase().contains(query),
        SearchMatch::Text => markup::text_content(&note.content).to_lowercase().contains(query),
    }
}

/// Notes whose title or content contains `query`; an empty query keeps everything
pub fn filter<'a>(notes: &'a [Note], query: &str, target: SearchMatch) -> Vec<&'a Note> {
    let query = normalize(query);
    notes
        .iter()
        .filter(|n| matches_normalized(n, &query, target))
        .collect()
}
