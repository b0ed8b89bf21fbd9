//! Ordering policy for the active collection.
//!
//! Pinned notes always come first; inside each partition the sort mode's
//! comparator applies. The sort is stable, so notes with equal keys keep
//! their relative position across re-sorts.

use std::cmp::Ordering;

use crate::models::{Note, SortOrder};

/// Return `notes` in display order for `mode`
pub fn order(notes: &[Note], mode: SortOrder) -> Vec<Note> {
    let mut ordered = notes.to_vec();
    sort(&mut ordered, mode);
    ordered
}

/// In-place variant of [`order`]
pub fn sort(notes: &mut [Note], mode: SortOrder) {
    notes.sort_by(|a, b| compare(a, b, mode));
}

pub fn compare(a: &Note, b: &Note, mode: SortOrder) -> Ordering {
    // pinned first
    b.is_pinned.cmp(&a.is_pinned).then_with(|| match mode {
        SortOrder::TitleAz => compare_titles(&a.title, &b.title),
        SortOrder::DateAsc => a.last_modified.cmp(&b.last_modified),
        SortOrder::DateDesc => b.last_modified.cmp(&a.last_modified),
    })
}

/// Locale-style title comparison: letters compare case-insensitively first,
/// then lowercase sorts before uppercase for otherwise equal titles.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.chars().map(case_rank).cmp(b.chars().map(case_rank)))
}

fn case_rank(c: char) -> u8 {
    if c.is_uppercase() { 1 } else { 0 }
}
