//! Text helpers shared by the relevance calculator and label export.

use crate::models::Document;

/// All searchable text of a listing, lowercased and space-joined.
///
/// Order: title, description, then for each position its name followed by
/// the text and bullet items of every description block. Company text and
/// sphere captions are not included. Empty fields are skipped.
pub fn extract_full_text(document: &Document) -> String {
    let mut parts: Vec<&str> = vec![document.title(), document.description()];

    for position in document.positions() {
        if let Some(name) = position.name() {
            parts.push(name);
        }
        for block in position.blocks() {
            if let Some(text) = block.text.as_deref() {
                parts.push(text);
            }
            parts.extend(block.items().iter().map(String::as_str));
        }
    }

    parts
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether `needle` occurs in `haystack` as a whole word, optionally
/// followed by a single plural `s`.
///
/// Word boundaries are the string edges and any non-alphanumeric character,
/// so multi-word needles ("front end") and Cyrillic text work. Both inputs
/// are expected to be lowercased already.
pub fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    // Every start is tried, so overlapping occurrences are not skipped.
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        if is_bounded(haystack, start, start + needle.len()) {
            return true;
        }
        let step = haystack[start..].chars().next().map_or(1, char::len_utf8);
        from = start + step;
    }
    false
}

fn is_bounded(haystack: &str, start: usize, end: usize) -> bool {
    let left_ok = haystack[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric());
    if !left_ok {
        return false;
    }

    let mut rest = haystack[end..].chars();
    match rest.next() {
        None => true,
        Some('s') => rest.next().map_or(true, |c| !c.is_alphanumeric()),
        Some(c) => !c.is_alphanumeric(),
    }
}
