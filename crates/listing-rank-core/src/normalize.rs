//! Query normalization.
//!
//! Job queries are typed with inconsistent spacing and hyphenation
//! ("front end", "front-end", "frontend"). [`variants`] expands a query into
//! the spellings the taxonomy lookup should treat as equivalent, and
//! [`Query`] bundles the derived forms so they are computed once per query
//! rather than once per document.

use std::collections::BTreeSet;

/// Alternate spellings of a query.
///
/// Always contains the lowercased, trimmed query plus three rewrites of it:
/// all whitespace removed, hyphens replaced by spaces, and spaces replaced
/// by hyphens. Duplicates collapse, so a single-word query usually yields
/// one or two entries. An empty query yields `{""}`.
pub fn variants(query: &str) -> BTreeSet<String> {
    let base = query.trim().to_lowercase();

    let mut out = BTreeSet::new();
    out.insert(base.chars().filter(|c| !c.is_whitespace()).collect());
    out.insert(base.replace('-', " "));
    out.insert(base.replace(' ', "-"));
    out.insert(base);
    out
}

/// A query with its derived matching forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    lowercase: String,
    parts: Vec<String>,
    variants: BTreeSet<String>,
}

impl Query {
    pub fn new(raw: &str) -> Self {
        let lowercase = raw.trim().to_lowercase();
        let parts = lowercase.split_whitespace().map(str::to_string).collect();
        let variants = variants(&lowercase);
        Self {
            lowercase,
            parts,
            variants,
        }
    }

    /// The lowercased, trimmed query.
    pub fn as_str(&self) -> &str {
        &self.lowercase
    }

    /// Whitespace-separated tokens of the lowercased query, in order.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn variants(&self) -> &BTreeSet<String> {
        &self.variants
    }

    pub fn is_empty(&self) -> bool {
        self.lowercase.is_empty()
    }
}
