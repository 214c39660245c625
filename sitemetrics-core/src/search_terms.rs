//! Search-terms model for one stats period.

use serde::{Deserialize, Serialize};

/// A single search term and its view count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub term: String,
    pub views: u64,
}

impl SearchTerm {
    pub fn new(term: impl Into<String>, views: u64) -> Self {
        Self {
            term: term.into(),
            views,
        }
    }
}

/// Ordered search terms, ranked by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTermList {
    pub terms: Vec<SearchTerm>,
    /// Whether the server had more terms than were requested.
    pub has_more: bool,
}

impl SearchTermList {
    pub fn new(terms: Vec<SearchTerm>) -> Self {
        Self {
            terms,
            has_more: false,
        }
    }

    /// Keep the first `limit` terms; `has_more` reports whether anything
    /// was cut off.
    pub fn truncated(&self, limit: usize) -> SearchTermList {
        SearchTermList {
            terms: self.terms.iter().take(limit).cloned().collect(),
            has_more: self.has_more || self.terms.len() > limit,
        }
    }
}
