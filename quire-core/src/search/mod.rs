//! Search records, the search index artifact and the ranked search engine.

pub mod engine;
pub mod fuzzy;
pub mod highlight;
pub mod index;

pub use engine::{search, SearchEngine, SearchOptions, DEFAULT_LIMIT, TYPEAHEAD_LIMIT};
pub use highlight::{highlight_matches, highlight_query};
pub use index::{build_search_records, read_search_index, write_search_index, SearchIndexError};

use crate::url::{derive_url, parse_iso_date, Route};
use serde::{Deserialize, Serialize};

/// Flat, search-optimized projection of one published document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Plain text of the body
    #[serde(default)]
    pub content: String,
    /// `YYYY-MM-DD`, empty for undated pages
    #[serde(default)]
    pub date: String,
    #[serde(rename = "readingTime", default)]
    pub reading_time: u32,
}

impl SearchRecord {
    /// URL of the document the record was built from.
    pub fn url(&self) -> String {
        match parse_iso_date(&self.date) {
            Ok(date) => derive_url(date, &self.slug),
            Err(_) => Route::Page(self.slug.clone()).path(),
        }
    }
}

/// Searchable field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Tags,
    Excerpt,
    Content,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Title, Field::Tags, Field::Excerpt, Field::Content];

    /// Relative weight; a match in a heavier field ranks higher.
    pub fn weight(&self) -> f64 {
        match self {
            Field::Title => 1.0,
            Field::Tags => 0.75,
            Field::Excerpt => 0.5,
            Field::Content => 0.3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Tags => "tags",
            Field::Excerpt => "excerpt",
            Field::Content => "content",
        }
    }
}

/// Character range `[start, end)` of a match within a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

/// Matched spans within one field (or one tag of the tags field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMatch {
    pub field: Field,
    /// Which tag matched, for [`Field::Tags`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_index: Option<usize>,
    pub indices: Vec<MatchSpan>,
}

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub item: SearchRecord,
    /// 0 is a perfect match, 1 no match
    pub score: f64,
    /// Position of the record in the index
    pub ref_index: usize,
    pub matches: Vec<FieldMatch>,
}

impl SearchResult {
    /// HTML-safe rendering of `field` with matches wrapped in `<mark>`.
    ///
    /// Tags are joined with `", "`. Fields without matches are still escaped.
    pub fn highlighted(&self, field: Field) -> String {
        let spans_for = |tag_index: Option<usize>| -> Vec<MatchSpan> {
            self.matches
                .iter()
                .filter(|m| m.field == field && m.tag_index == tag_index)
                .flat_map(|m| m.indices.iter().copied())
                .collect()
        };

        match field {
            Field::Title => highlight_matches(&self.item.title, &spans_for(None)),
            Field::Excerpt => highlight_matches(&self.item.excerpt, &spans_for(None)),
            Field::Content => highlight_matches(&self.item.content, &spans_for(None)),
            Field::Tags => self
                .item
                .tags
                .iter()
                .enumerate()
                .map(|(i, tag)| highlight_matches(tag, &spans_for(Some(i))))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
