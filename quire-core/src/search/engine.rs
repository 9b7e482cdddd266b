//! Weighted multi-field ranking over an in-memory set of search records.
//!
//! Every query term has to match at least one word of at least one field.
//! A term's strength is the best `weight * (1 - quality)` over all fields,
//! and a record's score is `1 - mean(strength)`, so `0.0` is a perfect hit.

use super::fuzzy::{match_word, tokenize, Word};
use super::{Field, FieldMatch, MatchSpan, SearchRecord, SearchResult};
use std::collections::BTreeMap;

/// Result cap for a dedicated search page.
pub const DEFAULT_LIMIT: usize = 30;
/// Result cap for inline typeahead suggestions.
pub const TYPEAHEAD_LIMIT: usize = 8;
/// Word matches with a quality above this are discarded.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub limit: usize,
    pub threshold: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl SearchOptions {
    pub fn typeahead() -> Self {
        Self {
            limit: TYPEAHEAD_LIMIT,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Tokenized copy of one record's fields.
#[derive(Debug)]
struct IndexedRecord {
    title: Vec<Word>,
    tags: Vec<Vec<Word>>,
    excerpt: Vec<Word>,
    content: Vec<Word>,
}

impl IndexedRecord {
    fn new(record: &SearchRecord) -> Self {
        Self {
            title: tokenize(&record.title),
            tags: record.tags.iter().map(|t| tokenize(t)).collect(),
            excerpt: tokenize(&record.excerpt),
            content: tokenize(&record.content),
        }
    }

    /// Word lists of `field`, tagged with the tag index for [`Field::Tags`].
    fn field_words(&self, field: Field) -> Vec<(Option<usize>, &[Word])> {
        match field {
            Field::Title => vec![(None, self.title.as_slice())],
            Field::Excerpt => vec![(None, self.excerpt.as_slice())],
            Field::Content => vec![(None, self.content.as_slice())],
            Field::Tags => self
                .tags
                .iter()
                .enumerate()
                .map(|(i, words)| (Some(i), words.as_slice()))
                .collect(),
        }
    }
}

/// Search engine over an immutable record set.
#[derive(Debug)]
pub struct SearchEngine {
    records: Vec<SearchRecord>,
    indexed: Vec<IndexedRecord>,
}

impl SearchEngine {
    pub fn new(records: Vec<SearchRecord>) -> Self {
        let indexed = records.iter().map(IndexedRecord::new).collect();
        Self { records, indexed }
    }

    pub fn records(&self) -> &[SearchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rank records against `query`.
    ///
    /// Blank queries, and queries without a single word character, return no
    /// results. Ties keep index order; `options.limit` applies after ranking.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let terms: Vec<Vec<char>> = tokenize(query).into_iter().map(|w| w.chars).collect();
        if terms.is_empty() || options.limit == 0 {
            return Vec::new();
        }

        let mut results: Vec<SearchResult> = self
            .indexed
            .iter()
            .enumerate()
            .filter_map(|(idx, indexed)| {
                let (score, matches) = score_record(indexed, &terms, options.threshold)?;
                Some(SearchResult {
                    item: self.records[idx].clone(),
                    score,
                    ref_index: idx,
                    matches,
                })
            })
            .collect();

        // sort_by is stable, so equal scores keep index order
        results.sort_by(|a, b| a.score.total_cmp(&b.score));
        results.truncate(options.limit);

        tracing::debug!(query, hits = results.len(), "search");
        results
    }
}

/// Score one record, or `None` when some term matches nowhere.
fn score_record(
    indexed: &IndexedRecord,
    terms: &[Vec<char>],
    threshold: f64,
) -> Option<(f64, Vec<FieldMatch>)> {
    let mut spans: BTreeMap<(usize, Option<usize>), Vec<MatchSpan>> = BTreeMap::new();
    let mut total_strength = 0.0;

    for term in terms {
        let mut best_strength: Option<f64> = None;

        for (field_idx, field) in Field::ALL.iter().enumerate() {
            for (tag_index, words) in indexed.field_words(*field) {
                let Some((quality, found)) = match_spans(term, words, threshold) else {
                    continue;
                };
                let strength = field.weight() * (1.0 - quality);
                best_strength = Some(best_strength.map_or(strength, |s: f64| s.max(strength)));
                spans
                    .entry((field_idx, tag_index))
                    .or_default()
                    .extend(found);
            }
        }

        total_strength += best_strength?;
    }

    let score = (1.0 - total_strength / terms.len() as f64).clamp(0.0, 1.0);
    let matches = spans
        .into_iter()
        .map(|((field_idx, tag_index), mut indices)| {
            indices.sort();
            indices.dedup();
            FieldMatch {
                field: Field::ALL[field_idx],
                tag_index,
                indices,
            }
        })
        .collect();

    Some((score, matches))
}

/// Best match quality of `term` among `words` plus every span that matched
/// within `threshold`.
fn match_spans(term: &[char], words: &[Word], threshold: f64) -> Option<(f64, Vec<MatchSpan>)> {
    let mut best: Option<f64> = None;
    let mut spans = Vec::new();

    for word in words {
        if let Some((quality, span)) = match_word(term, word) {
            if quality > threshold {
                continue;
            }
            best = Some(best.map_or(quality, |b: f64| b.min(quality)));
            spans.push(span);
        }
    }

    best.map(|quality| (quality, spans))
}

/// Rank `records` against `query` with the default threshold.
///
/// `limit` defaults to [`DEFAULT_LIMIT`].
pub fn search(records: &[SearchRecord], query: &str, limit: Option<usize>) -> Vec<SearchResult> {
    let options = SearchOptions::default().with_limit(limit.unwrap_or(DEFAULT_LIMIT));
    SearchEngine::new(records.to_vec()).search(query, &options)
}
