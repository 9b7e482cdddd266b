//! Shared JSON schema helpers for machine-facing commands and APIs.

use quire_core::{Config, Document, Field, FieldMatch, Heading, SearchResult};
use serde::Serialize;

pub const SCHEMA_VERSION: &str = "2026-01-quire-v1";

/// Standard envelope for machine-consumable responses.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub schema_version: &'static str,
    pub kind: &'static str,
    pub data: T,
}

pub fn envelope<T>(kind: &'static str, data: T) -> Envelope<T> {
    Envelope {
        schema_version: SCHEMA_VERSION,
        kind,
        data,
    }
}

#[derive(Serialize)]
pub struct SearchHit {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub date: String,
    #[serde(rename = "readingTime")]
    pub reading_time: u32,
    pub score: f64,
    pub matches: Vec<FieldMatch>,
    /// HTML-safe title and excerpt with `<mark>` around matches
    pub highlights: Highlights,
}

#[derive(Serialize)]
pub struct Highlights {
    pub title: String,
    pub excerpt: String,
}

#[derive(Serialize)]
pub struct SearchData {
    pub query: String,
    pub limit: usize,
    pub total: usize,
    pub results: Vec<SearchHit>,
}

/// Project a ranked result; `url` carries the configured `base_url`.
pub fn search_hit(config: &Config, result: &SearchResult) -> SearchHit {
    let item = &result.item;
    SearchHit {
        slug: item.slug.clone(),
        url: config.site_url(&item.url()),
        title: item.title.clone(),
        excerpt: item.excerpt.clone(),
        tags: item.tags.clone(),
        date: item.date.clone(),
        reading_time: item.reading_time,
        score: result.score,
        matches: result.matches.clone(),
        highlights: Highlights {
            title: result.highlighted(Field::Title),
            excerpt: result.highlighted(Field::Excerpt),
        },
    }
}

#[derive(Serialize)]
pub struct DocumentData<'a> {
    #[serde(flatten)]
    pub document: &'a Document,
    pub url: String,
    pub defaulted: &'a [&'static str],
}

pub fn document_payload<'a>(config: &Config, document: &'a Document) -> DocumentData<'a> {
    DocumentData {
        document,
        url: config.site_url(&document.url()),
        defaulted: &document.defaulted,
    }
}

/// Indented outline of a document's headings.
pub fn heading_outline(headings: &[Heading]) -> String {
    headings
        .iter()
        .map(|h| {
            let indent = "  ".repeat(usize::from(h.depth.saturating_sub(1)));
            format!("{}- {} (#{})", indent, h.text, h.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
pub struct ErrorData {
    pub error: String,
}

/// Error body that only carries the underlying message in development.
pub fn error_payload(message: &str, detail: Option<&dyn std::fmt::Display>) -> Envelope<ErrorData> {
    let error = match detail {
        Some(detail) => format!("{}: {}", message, detail),
        None => message.to_string(),
    };
    envelope("error", ErrorData { error })
}
