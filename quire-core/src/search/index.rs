//! Projection of documents into flat search records and the JSON artifact.

use super::SearchRecord;
use crate::models::Document;
use crate::plaintext::{create_snippet, markdown_to_plaintext, EXCERPT_CHARS};
use crate::url::format_iso_date;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchIndexError {
    #[error("failed to access search index {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed search index {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Build one record per non-draft document, in corpus order.
pub fn build_search_records(documents: &[Document]) -> Vec<SearchRecord> {
    documents
        .iter()
        .filter(|doc| !doc.draft)
        .map(search_record)
        .collect()
}

fn search_record(doc: &Document) -> SearchRecord {
    let content = markdown_to_plaintext(&doc.body);
    let excerpt = doc
        .excerpt
        .clone()
        .unwrap_or_else(|| create_snippet(&content, EXCERPT_CHARS));

    SearchRecord {
        slug: doc.slug.clone(),
        title: doc.title.clone(),
        excerpt,
        tags: doc.tags.iter().map(|t| t.display.clone()).collect(),
        content,
        date: doc.date.map(format_iso_date).unwrap_or_default(),
        reading_time: doc.reading_time,
    }
}

/// Write the records as a pretty-printed JSON array.
pub fn write_search_index(path: &Path, records: &[SearchRecord]) -> Result<(), SearchIndexError> {
    let json = serde_json::to_string_pretty(records).map_err(|source| SearchIndexError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SearchIndexError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, json).map_err(|source| SearchIndexError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_search_index(path: &Path) -> Result<Vec<SearchRecord>, SearchIndexError> {
    let raw = fs::read_to_string(path).map_err(|source| SearchIndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SearchIndexError::Json {
        path: path.to_path_buf(),
        source,
    })
}
