//! # quire-core
//!
//! Content indexing and search for a statically exported blog.
//!
//! This crate turns a directory of Markdown/MDX files with YAML frontmatter
//! into a validated, paginated, tag-indexed and full-text searchable corpus.

pub mod config;
pub mod frontmatter;
pub mod headings;
pub mod models;
pub mod pagination;
pub mod plaintext;
pub mod repository;
pub mod sanitize;
pub mod search;
pub mod slug;
pub mod url;

pub use config::Config;
pub use frontmatter::{parse_frontmatter, split_document, Frontmatter};
pub use headings::extract_headings;
pub use models::{
    Collection, Document, Heading, PaginatedPosts, PostMeta, Strictness, Tag, TagPage, TagSummary,
    Visibility,
};
pub use repository::{
    ContentRepository, DocumentError, DocumentErrorKind, LoadOptions, RepositoryError, RouteTarget,
};
pub use search::{
    highlight_matches, search, Field, FieldMatch, MatchSpan, SearchEngine, SearchOptions, SearchRecord,
    SearchResult,
};
pub use slug::{create_tag_slug, derive_slug, slugify};
pub use url::{derive_url, parse_iso_date, Route};
