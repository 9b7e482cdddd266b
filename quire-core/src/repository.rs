//! Content repository: discovers, validates and indexes a content corpus.
//!
//! A repository is an immutable snapshot. Documents live in one vector sorted
//! newest first, and slugs map to positions in that vector. When content
//! changes the whole repository is rebuilt.

use crate::frontmatter::{split_document, Frontmatter, ValidationError};
use crate::headings::extract_headings;
use crate::models::{
    Collection, Document, PaginatedPosts, PostMeta, Strictness, Tag, TagPage, TagSummary,
    Visibility,
};
use crate::pagination::{paginate, total_pages};
use crate::plaintext::reading_time;
use crate::search::{build_search_records, SearchEngine, SearchRecord};
use crate::slug::{create_tag_slug, derive_slug};
use crate::url::{Route, RESERVED_PAGE_SLUGS};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const CONTENT_EXTENSIONS: &[&str] = &["md", "mdx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentErrorKind {
    Io,
    Parse,
    Validation,
    DuplicateSlug,
}

impl fmt::Display for DocumentErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentErrorKind::Io => "io",
            DocumentErrorKind::Parse => "parse",
            DocumentErrorKind::Validation => "validation",
            DocumentErrorKind::DuplicateSlug => "duplicate-slug",
        };
        f.write_str(name)
    }
}

/// Why one content file was left out of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{path}: {kind} error: {message}")]
pub struct DocumentError {
    /// Path relative to the content root
    pub path: String,
    pub kind: DocumentErrorKind,
    pub message: String,
}

impl DocumentError {
    fn new(path: &str, kind: DocumentErrorKind, message: impl ToString) -> Self {
        Self {
            path: path.to_string(),
            kind,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("content directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("invalid ignore pattern '{pattern}': {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// How a corpus is loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub collection: Collection,
    pub visibility: Visibility,
    pub strictness: Strictness,
    /// Regexes matched against paths relative to the content root
    pub ignore_patterns: Vec<String>,
}

impl LoadOptions {
    pub fn posts() -> Self {
        Self::default()
    }

    pub fn pages() -> Self {
        Self {
            collection: Collection::Pages,
            ..Self::default()
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }
}

/// What a URL of the site resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteTarget<'a> {
    Listing(PaginatedPosts),
    Document(&'a Document),
    Tags(Vec<TagSummary>),
    Tag(TagPage),
    Search { query: String },
    NotFound,
}

/// Immutable, validated snapshot of one or more content collections.
#[derive(Debug, Clone, Default)]
pub struct ContentRepository {
    documents: Vec<Document>,
    by_slug: HashMap<(Collection, String), usize>,
    /// Positions of posts in `documents`, newest first
    listing: Vec<usize>,
    failures: Vec<DocumentError>,
    visibility: Visibility,
}

impl ContentRepository {
    /// Load every `.md`/`.mdx` file under `dir`.
    pub fn load(dir: &Path, options: &LoadOptions) -> Result<Self, RepositoryError> {
        if !dir.is_dir() {
            return Err(RepositoryError::MissingDirectory(dir.to_path_buf()));
        }
        let ignores = compile_ignore_patterns(&options.ignore_patterns)?;

        let mut sources = Vec::new();
        let mut failures = Vec::new();
        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let is_content = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext));
            if !is_content {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            if should_ignore(&rel, &ignores) {
                tracing::debug!("Ignoring {} due to ignore_patterns", rel);
                continue;
            }

            match fs::read_to_string(entry.path()) {
                Ok(text) => sources.push((rel, text)),
                Err(err) => {
                    let failure = DocumentError::new(&rel, DocumentErrorKind::Io, err);
                    if options.strictness == Strictness::Strict {
                        return Err(failure.into());
                    }
                    tracing::warn!("Skipping {}", failure);
                    failures.push(failure);
                }
            }
        }

        tracing::info!(
            "Found {} {} files in {}",
            sources.len(),
            options.collection.as_str(),
            dir.display()
        );

        let mut repo = Self::build(sources, options)?;
        failures.append(&mut repo.failures);
        repo.failures = failures;
        Ok(repo)
    }

    /// Same pipeline as [`ContentRepository::load`] over in-memory
    /// `(relative path, file text)` pairs.
    pub fn from_sources<I, P, T>(sources: I, options: &LoadOptions) -> Result<Self, RepositoryError>
    where
        I: IntoIterator<Item = (P, T)>,
        P: Into<String>,
        T: Into<String>,
    {
        let ignores = compile_ignore_patterns(&options.ignore_patterns)?;
        let mut sources: Vec<(String, String)> = sources
            .into_iter()
            .map(|(p, t)| (p.into(), t.into()))
            .filter(|(path, _)| !should_ignore(path, &ignores))
            .collect();
        sources.sort_by(|a, b| a.0.cmp(&b.0));
        Self::build(sources, options)
    }

    fn build(sources: Vec<(String, String)>, options: &LoadOptions) -> Result<Self, RepositoryError> {
        let mut documents: Vec<Document> = Vec::new();
        let mut failures = Vec::new();
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut hidden = 0usize;

        let mut reject = |failure: DocumentError| -> Result<(), RepositoryError> {
            if options.strictness == Strictness::Strict {
                return Err(failure.into());
            }
            tracing::warn!("Skipping {}", failure);
            failures.push(failure);
            Ok(())
        };

        for (path, text) in &sources {
            let doc = match parse_document(path, text, options.collection) {
                Ok(doc) => doc,
                Err(failure) => {
                    reject(failure)?;
                    continue;
                }
            };

            if !options.visibility.shows(doc.draft) {
                hidden += 1;
                continue;
            }

            if let Some(first) = seen.get(&doc.slug) {
                let message = format!("slug '{}' is already used by {}", doc.slug, first);
                reject(DocumentError::new(path, DocumentErrorKind::DuplicateSlug, message))?;
                continue;
            }
            seen.insert(doc.slug.clone(), path.clone());
            documents.push(doc);
        }

        if hidden > 0 {
            tracing::debug!("Hid {} draft documents", hidden);
        }

        let mut repo = Self {
            documents,
            failures,
            visibility: options.visibility,
            ..Self::default()
        };
        repo.reindex();
        Ok(repo)
    }

    /// Combine two snapshots, e.g. posts and pages. Slugs stay unique per
    /// collection; a slug already present in `self` wins.
    pub fn merge(mut self, other: ContentRepository) -> Self {
        self.failures.extend(other.failures);
        for doc in other.documents {
            let key = (doc.collection, doc.slug.clone());
            if self.by_slug.contains_key(&key) {
                let message = format!("slug '{}' is already used", doc.slug);
                let failure =
                    DocumentError::new(&doc.source_path, DocumentErrorKind::DuplicateSlug, message);
                tracing::warn!("Skipping {}", failure);
                self.failures.push(failure);
                continue;
            }
            self.by_slug.insert(key, usize::MAX);
            self.documents.push(doc);
        }
        self.reindex();
        self
    }

    /// Sort newest first, ties by slug descending, undated last, then rebuild
    /// the lookup tables.
    fn reindex(&mut self) {
        self.documents.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.slug.cmp(&a.slug))
                .then_with(|| a.collection.as_str().cmp(b.collection.as_str()))
        });
        self.by_slug = self
            .documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| ((doc.collection, doc.slug.clone()), idx))
            .collect();
        self.listing = self
            .documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| doc.collection == Collection::Posts)
            .map(|(idx, _)| idx)
            .collect();
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Documents excluded while loading, in discovery order.
    pub fn failures(&self) -> &[DocumentError] {
        &self.failures
    }

    fn posts(&self) -> impl Iterator<Item = &Document> + '_ {
        self.listing.iter().map(|&idx| &self.documents[idx])
    }

    /// Every listed post, newest first.
    pub fn list_all_meta(&self) -> Vec<PostMeta> {
        self.posts().map(Document::meta).collect()
    }

    /// Look up a document by slug, posts before pages.
    pub fn get_document(&self, slug: &str) -> Option<&Document> {
        self.get_in(Collection::Posts, slug)
            .or_else(|| self.get_in(Collection::Pages, slug))
    }

    pub fn get_in(&self, collection: Collection, slug: &str) -> Option<&Document> {
        self.by_slug
            .get(&(collection, slug.to_string()))
            .map(|&idx| &self.documents[idx])
    }

    /// One page (1-based) of the post listing.
    pub fn paginate(&self, page: usize, page_size: usize) -> PaginatedPosts {
        let metas = self.list_all_meta();
        let page = paginate(&metas, page, page_size);
        PaginatedPosts {
            posts: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            has_next_page: page.has_next_page,
            has_prev_page: page.has_prev_page,
            total_posts: page.total_items,
        }
    }

    /// Distinct authored tag forms, sorted case-insensitively then byte-wise.
    pub fn list_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .posts()
            .flat_map(|doc| doc.tags.iter())
            .filter(|t| t.is_indexed())
            .map(|t| t.display.clone())
            .collect();
        sort_case_insensitive(&mut tags, |t| t.as_str());
        tags.dedup();
        tags
    }

    /// Tag buckets keyed by tag slug, for the tag overview.
    ///
    /// The display form is the first authored form seen in listing order.
    pub fn tag_buckets(&self) -> Vec<TagSummary> {
        let mut buckets: Vec<TagSummary> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for doc in self.posts() {
            let mut counted: Vec<&str> = Vec::new();
            for tag in &doc.tags {
                if !tag.is_indexed() || counted.contains(&tag.key.as_str()) {
                    continue;
                }
                counted.push(&tag.key);
                match positions.get(tag.key.as_str()) {
                    Some(&pos) => buckets[pos].count += 1,
                    None => {
                        positions.insert(&tag.key, buckets.len());
                        buckets.push(TagSummary {
                            slug: tag.key.clone(),
                            display: tag.display.clone(),
                            count: 1,
                        });
                    }
                }
            }
        }

        sort_case_insensitive(&mut buckets, |b| b.display.as_str());
        buckets
    }

    /// One page of the posts carrying `tag`.
    ///
    /// `tag` may be an authored form (`"D&D 5e"`) or a URL segment
    /// (`"d-d-5e"`); both resolve to the same bucket.
    pub fn get_by_tag(&self, tag: &str, page: usize, page_size: usize) -> TagPage {
        let key = create_tag_slug(tag);
        let tagged: Vec<&Document> = if key.is_empty() {
            Vec::new()
        } else {
            self.posts()
                .filter(|doc| doc.tags.iter().any(|t| t.key == key))
                .collect()
        };

        let display = tagged
            .first()
            .and_then(|doc| doc.tags.iter().find(|t| t.key == key))
            .map(|t| t.display.clone())
            .unwrap_or_else(|| tag.to_string());

        let metas: Vec<PostMeta> = tagged.into_iter().map(Document::meta).collect();
        let page = paginate(&metas, page, page_size);
        TagPage {
            tag: key,
            display,
            posts: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            has_next_page: page.has_next_page,
            has_prev_page: page.has_prev_page,
            total_posts: page.total_items,
        }
    }

    /// Resolve a URL of the site.
    ///
    /// Posts are only served under the date they carry; unknown slugs or tags,
    /// out of range pages and date mismatches are all `NotFound`.
    pub fn resolve_route(&self, route: &Route, page_size: usize) -> RouteTarget<'_> {
        match route {
            Route::Listing(page) => {
                let count = self.listing.len();
                if *page == 0 || *page > total_pages(count, page_size) {
                    return RouteTarget::NotFound;
                }
                RouteTarget::Listing(self.paginate(*page, page_size))
            }
            Route::Post { date, slug } => match self.get_in(Collection::Posts, slug) {
                Some(doc) if doc.date == Some(*date) => RouteTarget::Document(doc),
                _ => RouteTarget::NotFound,
            },
            Route::Page(slug) => self
                .get_in(Collection::Pages, slug)
                .map_or(RouteTarget::NotFound, RouteTarget::Document),
            Route::Tags => RouteTarget::Tags(self.tag_buckets()),
            Route::Tag { tag, page } => {
                let tag_page = self.get_by_tag(tag, *page, page_size);
                if tag_page.posts.is_empty() {
                    return RouteTarget::NotFound;
                }
                RouteTarget::Tag(tag_page)
            }
            Route::Search { query } => RouteTarget::Search {
                query: query.clone(),
            },
        }
    }

    /// Every URL the site serves, in a stable order.
    pub fn routes(&self, page_size: usize) -> Vec<Route> {
        let listing_pages = total_pages(self.listing.len(), page_size);
        let mut routes: Vec<Route> = (1..=listing_pages).map(Route::Listing).collect();
        routes.extend(self.documents.iter().map(Document::route));
        routes.push(Route::Tags);
        for bucket in self.tag_buckets() {
            let pages = total_pages(bucket.count, page_size);
            routes.extend((1..=pages).map(|page| Route::Tag {
                tag: bucket.slug.clone(),
                page,
            }));
        }
        routes.push(Route::Search {
            query: String::new(),
        });
        routes
    }

    /// Search records for every non-draft document, in corpus order.
    pub fn search_records(&self) -> Vec<SearchRecord> {
        build_search_records(&self.documents)
    }

    pub fn search_engine(&self) -> SearchEngine {
        SearchEngine::new(self.search_records())
    }
}

fn sort_case_insensitive<T>(items: &mut [T], key: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| {
        let (a, b) = (key(a), key(b));
        a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
    });
}

/// Parse, validate and derive one document.
fn parse_document(path: &str, text: &str, collection: Collection) -> Result<Document, DocumentError> {
    let parse_err = |e: &dyn fmt::Display| DocumentError::new(path, DocumentErrorKind::Parse, e);
    let validation_err =
        |e: ValidationError| DocumentError::new(path, DocumentErrorKind::Validation, e);

    let raw = split_document(text).map_err(|e| parse_err(&e))?;
    let frontmatter = Frontmatter::from_metadata(&raw.metadata).map_err(|e| parse_err(&e))?;
    let validated = frontmatter.validate(collection).map_err(validation_err)?;

    let file_name = path.rsplit('/').next().unwrap_or(path);
    let slug = derive_slug(file_name, validated.slug.as_deref());
    if slug.is_empty() || slug.contains('/') {
        return Err(validation_err(ValidationError::MissingField("slug")));
    }
    if collection == Collection::Pages && RESERVED_PAGE_SLUGS.contains(&slug.as_str()) {
        return Err(validation_err(ValidationError::ReservedSlug(slug)));
    }

    let tags: Vec<Tag> = validated
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(Tag::new)
        .collect();
    for tag in tags.iter().filter(|t| !t.is_indexed()) {
        tracing::warn!(
            "{}: tag '{}' has no URL-safe characters and gets no tag page",
            path,
            tag.display
        );
    }

    Ok(Document {
        slug,
        collection,
        title: validated.title,
        date: validated.date,
        excerpt: validated.excerpt,
        tags,
        draft: validated.draft,
        featured_image: validated.featured_image,
        show_toc: validated.show_toc,
        reading_time: reading_time(&raw.body),
        headings: extract_headings(&raw.body),
        body: raw.body,
        source_path: path.to_string(),
        defaulted: validated.defaulted,
    })
}

fn compile_ignore_patterns(patterns: &[String]) -> Result<Vec<Regex>, RepositoryError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| RepositoryError::IgnorePattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn should_ignore(path: &str, ignores: &[Regex]) -> bool {
    ignores.iter().any(|re| re.is_match(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(date: &str, title: &str, extra: &str) -> String {
        format!("---\ntitle: {}\ndate: {}\n{}---\nBody of {}.\n", title, date, extra, title)
    }

    fn repo(sources: Vec<(&str, String)>, options: &LoadOptions) -> ContentRepository {
        ContentRepository::from_sources(sources, options).unwrap()
    }

    #[test]
    fn test_sorted_newest_first_with_slug_tiebreak() {
        let repo = repo(
            vec![
                ("2020-01-01-old.md", post("2020-01-01", "Old", "")),
                ("2021-05-05-b.md", post("2021-05-05", "B", "")),
                ("2021-05-05-a.md", post("2021-05-05", "A", "")),
            ],
            &LoadOptions::posts(),
        );
        let slugs: Vec<_> = repo.list_all_meta().into_iter().map(|m| m.slug).collect();
        assert_eq!(slugs, ["b", "a", "old"]);
    }

    #[test]
    fn test_failures_are_recorded_not_fatal() {
        let repo = repo(
            vec![
                ("good.md", post("2021-01-01", "Good", "")),
                ("no-title.md", "---\ndate: 2021-01-01\n---\nx".to_string()),
                ("broken.md", "---\ntitle: [oops\n---\nx".to_string()),
                ("open.md", "---\ntitle: Open\n".to_string()),
            ],
            &LoadOptions::posts(),
        );
        assert_eq!(repo.len(), 1);
        let kinds: Vec<_> = repo.failures().iter().map(|f| (f.path.as_str(), f.kind)).collect();
        assert_eq!(
            kinds,
            [
                ("broken.md", DocumentErrorKind::Parse),
                ("no-title.md", DocumentErrorKind::Validation),
                ("open.md", DocumentErrorKind::Parse),
            ]
        );
    }

    #[test]
    fn test_strict_mode_aborts() {
        let err = ContentRepository::from_sources(
            vec![
                ("a.md", post("2021-01-01", "A", "")),
                ("b.md", "---\ntitle: B\n---\n".to_string()),
            ],
            &LoadOptions::posts().with_strictness(Strictness::Strict),
        )
        .unwrap_err();
        match err {
            RepositoryError::Document(failure) => {
                assert_eq!(failure.path, "b.md");
                assert_eq!(failure.kind, DocumentErrorKind::Validation);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_slug_first_path_wins() {
        let repo = repo(
            vec![
                ("2021-02-02-hello.md", post("2021-02-02", "Second", "")),
                ("2021-01-01-hello.md", post("2021-01-01", "First", "")),
            ],
            &LoadOptions::posts(),
        );
        assert_eq!(repo.get_document("hello").unwrap().title, "First");
        assert_eq!(repo.failures().len(), 1);
        assert_eq!(repo.failures()[0].kind, DocumentErrorKind::DuplicateSlug);
        assert_eq!(repo.failures()[0].path, "2021-02-02-hello.md");
    }

    #[test]
    fn test_visibility_controls_drafts() {
        let sources = vec![
            ("a.md", post("2021-01-01", "A", "")),
            ("b.md", post("2021-01-02", "B", "draft: true\n")),
        ];
        let published = repo(sources.clone(), &LoadOptions::posts());
        assert_eq!(published.len(), 1);
        assert!(published.get_document("b").is_none());

        let all = repo(sources, &LoadOptions::posts().with_visibility(Visibility::All));
        assert_eq!(all.len(), 2);
        assert!(all.get_document("b").unwrap().draft);
        assert_eq!(all.search_records().len(), 1);
    }

    #[test]
    fn test_tags_resolve_case_insensitively() {
        let repo = repo(
            vec![
                ("a.md", post("2021-01-01", "A", "tags: [\"D&D 5e\", Rust]\n")),
                ("b.md", post("2021-01-02", "B", "tags: [d&d 5E]\n")),
                ("c.md", post("2021-01-03", "C", "tags: [Go]\n")),
            ],
            &LoadOptions::posts(),
        );

        let by_display = repo.get_by_tag("D&D 5e", 1, 10);
        let by_segment = repo.get_by_tag(&create_tag_slug("D&D 5e"), 1, 10);
        assert_eq!(by_display, by_segment);
        assert_eq!(by_display.tag, "d-d-5e");
        assert_eq!(by_display.display, "d&d 5E");
        assert_eq!(by_display.total_posts, 2);

        assert_eq!(repo.list_tags(), ["D&D 5e", "d&d 5E", "Go", "Rust"]);

        let buckets = repo.tag_buckets();
        assert_eq!(buckets[0].slug, "d-d-5e");
        assert_eq!(buckets[0].count, 2);
    }

    #[test]
    fn test_unindexable_tags_stay_out_of_listings() {
        let repo = repo(
            vec![
                ("a.md", post("2021-01-01", "A", "tags: [日本語, Rust]\n")),
                ("b.md", post("2021-01-02", "B", "tags: [\"!!!\"]\n")),
            ],
            &LoadOptions::posts(),
        );
        assert_eq!(repo.list_tags(), ["Rust"]);
        let slugs: Vec<_> = repo.tag_buckets().into_iter().map(|b| b.slug).collect();
        assert_eq!(slugs, ["rust"]);
        assert!(repo.get_by_tag("日本語", 1, 10).posts.is_empty());
        assert!(!repo.get_document("a").unwrap().has_tag("!!!"));
    }

    #[test]
    fn test_unknown_tag_is_empty() {
        let repo = repo(vec![("a.md", post("2021-01-01", "A", ""))], &LoadOptions::posts());
        let page = repo.get_by_tag("nothing", 1, 10);
        assert!(page.posts.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.display, "nothing");
    }

    #[test]
    fn test_resolve_route_checks_dates() {
        let posts = repo(
            vec![("2021-03-04-hello.md", post("2021-03-04", "Hello", "tags: [Rust]\n"))],
            &LoadOptions::posts(),
        );
        let pages = repo(
            vec![("about.md", "---\ntitle: About\n---\nHi\n".to_string())],
            &LoadOptions::pages(),
        );
        let site = posts.merge(pages);

        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        let hit = site.resolve_route(&Route::Post { date, slug: "hello".into() }, 10);
        assert!(matches!(hit, RouteTarget::Document(doc) if doc.slug == "hello"));

        let wrong = NaiveDate::from_ymd_opt(2021, 3, 5).unwrap();
        let miss = site.resolve_route(&Route::Post { date: wrong, slug: "hello".into() }, 10);
        assert_eq!(miss, RouteTarget::NotFound);

        let about = site.resolve_route(&Route::Page("about".into()), 10);
        assert!(matches!(about, RouteTarget::Document(doc) if doc.collection == Collection::Pages));

        assert_eq!(site.resolve_route(&Route::Listing(2), 10), RouteTarget::NotFound);
        assert_eq!(
            site.resolve_route(&Route::Tag { tag: "go".into(), page: 1 }, 10),
            RouteTarget::NotFound
        );
        assert!(matches!(
            site.resolve_route(&Route::Tag { tag: "rust".into(), page: 1 }, 10),
            RouteTarget::Tag(_)
        ));
    }

    #[test]
    fn test_pages_are_not_listed() {
        let posts = repo(vec![("a.md", post("2021-01-01", "A", ""))], &LoadOptions::posts());
        let pages = repo(
            vec![("about.md", "---\ntitle: About\n---\nHi\n".to_string())],
            &LoadOptions::pages(),
        );
        let site = posts.merge(pages);
        assert_eq!(site.len(), 2);
        assert_eq!(site.list_all_meta().len(), 1);
        assert_eq!(site.search_records().len(), 2);
        assert_eq!(site.documents().last().unwrap().slug, "about");
    }

    #[test]
    fn test_pages_cannot_shadow_site_routes() {
        let pages = repo(
            vec![
                ("about.md", "---\ntitle: About\n---\nHi\n".to_string()),
                ("search.md", "---\ntitle: Search\n---\n".to_string()),
                ("tags.md", "---\ntitle: Tags\n---\n".to_string()),
            ],
            &LoadOptions::pages(),
        );
        assert_eq!(pages.len(), 1);
        let failed: Vec<_> = pages
            .failures()
            .iter()
            .map(|f| (f.path.as_str(), f.kind))
            .collect();
        assert_eq!(
            failed,
            [
                ("search.md", DocumentErrorKind::Validation),
                ("tags.md", DocumentErrorKind::Validation),
            ]
        );

        let tags_routes = pages
            .routes(10)
            .into_iter()
            .filter(|r| r.path() == "/tags/")
            .count();
        assert_eq!(tags_routes, 1);

        // Dated posts live under their own prefix and may use any slug
        let posts = repo(
            vec![("2021-01-01-tags.md", post("2021-01-01", "Tags", ""))],
            &LoadOptions::posts(),
        );
        assert!(posts.failures().is_empty());
    }

    #[test]
    fn test_ignore_patterns() {
        let repo = repo(
            vec![
                ("a.md", post("2021-01-01", "A", "")),
                ("drafts/b.md", post("2021-01-02", "B", "")),
            ],
            &LoadOptions::posts().with_ignore_patterns(vec!["^drafts/".into()]),
        );
        assert_eq!(repo.len(), 1);

        let bad = ContentRepository::from_sources(
            Vec::<(String, String)>::new(),
            &LoadOptions::posts().with_ignore_patterns(vec!["(".into()]),
        );
        assert!(matches!(bad, Err(RepositoryError::IgnorePattern { .. })));
    }

    #[test]
    fn test_derived_fields() {
        let repo = repo(
            vec![(
                "2021-03-04-hello-world.mdx",
                "---\ntitle: Hello\ndate: 2021-03-04\n---\nimport X from './x'\n\n## Intro\n\nText\n"
                    .to_string(),
            )],
            &LoadOptions::posts(),
        );
        let doc = repo.get_document("hello-world").unwrap();
        assert_eq!(doc.url(), "/2021/03/04/hello-world/");
        assert_eq!(doc.reading_time, 1);
        assert_eq!(doc.headings[0].id, "intro");
        assert!(doc.show_toc);
        assert!(doc.defaulted.contains(&"showToc"));
    }
}
