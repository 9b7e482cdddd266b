//! Content model: documents, listing projections and tags.

use crate::slug::create_tag_slug;
use crate::url::{derive_url, Route};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which content collection a document belongs to. Slugs are unique within
/// a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    #[default]
    Posts,
    Pages,
}

impl Collection {
    /// Posts live under date-partitioned URLs and need a date.
    pub fn requires_date(&self) -> bool {
        matches!(self, Collection::Posts)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Posts => "posts",
            Collection::Pages => "pages",
        }
    }
}

/// Draft visibility policy, chosen explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// Drafts included (local previews)
    All,
    /// Drafts excluded (anything that ships)
    #[default]
    PublishedOnly,
}

impl Visibility {
    pub fn shows(&self, draft: bool) -> bool {
        match self {
            Visibility::All => true,
            Visibility::PublishedOnly => !draft,
        }
    }
}

/// How per-document failures are handled while loading a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Skip the document, record the failure, keep going
    #[default]
    Lenient,
    /// Abort the load on the first failure
    Strict,
}

/// A tag as authored plus its canonical matching key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Authored form, used for display
    pub display: String,
    /// `create_tag_slug(display)`, used for matching and URLs
    pub key: String,
}

impl Tag {
    pub fn new(display: impl Into<String>) -> Self {
        let display = display.into();
        let key = create_tag_slug(&display);
        Self { display, key }
    }

    /// Case-insensitive match against an authored tag or a URL segment.
    ///
    /// Tags without any URL-safe character have an empty key and match
    /// nothing, not even themselves.
    pub fn matches(&self, tag: &str) -> bool {
        self.is_indexed() && self.key == create_tag_slug(tag)
    }

    /// Whether the tag gets a bucket and a `/tag/` page.
    pub fn is_indexed(&self) -> bool {
        !self.key.is_empty()
    }

    pub fn url(&self) -> String {
        Route::Tag {
            tag: self.key.clone(),
            page: 1,
        }
        .path()
    }
}

/// Heading entry for tables of contents and anchor links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// 1-6, mirrors the markup level
    pub depth: u8,
    pub text: String,
    /// Unique within the document
    pub id: String,
}

/// One content file with parsed metadata and body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub slug: String,
    pub collection: Collection,
    pub title: String,
    #[serde(with = "iso_date_opt")]
    pub date: Option<NaiveDate>,
    pub excerpt: Option<String>,
    pub tags: Vec<Tag>,
    pub draft: bool,
    pub featured_image: Option<String>,
    pub show_toc: bool,
    pub body: String,
    /// Minutes, derived from the body word count
    pub reading_time: u32,
    pub headings: Vec<Heading>,
    /// Path relative to the content root
    pub source_path: String,
    /// Optional frontmatter keys that received defaults
    #[serde(skip)]
    pub defaulted: Vec<&'static str>,
}

impl Document {
    /// Canonical URL of this document.
    pub fn url(&self) -> String {
        self.route().path()
    }

    pub fn route(&self) -> Route {
        match (self.collection, self.date) {
            (Collection::Posts, Some(date)) => Route::Post {
                date,
                slug: self.slug.clone(),
            },
            _ => Route::Page(self.slug.clone()),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.matches(tag))
    }

    pub fn meta(&self) -> PostMeta {
        PostMeta {
            slug: self.slug.clone(),
            collection: self.collection,
            title: self.title.clone(),
            date: self.date,
            url: self.url(),
            excerpt: self.excerpt.clone(),
            tags: self.tags.clone(),
            draft: self.draft,
            featured_image: self.featured_image.clone(),
            show_toc: self.show_toc,
            reading_time: self.reading_time,
            headings: self.headings.clone(),
        }
    }
}

/// Listing projection of a [`Document`] without its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    pub slug: String,
    pub collection: Collection,
    pub title: String,
    #[serde(with = "iso_date_opt")]
    pub date: Option<NaiveDate>,
    pub url: String,
    pub excerpt: Option<String>,
    pub tags: Vec<Tag>,
    pub draft: bool,
    pub featured_image: Option<String>,
    pub show_toc: bool,
    pub reading_time: u32,
    pub headings: Vec<Heading>,
}

impl PostMeta {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.matches(tag))
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedPosts {
    pub posts: Vec<PostMeta>,
    pub total_pages: usize,
    pub current_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    /// Size of the whole filtered corpus, not of this page
    pub total_posts: usize,
}

/// One page of a tag listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagPage {
    /// Canonical tag slug of the bucket
    pub tag: String,
    /// First authored form seen for the bucket, or the query when empty
    pub display: String,
    pub posts: Vec<PostMeta>,
    pub total_pages: usize,
    pub current_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    /// Exact number of documents carrying the tag
    pub total_posts: usize,
}

/// Entry of the `/tags/` overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    pub slug: String,
    pub display: String,
    pub count: usize,
}

/// Serialize optional dates as `YYYY-MM-DD` strings, matching the stored form.
pub(crate) mod iso_date_opt {
    use crate::url::{format_iso_date, parse_iso_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&format_iso_date(*d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_iso_date(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
