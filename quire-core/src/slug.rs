//! Slug generation: document slugs, heading ids and tag slugs.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static DATE_PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();
static HYPHEN_RUN_REGEX: OnceLock<Regex> = OnceLock::new();
static TAG_UNSAFE_REGEX: OnceLock<Regex> = OnceLock::new();

fn date_prefix_regex() -> &'static Regex {
    DATE_PREFIX_REGEX.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}-").unwrap())
}

fn hyphen_run_regex() -> &'static Regex {
    HYPHEN_RUN_REGEX.get_or_init(|| Regex::new(r"-+").unwrap())
}

fn tag_unsafe_regex() -> &'static Regex {
    TAG_UNSAFE_REGEX.get_or_init(|| Regex::new(r"[^a-z0-9-]+").unwrap())
}

/// Convert heading text to an anchor id
///
/// Rules:
/// - Lowercase
/// - Whitespace and underscores become hyphens
/// - Punctuation is stripped, unicode letters are kept
/// - Hyphen runs collapse and are trimmed from both ends
///
/// # Examples
///
/// ```
/// use quire_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("What's new?"), "whats-new");
/// assert_eq!(slugify("C++ Programming"), "c-programming");
/// ```
pub fn slugify(input: &str) -> String {
    let cleaned = input
        .to_lowercase()
        .graphemes(true)
        .filter_map(|g| {
            let c = g.chars().next()?;
            if c.is_whitespace() || c == '_' {
                Some("-")
            } else if c.is_alphanumeric() || c == '-' {
                Some(g)
            } else {
                None
            }
        })
        .collect::<String>();

    hyphen_run_regex()
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

/// Derive the canonical slug of a content file.
///
/// An explicit frontmatter slug wins. Otherwise the file stem is used with a
/// leading `YYYY-MM-DD-` prefix removed. No further normalization happens, so
/// apostrophes, ampersands and mixed case survive verbatim.
///
/// ```
/// use quire_core::slug::derive_slug;
///
/// assert_eq!(derive_slug("2021-03-04-Hello-World.mdx", None), "Hello-World");
/// assert_eq!(derive_slug("2021-03-04-hello.md", Some("custom")), "custom");
/// ```
pub fn derive_slug(filename: &str, frontmatter_slug: Option<&str>) -> String {
    if let Some(explicit) = frontmatter_slug.map(str::trim).filter(|s| !s.is_empty()) {
        return explicit.to_string();
    }

    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    let stem = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };

    date_prefix_regex().replace(stem, "").into_owned()
}

/// Canonical, URL-safe form of a tag.
///
/// Lowercases, then replaces every run of characters outside `[a-z0-9-]`
/// with a single hyphen. Distinct tags may collide (`"C#"` and `"C"` both
/// become `"c"`); such collisions share one bucket.
///
/// ```
/// use quire_core::create_tag_slug;
///
/// assert_eq!(create_tag_slug("D&D 5e"), "d-d-5e");
/// assert_eq!(create_tag_slug("Rust"), "rust");
/// ```
pub fn create_tag_slug(tag: &str) -> String {
    let lowered = tag.trim().to_lowercase();
    let replaced = tag_unsafe_regex().replace_all(&lowered, "-");
    hyphen_run_regex()
        .replace_all(&replaced, "-")
        .trim_matches('-')
        .to_string()
}
