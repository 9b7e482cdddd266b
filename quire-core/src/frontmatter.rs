//! Frontmatter parsing and validation.
//!
//! Parsing is split in two steps: [`split_document`] separates the `---`
//! delimited YAML block from the body and returns raw key/value data, then
//! [`Frontmatter::from_metadata`] reads the recognized keys. Required-field
//! checks live in [`Frontmatter::validate`] so callers decide whether a
//! failure skips one document or aborts the build.

use crate::models::Collection;
use crate::url::{parse_iso_date, DateError};
use chrono::NaiveDate;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Metadata block opened on line 1 is never closed with '---'")]
    Unterminated,

    #[error("Metadata block must be a mapping of keys to values")]
    NotAMapping,

    #[error("Field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date '{value}': {source}")]
    InvalidDate { value: String, source: DateError },

    #[error("Slug '{0}' collides with a site route")]
    ReservedSlug(String),
}

/// Metadata block and body of a content file, before interpretation.
#[derive(Debug, Clone, Default)]
pub struct RawDocument {
    pub metadata: Mapping,
    pub body: String,
}

/// Split a content file into its metadata block and body.
///
/// A file that does not open with a `---` line has no metadata and the
/// whole text becomes the body.
///
/// ```
/// use quire_core::frontmatter::split_document;
///
/// let raw = split_document("---\ntitle: Hi\n---\nBody\n").unwrap();
/// assert_eq!(raw.metadata.len(), 1);
/// assert_eq!(raw.body, "Body\n");
/// ```
pub fn split_document(content: &str) -> Result<RawDocument, FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some(after_open) = strip_delimiter_line(content) else {
        return Ok(RawDocument {
            metadata: Mapping::new(),
            body: content.to_string(),
        });
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok(RawDocument {
                metadata: parse_mapping(yaml)?,
                body: body.to_string(),
            });
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

fn strip_delimiter_line(content: &str) -> Option<&str> {
    let (first, rest) = match content.find('\n') {
        Some(pos) => (&content[..pos], &content[pos + 1..]),
        None => (content, ""),
    };
    (first.trim_end() == DELIMITER).then_some(rest)
}

fn parse_mapping(yaml: &str) -> Result<Mapping, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Recognized frontmatter keys. Absent keys stay `None` so validation can
/// report which defaults were applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,

    #[serde(rename = "showToc", skip_serializing_if = "Option::is_none")]
    pub show_toc: Option<bool>,
}

/// Frontmatter after required-field validation and defaulting.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFrontmatter {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub draft: bool,
    pub featured_image: Option<String>,
    pub show_toc: bool,
    /// Optional keys that were absent and received their default
    pub defaulted: Vec<&'static str>,
}

impl Frontmatter {
    /// Read recognized keys from a metadata block. Unknown keys are ignored.
    pub fn from_metadata(metadata: &Mapping) -> Result<Self, FrontmatterError> {
        Ok(Self {
            title: string_field(metadata, &["title"], "title")?,
            date: string_field(metadata, &["date"], "date")?,
            slug: string_field(metadata, &["slug"], "slug")?,
            excerpt: string_field(metadata, &["excerpt"], "excerpt")?,
            tags: tags_field(metadata)?,
            draft: bool_field(metadata, &["draft"], "draft")?,
            featured_image: string_field(
                metadata,
                &["featured_image", "featuredImage"],
                "featured_image",
            )?,
            show_toc: bool_field(metadata, &["showToc", "show_toc"], "showToc")?,
        })
    }

    /// Check required fields for `collection` and apply defaults.
    pub fn validate(&self, collection: Collection) -> Result<ValidatedFrontmatter, ValidationError> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingField("title"))?
            .to_string();

        let date = match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => Some(parse_iso_date(raw).map_err(|source| {
                ValidationError::InvalidDate {
                    value: raw.to_string(),
                    source,
                }
            })?),
            None if collection.requires_date() => {
                return Err(ValidationError::MissingField("date"))
            }
            None => None,
        };

        Ok(ValidatedFrontmatter {
            title,
            date,
            slug: self.slug.clone(),
            excerpt: self
                .excerpt
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
            tags: self.tags.clone().unwrap_or_default(),
            draft: self.draft.unwrap_or(false),
            featured_image: self.featured_image.clone(),
            show_toc: self.show_toc.unwrap_or(true),
            defaulted: self.defaulted_fields(),
        })
    }

    /// Names of optional keys that are absent from the metadata block.
    pub fn defaulted_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.slug.is_none() {
            fields.push("slug");
        }
        if self.excerpt.is_none() {
            fields.push("excerpt");
        }
        if self.tags.is_none() {
            fields.push("tags");
        }
        if self.draft.is_none() {
            fields.push("draft");
        }
        if self.featured_image.is_none() {
            fields.push("featured_image");
        }
        if self.show_toc.is_none() {
            fields.push("showToc");
        }
        fields
    }
}

/// Split and interpret a content file in one step.
///
/// ```
/// use quire_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: My Post\ndate: 2025-01-01\n---\n# Hello World\n";
///
/// let (fm, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(fm.title.as_deref(), Some("My Post"));
/// assert_eq!(fm.date.as_deref(), Some("2025-01-01"));
/// assert!(body.trim().starts_with("# Hello World"));
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let raw = split_document(content)?;
    let frontmatter = Frontmatter::from_metadata(&raw.metadata)?;
    Ok((frontmatter, raw.body))
}

fn lookup<'a>(metadata: &'a Mapping, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| metadata.get(*key))
        .filter(|value| !value.is_null())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

fn string_field(
    metadata: &Mapping,
    keys: &[&str],
    field: &'static str,
) -> Result<Option<String>, FrontmatterError> {
    lookup(metadata, keys)
        .map(|value| {
            scalar_to_string(value).ok_or(FrontmatterError::InvalidField {
                field,
                expected: "a string",
            })
        })
        .transpose()
}

fn bool_field(
    metadata: &Mapping,
    keys: &[&str],
    field: &'static str,
) -> Result<Option<bool>, FrontmatterError> {
    lookup(metadata, keys)
        .map(|value| {
            value.as_bool().ok_or(FrontmatterError::InvalidField {
                field,
                expected: "a boolean",
            })
        })
        .transpose()
}

fn tags_field(metadata: &Mapping) -> Result<Option<Vec<String>>, FrontmatterError> {
    let invalid = FrontmatterError::InvalidField {
        field: "tags",
        expected: "a list of strings",
    };

    let Some(value) = lookup(metadata, &["tags"]) else {
        return Ok(None);
    };

    let raw: Vec<String> = match value {
        Value::Sequence(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Option<Vec<_>>>()
            .ok_or(invalid)?,
        // `tags: rust, wasm` is shorthand for a list
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => return Err(invalid),
    };

    Ok(Some(
        raw.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_frontmatter() {
        let content = r#"---
title: Test Post
excerpt: A test post
date: 2025-01-01
---

# Hello World

This is the content."#;

        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Test Post"));
        assert_eq!(fm.excerpt.as_deref(), Some("A test post"));
        assert_eq!(fm.date.as_deref(), Some("2025-01-01"));
        assert!(body.contains("# Hello World"));
        assert!(body.contains("This is the content."));
    }

    #[test]
    fn test_no_frontmatter_returns_whole_body() {
        let content = "# Just Content\n\nNo frontmatter here.";
        let raw = split_document(content).unwrap();
        assert!(raw.metadata.is_empty());
        assert_eq!(raw.body, content);
    }

    #[test]
    fn test_unterminated_block() {
        let content = "---\ntitle: Oops\n\nBody without closing delimiter";
        assert!(matches!(
            split_document(content),
            Err(FrontmatterError::Unterminated)
        ));
    }

    #[test]
    fn test_crlf_and_bom() {
        let content = "\u{feff}---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_empty_block() {
        let raw = split_document("---\n---\nBody").unwrap();
        assert!(raw.metadata.is_empty());
        assert_eq!(raw.body, "Body");
    }

    #[test]
    fn test_invalid_yaml() {
        let content = "---\ntitle: Test\ninvalid yaml: [unclosed\n---\n\nContent.";
        assert!(matches!(
            split_document(content),
            Err(FrontmatterError::Yaml(_))
        ));
    }

    #[test]
    fn test_non_mapping_block() {
        let content = "---\n- a\n- b\n---\nBody";
        assert!(matches!(
            split_document(content),
            Err(FrontmatterError::NotAMapping)
        ));
    }

    #[test]
    fn test_tags_list_and_shorthand() {
        let (fm, _) = parse_frontmatter("---\ntitle: T\ntags:\n  - rust\n  - D&D 5e\n---\n").unwrap();
        assert_eq!(fm.tags, Some(vec!["rust".to_string(), "D&D 5e".to_string()]));

        let (fm, _) = parse_frontmatter("---\ntitle: T\ntags: rust, wasm\n---\n").unwrap();
        assert_eq!(fm.tags, Some(vec!["rust".to_string(), "wasm".to_string()]));
    }

    #[test]
    fn test_wrong_scalar_types() {
        let result = parse_frontmatter("---\ntitle: T\ndraft: maybe\n---\n");
        assert!(matches!(
            result,
            Err(FrontmatterError::InvalidField { field: "draft", .. })
        ));

        let result = parse_frontmatter("---\ntitle: T\ntags: {a: b}\n---\n");
        assert!(matches!(
            result,
            Err(FrontmatterError::InvalidField { field: "tags", .. })
        ));
    }

    #[test]
    fn test_numeric_title_is_kept_as_text() {
        let (fm, _) = parse_frontmatter("---\ntitle: 1984\n---\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("1984"));
    }

    #[test]
    fn test_key_aliases() {
        let (fm, _) =
            parse_frontmatter("---\ntitle: T\nfeaturedImage: /a.png\nshow_toc: false\n---\n")
                .unwrap();
        assert_eq!(fm.featured_image.as_deref(), Some("/a.png"));
        assert_eq!(fm.show_toc, Some(false));
    }

    #[test]
    fn test_validate_post_requires_title_and_date() {
        let missing_title = Frontmatter {
            date: Some("2020-01-01".into()),
            ..Default::default()
        };
        assert_eq!(
            missing_title.validate(Collection::Posts),
            Err(ValidationError::MissingField("title"))
        );

        let blank_title = Frontmatter {
            title: Some("   ".into()),
            date: Some("2020-01-01".into()),
            ..Default::default()
        };
        assert_eq!(
            blank_title.validate(Collection::Posts),
            Err(ValidationError::MissingField("title"))
        );

        let missing_date = Frontmatter {
            title: Some("T".into()),
            ..Default::default()
        };
        assert_eq!(
            missing_date.validate(Collection::Posts),
            Err(ValidationError::MissingField("date"))
        );
        assert!(missing_date.validate(Collection::Pages).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_date() {
        let fm = Frontmatter {
            title: Some("T".into()),
            date: Some("2020-02-31".into()),
            ..Default::default()
        };
        assert!(matches!(
            fm.validate(Collection::Posts),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_validate_reports_defaults() {
        let fm = Frontmatter {
            title: Some("T".into()),
            date: Some("2020-01-01".into()),
            draft: Some(true),
            ..Default::default()
        };
        let validated = fm.validate(Collection::Posts).unwrap();
        assert!(validated.draft);
        assert!(validated.show_toc);
        assert!(validated.tags.is_empty());
        assert!(validated.defaulted.contains(&"showToc"));
        assert!(validated.defaulted.contains(&"tags"));
        assert!(!validated.defaulted.contains(&"draft"));
    }
}
