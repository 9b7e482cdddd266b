//! Fetch a single document in structured form.

use super::site::{load_config, load_site};
use crate::{agent, ShowFormat};
use anyhow::{Context, Result};
use quire_core::{ContentRepository, Document, Frontmatter, Route, RouteTarget, Strictness, Visibility};
use std::path::Path;

/// Show a document by slug or site URL
pub fn show_document(config_path: &Path, target: &str, format: ShowFormat) -> Result<()> {
    let config = load_config(config_path)?;
    let repo = load_site(&config, Visibility::All, Strictness::Lenient)?;

    let document = find_document(&repo, target, config.page_size)
        .with_context(|| format!("Document '{}' not found (slug or URL)", target))?;

    match format {
        ShowFormat::Json => {
            let payload =
                agent::envelope("document.full", agent::document_payload(&config, document));
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        ShowFormat::Markdown => {
            let fm = serde_yaml::to_string(&frontmatter_of(document))?;
            println!("---\n{}---\n{}", fm, document.body);
        }
        ShowFormat::Headings => {
            println!("{}", agent::heading_outline(&document.headings));
        }
    }

    Ok(())
}

/// URLs go through the router (dates must match), anything else is a slug.
fn find_document<'a>(
    repo: &'a ContentRepository,
    target: &str,
    page_size: usize,
) -> Option<&'a Document> {
    let target = target.trim();
    if target.starts_with('/') {
        return match repo.resolve_route(&Route::parse(target)?, page_size) {
            RouteTarget::Document(doc) => Some(doc),
            _ => None,
        };
    }
    repo.get_document(target)
}

fn frontmatter_of(document: &Document) -> Frontmatter {
    Frontmatter {
        title: Some(document.title.clone()),
        date: document.date.map(|d| d.format("%Y-%m-%d").to_string()),
        slug: Some(document.slug.clone()),
        excerpt: document.excerpt.clone(),
        tags: Some(document.tags.iter().map(|t| t.display.clone()).collect()),
        draft: Some(document.draft),
        featured_image: document.featured_image.clone(),
        show_toc: Some(document.show_toc),
    }
}
