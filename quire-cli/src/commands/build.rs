//! Build command implementation.

use super::site::{load_config, load_site};
use anyhow::{Context, Result};
use quire_core::search::write_search_index;
use quire_core::{Config, ContentRepository, Route, Strictness, Visibility};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load the content and write the JSON artifacts to the output directory
pub fn build_site(config_path: &Path, visibility: Visibility, strict: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let strictness = if strict {
        Strictness::Strict
    } else {
        Strictness::Lenient
    };

    tracing::info!("Building site: {}", config.site.title);
    let repo = load_site(&config, visibility, strictness)?;
    let summary = write_artifacts(&config, &repo)?;

    println!(
        "✓ Built {} documents ({} routes, {} tags, {} search records) into {:?}",
        repo.len(),
        summary.routes,
        summary.tags,
        summary.records,
        config.output_dir()
    );
    if !repo.failures().is_empty() {
        println!("  {} documents skipped, run `quire verify` for details", repo.failures().len());
    }
    Ok(())
}

pub struct BuildSummary {
    pub routes: usize,
    pub tags: usize,
    pub records: usize,
}

#[derive(Serialize)]
struct RouteEntry {
    path: String,
    /// `path` with `base_url` prefixed
    url: String,
    kind: &'static str,
}

/// Site metadata for templates and feeds.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteManifest<'a> {
    title: &'a str,
    author: &'a str,
    description: &'a str,
    url: &'a str,
    base_url: String,
    page_size: usize,
}

/// Write `search-index.json`, `routes.json`, `tags.json` and `site.json`.
pub fn write_artifacts(config: &Config, repo: &ContentRepository) -> Result<BuildSummary> {
    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    let records = repo.search_records();
    write_search_index(&config.search_index_path(), &records)
        .context("Failed to write search index")?;

    let routes: Vec<RouteEntry> = repo
        .routes(config.page_size)
        .iter()
        .map(|route| RouteEntry {
            path: route.path(),
            url: config.site_url(&route.path()),
            kind: route_kind(route),
        })
        .collect();
    write_json(&output_dir.join("routes.json"), &routes)?;

    let tags = repo.tag_buckets();
    write_json(&output_dir.join("tags.json"), &tags)?;

    let manifest = SiteManifest {
        title: &config.site.title,
        author: &config.site.author,
        description: &config.site.description,
        url: &config.site.url,
        base_url: config.normalized_base_url(),
        page_size: config.page_size,
    };
    write_json(&output_dir.join("site.json"), &manifest)?;

    tracing::info!(
        "Wrote {} search records, {} routes and {} tags",
        records.len(),
        routes.len(),
        tags.len()
    );

    Ok(BuildSummary {
        routes: routes.len(),
        tags: tags.len(),
        records: records.len(),
    })
}

fn route_kind(route: &Route) -> &'static str {
    match route {
        Route::Listing(_) => "listing",
        Route::Post { .. } => "post",
        Route::Page(_) => "page",
        Route::Tags => "tags",
        Route::Tag { .. } => "tag",
        Route::Search { .. } => "search",
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}
