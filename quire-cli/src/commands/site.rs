//! Loading the posts and pages collections described by a config file.

use anyhow::{Context, Result};
use quire_core::{Config, ContentRepository, LoadOptions, Strictness, Visibility};
use std::path::Path;

pub fn load_config(config_path: &Path) -> Result<Config> {
    tracing::debug!("Loading config from {:?}", config_path);
    Config::from_file(config_path).context("Failed to load configuration")
}

/// Load posts and, when the directory exists, pages into one snapshot.
pub fn load_site(
    config: &Config,
    visibility: Visibility,
    strictness: Strictness,
) -> Result<ContentRepository> {
    let options = LoadOptions::posts()
        .with_visibility(visibility)
        .with_strictness(strictness)
        .with_ignore_patterns(config.ignore_patterns.clone());

    let posts_dir = config.posts_dir();
    let posts = ContentRepository::load(&posts_dir, &options)
        .with_context(|| format!("Failed to load posts from {:?}", posts_dir))?;

    let pages_dir = config.pages_dir();
    if !pages_dir.is_dir() {
        return Ok(posts);
    }

    let page_options = LoadOptions {
        collection: quire_core::Collection::Pages,
        ..options
    };
    let pages = ContentRepository::load(&pages_dir, &page_options)
        .with_context(|| format!("Failed to load pages from {:?}", pages_dir))?;

    Ok(posts.merge(pages))
}
