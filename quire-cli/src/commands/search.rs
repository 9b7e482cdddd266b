//! Search command implementation.

use super::site::load_config;
use crate::agent;
use anyhow::{bail, Context, Result};
use quire_core::search::read_search_index;
use quire_core::{Config, SearchEngine, SearchResult};
use std::path::Path;

/// Search the built search index
pub fn search_site(config_path: &Path, query: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let index_path = config.search_index_path();

    if !index_path.exists() {
        bail!(
            "Search index not found at {:?}. Run `quire build` first.",
            index_path
        );
    }

    let records = read_search_index(&index_path).context("Failed to load search index")?;
    let engine = SearchEngine::new(records);
    let limit = limit.unwrap_or(config.search.limit);

    // Rank everything so the total is known, then cut to the limit
    let options = config.search.options().with_limit(usize::MAX);
    let mut results = engine.search(query, &options);
    let total = results.len();
    results.truncate(limit);

    if json {
        let payload = agent::envelope(
            "search.results",
            agent::SearchData {
                query: query.to_string(),
                limit,
                total,
                results: results
                    .iter()
                    .map(|r| agent::search_hit(&config, r))
                    .collect(),
            },
        );
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if total == 0 {
        println!("No results found for '{}'", query);
        return Ok(());
    }
    if results.is_empty() {
        println!("Found {} results for '{}' (limit {}, none shown)", total, query, limit);
        return Ok(());
    }

    println!("\n🔍 Found {} results for '{}':\n", total, query);
    for result in &results {
        print_search_result(&config, result);
    }
    if total > results.len() {
        println!("  ... and {} more results", total - results.len());
    }

    Ok(())
}

fn print_search_result(config: &Config, result: &SearchResult) {
    let item = &result.item;
    let date = if item.date.is_empty() {
        "page".to_string()
    } else {
        item.date.clone()
    };
    println!("[{}] {}  (score {:.3})", date, item.title, result.score);
    println!("  {}", config.site_url(&item.url()));
    if !item.excerpt.is_empty() {
        println!("  {}", item.excerpt);
    }
    println!();
}
