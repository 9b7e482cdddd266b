//! Listing commands: posts and tags.

use super::site::{load_config, load_site};
use crate::agent;
use anyhow::Result;
use quire_core::{PostMeta, Strictness, Visibility};
use std::path::Path;

/// Print one page of the post listing, optionally restricted to a tag
pub fn list_posts(
    config_path: &Path,
    page: usize,
    tag: Option<&str>,
    visibility: Visibility,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let repo = load_site(&config, visibility, Strictness::Lenient)?;

    match tag {
        Some(tag) => {
            let mut tag_page = repo.get_by_tag(tag, page, config.page_size);
            config.rebase_posts(&mut tag_page.posts);
            if json {
                let payload = agent::envelope("posts.tag", &tag_page);
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }
            println!(
                "Tag '{}': {} posts, page {}/{}\n",
                tag_page.display, tag_page.total_posts, tag_page.current_page, tag_page.total_pages
            );
            print_posts(&tag_page.posts);
        }
        None => {
            let mut listing = repo.paginate(page, config.page_size);
            config.rebase_posts(&mut listing.posts);
            if json {
                let payload = agent::envelope("posts.page", &listing);
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }
            println!(
                "{} posts, page {}/{}\n",
                listing.total_posts, listing.current_page, listing.total_pages
            );
            print_posts(&listing.posts);
        }
    }

    Ok(())
}

fn print_posts(posts: &[PostMeta]) {
    if posts.is_empty() {
        println!("  (no posts on this page)");
        return;
    }
    for post in posts {
        let date = post
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let draft = if post.draft { " [draft]" } else { "" };
        println!("{}  {}{}", date, post.title, draft);
        println!("            {}", post.url);
    }
}

/// Print every tag with its post count
pub fn list_tags(config_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let repo = load_site(&config, Visibility::PublishedOnly, Strictness::Lenient)?;
    let buckets = repo.tag_buckets();

    if json {
        let payload = agent::envelope("tags.list", &buckets);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for bucket in &buckets {
        println!("{:>4}  {}  (/tag/{}/)", bucket.count, bucket.display, bucket.slug);
    }
    Ok(())
}
