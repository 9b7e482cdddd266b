//! Init command implementation.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("../../../quire.yml.example");

/// Initialize a new quire project
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_config(root)?;
    scaffold_content(root)?;

    println!("✓ quire initialized in {:?}", root);
    println!("  - Edit quire.yml to customize site metadata");
    println!("  - Write posts in content/posts/ as YYYY-MM-DD-slug.md");
    Ok(())
}

fn write_config(root: &Path) -> Result<()> {
    let config_path = root.join("quire.yml");
    if config_path.exists() {
        println!("quire.yml already exists at {:?}", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("Created {:?}", config_path);
    Ok(())
}

fn scaffold_content(root: &Path) -> Result<()> {
    let posts = root.join("content").join("posts");
    let pages = root.join("content").join("pages");

    for dir in [&posts, &pages] {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }

    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let sample = posts.join(format!("{}-hello-world.md", today));
    if !sample.exists() {
        fs::write(&sample, sample_post(&today))?;
        println!("Created {:?}", sample);
    }

    let about = pages.join("about.md");
    if !about.exists() {
        fs::write(&about, ABOUT_PAGE)?;
        println!("Created {:?}", about);
    }

    Ok(())
}

fn sample_post(date: &str) -> String {
    format!(
        r#"---
title: Hello, world
date: {date}
excerpt: The first post on this blog.
tags: [meta, intro]
---

# Hello, world

Edit `quire.yml` to update site metadata, then run:

```bash
quire build
quire serve
```

## Writing posts

Name files `YYYY-MM-DD-slug.md` (or `.mdx`). Set `draft: true` to keep a post
out of published builds.
"#
    )
}

const ABOUT_PAGE: &str = r#"---
title: About
showToc: false
---

A few words about the author.
"#;
