//! Configuration parsing and management.

use crate::models::PostMeta;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::search::engine::{DEFAULT_LIMIT, DEFAULT_THRESHOLD, TYPEAHEAD_LIMIT};
use crate::search::SearchOptions;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "quire.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct matching the quire.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub search: SearchConfig,

    /// Regexes matched against paths relative to the content directory
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    String::from("/")
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_content_dir")]
    pub content: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content: default_content_dir(),
            output: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default = "default_typeahead_limit")]
    pub typeahead_limit: usize,

    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_typeahead_limit() -> usize {
    TYPEAHEAD_LIMIT
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            typeahead_limit: default_typeahead_limit(),
            threshold: default_threshold(),
        }
    }
}

impl SearchConfig {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            limit: self.limit,
            threshold: self.threshold,
        }
    }

    pub fn typeahead_options(&self) -> SearchOptions {
        SearchOptions {
            limit: self.typeahead_limit,
            threshold: self.threshold,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Invalid("site.title must not be empty".into()));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.search.threshold) {
            return Err(ConfigError::Invalid(format!(
                "search.threshold must be within 0..=1, got {}",
                self.search.threshold
            )));
        }
        for pattern in &self.ignore_patterns {
            Regex::new(pattern).map_err(|e| {
                ConfigError::Invalid(format!("ignore pattern '{}': {}", pattern, e))
            })?;
        }
        Ok(())
    }

    /// Content root, resolved relative to config file
    pub fn content_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.content)
    }

    /// Dated posts live under `content/posts`
    pub fn posts_dir(&self) -> PathBuf {
        self.content_dir().join("posts")
    }

    /// Standalone pages live under `content/pages`; the directory is optional
    pub fn pages_dir(&self) -> PathBuf {
        self.content_dir().join("pages")
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    pub fn search_index_path(&self) -> PathBuf {
        self.output_dir().join("search-index.json")
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(parent) = self.config_path.as_deref().and_then(Path::parent) {
            parent.join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Normalized base URL with leading and trailing slash ("/foo/" or "/")
    pub fn normalized_base_url(&self) -> String {
        normalize_base_url(&self.base_url)
    }

    /// Public URL of a site path, with `base_url` prefixed.
    ///
    /// Routing works on unprefixed paths; only emitted links carry the base.
    pub fn site_url(&self, path: &str) -> String {
        let base = self.normalized_base_url();
        format!("{}{}", base.trim_end_matches('/'), path)
    }

    /// Rewrite listing URLs into public ones before they leave the process.
    pub fn rebase_posts(&self, posts: &mut [PostMeta]) {
        for post in posts {
            post.url = self.site_url(&post.url);
        }
    }
}

/// Ensure base URLs have a leading and trailing slash
pub fn normalize_base_url(raw: &str) -> String {
    let segments: Vec<&str> = raw.trim().split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}
