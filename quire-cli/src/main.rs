//! # quire CLI
//!
//! Command-line interface for the quire blog content index.

mod agent;
mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use quire_core::Visibility;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "quire.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new quire project
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Load the content and write the search index, routes and tags
    Build {
        /// Which documents to include
        #[arg(long, value_enum, default_value_t = VisibilityArg::PublishedOnly)]
        visibility: VisibilityArg,

        /// Abort on the first invalid document
        #[arg(long)]
        strict: bool,
    },

    /// List posts, newest first
    List {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Only posts carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Which documents to include
        #[arg(long, value_enum, default_value_t = VisibilityArg::PublishedOnly)]
        visibility: VisibilityArg,

        /// Return JSON for machine consumption
        #[arg(long)]
        json: bool,
    },

    /// List tags with post counts
    Tags {
        /// Return JSON for machine consumption
        #[arg(long)]
        json: bool,
    },

    /// Show a single document by slug or URL
    Show {
        /// Slug (`hello-world`) or site URL (`/2021/03/04/hello-world/`)
        target: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = ShowFormat::Json)]
        format: ShowFormat,
    },

    /// Search the built search index
    Search {
        /// Search query
        query: String,

        /// Maximum results to return (defaults to search.limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Return JSON for machine consumption
        #[arg(long)]
        json: bool,
    },

    /// Validate every content file and report failures
    Verify {
        /// Exit with an error when any document fails
        #[arg(long)]
        strict: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Serve the JSON API with live rebuilds
    Serve {
        /// Server port (defaults to server.port)
        #[arg(long)]
        port: Option<u16>,

        /// Which documents to include
        #[arg(long, value_enum, default_value_t = VisibilityArg::All)]
        visibility: VisibilityArg,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Build { visibility, strict } => {
            commands::build_site(&cli.config, visibility.into(), strict)
        }
        Commands::List {
            page,
            tag,
            visibility,
            json,
        } => commands::list_posts(&cli.config, page, tag.as_deref(), visibility.into(), json),
        Commands::Tags { json } => commands::list_tags(&cli.config, json),
        Commands::Show { target, format } => commands::show_document(&cli.config, &target, format),
        Commands::Search { query, limit, json } => {
            commands::search_site(&cli.config, &query, limit, json)
        }
        Commands::Verify { strict, json } => commands::verify_site(&cli.config, strict, json),
        Commands::Serve { port, visibility } => {
            commands::serve(&cli.config, port, visibility.into()).await
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub enum ShowFormat {
    Json,
    Markdown,
    Headings,
}

#[derive(Copy, Clone, ValueEnum)]
pub enum VisibilityArg {
    /// Include drafts
    All,
    /// Exclude drafts
    PublishedOnly,
}

impl From<VisibilityArg> for Visibility {
    fn from(arg: VisibilityArg) -> Self {
        match arg {
            VisibilityArg::All => Visibility::All,
            VisibilityArg::PublishedOnly => Visibility::PublishedOnly,
        }
    }
}
