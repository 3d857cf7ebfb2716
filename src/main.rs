//! # Folio CLI (`folio`)
//!
//! ## Usage
//!
//! ```bash
//! folio --config ./config/folio.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `folio init` | Create the SQLite database and run schema migrations |
//! | `folio refresh` | Render all articles and rebuild the search index |
//! | `folio list` | List visible articles |
//! | `folio get <slug>` | Print one article |
//! | `folio search "<term>"` | Ranked full-text search |
//! | `folio author <handle>` | Print an author record |
//! | `folio serve` | Start the HTTP JSON API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use folio::config;
use folio::db;
use folio::logging;
use folio::migrate;
use folio::search;
use folio::server;
use folio::service::ContentService;
use folio::sort::SortKey;

/// Folio: markdown content service with ranked full-text search.
#[derive(Parser)]
#[command(name = "folio", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/folio.toml")]
    config: PathBuf,

    /// Authoring mode: show drafts and re-read the content tree on every read.
    /// Overrides `content.authoring`.
    #[arg(long, global = true)]
    authoring: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Render every article and rebuild the search index.
    Refresh,

    /// List visible articles.
    List {
        /// `date` (newest first) or `popular` (most viewed first).
        #[arg(long, default_value = "date")]
        sort: SortKey,
    },

    /// Print an article's metadata and rendered HTML.
    Get {
        slug: String,
    },

    /// Search articles by title, subtitle, and body.
    Search {
        term: String,
    },

    /// Print an author record. A leading `@` is optional.
    Author {
        handle: String,
    },

    /// Start the HTTP JSON API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config(&cli.config)?;
    if cli.authoring {
        cfg.content.authoring = true;
    }

    logging::init(cfg.content.authoring);

    let pool = db::connect(&cfg.db).await?;

    migrate::run_migrations(&pool).await?;

    if let Commands::Init = cli.command {
        println!("Database initialized successfully.");
        pool.close().await;
        return Ok(());
    }

    let service = ContentService::open(&cfg, pool.clone()).await?;

    match cli.command {
        Commands::Init => {}
        Commands::Refresh => {
            // `open` already built the first generation; report it.
            let generation = service.generation();
            let indexed = search::indexed_slugs(&pool).await?.len();
            println!("refresh");
            println!("  generation: {}", generation.number());
            println!("  articles: {}", generation.len());
            println!("  indexed: {}", indexed);
            println!("  digest: {}", generation.digest());
            println!(
                "  built at: {}",
                generation.built_at().format("%Y-%m-%dT%H:%M:%SZ")
            );
            println!("ok");
        }
        Commands::List { sort } => {
            let articles = service.list_articles(sort).await?;
            if articles.is_empty() {
                println!("No articles.");
            }
            for a in &articles {
                let title = if a.metadata.title.is_empty() {
                    "(untitled)"
                } else {
                    a.metadata.title.as_str()
                };
                let draft = if a.is_draft() { " [draft]" } else { "" };
                println!(
                    "{:<12} {:>6}  {}  {}{}",
                    a.metadata.date, a.page_views, a.slug, title, draft
                );
            }
        }
        Commands::Get { slug } => {
            let article = service.get_article(&slug).await?;
            println!("--- Article ---");
            println!("slug:      {}", article.slug);
            println!("title:     {}", article.metadata.title);
            println!("subtitle:  {}", article.metadata.subtitle);
            println!("author:    {}", article.metadata.author);
            println!("date:      {}", article.metadata.date);
            println!("tags:      {}", article.metadata.tags.join(", "));
            println!("draft:     {}", article.metadata.draft);
            println!("views:     {}", article.page_views);
            println!();
            println!("--- Content ---");
            println!("{}", article.content);
        }
        Commands::Search { term } => {
            let results = service.search(&term).await?;
            if results.is_empty() {
                println!("No results.");
            }
            for (i, r) in results.iter().enumerate() {
                println!("{}. [{:.3}] {} / {}", i + 1, r.score, r.slug, r.title);
                if !r.subtitle.is_empty() {
                    println!("    {}", r.subtitle);
                }
            }
        }
        Commands::Author { handle } => {
            let author = service.get_author(&handle).await?;
            println!("{}", serde_json::to_string_pretty(&author)?);
        }
        Commands::Serve => {
            server::run_server(&cfg, Arc::new(service)).await?;
        }
    }

    pool.close().await;
    Ok(())
}
