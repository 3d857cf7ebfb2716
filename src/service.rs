//! The content service.
//!
//! [`ContentService`] owns the article cache, the renderer, and the store
//! handle, and exposes the read operations used by the CLI and the HTTP
//! server.
//!
//! # Refresh
//!
//! A refresh scans the content tree, renders every document on a blocking
//! worker, looks up view counts, builds a new [`Generation`], publishes it,
//! and rebuilds the search index. The whole sequence runs under one async
//! mutex, so concurrent refreshes queue up behind each other while readers
//! keep using whatever generation is live.
//!
//! Failures before publish (scan, render, view counts) leave the live
//! generation and the index untouched. A failed index rebuild happens after
//! publish: the new generation stays live, the index keeps its previous
//! contents, and the error is logged and returned as
//! [`ServiceError::IndexRebuild`]. The next refresh always retries the
//! rebuild.
//!
//! # Modes
//!
//! In authoring mode every read refreshes first and drafts are visible. In
//! production mode the cache only changes on an explicit [`refresh`](ContentService::refresh)
//! and drafts are never served.

use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::authors;
use crate::cache::{ArticleCache, Generation};
use crate::config::{Config, ContentConfig, SearchConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Article, Author, Pageview, SearchResult};
use crate::pageviews;
use crate::render::{RenderedDocument, Renderer};
use crate::search;
use crate::sort::{is_visible, SortKey};
use crate::source::scan_content;

/// Outcome of one successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    /// Number of the live generation after the refresh.
    pub generation: u64,
    pub articles: usize,
    /// Records in the search index.
    pub indexed: usize,
    pub digest: String,
    /// True when sources and view counts matched the live generation and
    /// nothing was republished.
    pub unchanged: bool,
}

struct RefreshState {
    next_generation: u64,
    /// Digest of the generation the index was last rebuilt from.
    indexed_digest: Option<String>,
    indexed_count: usize,
}

pub struct ContentService {
    content: ContentConfig,
    search: SearchConfig,
    query_timeout: Duration,
    pool: SqlitePool,
    renderer: Arc<Renderer>,
    cache: ArticleCache,
    refresh: Mutex<RefreshState>,
}

impl ContentService {
    /// Creates a service serving an empty generation until the first refresh.
    pub fn new(config: &Config, pool: SqlitePool) -> ServiceResult<Self> {
        let renderer =
            Renderer::new(&config.render.highlight_theme).map_err(ServiceError::Renderer)?;

        Ok(Self {
            content: config.content.clone(),
            search: config.search.clone(),
            query_timeout: config.db.query_timeout(),
            pool,
            renderer: Arc::new(renderer),
            cache: ArticleCache::new(),
            refresh: Mutex::new(RefreshState {
                next_generation: 1,
                indexed_digest: None,
                indexed_count: 0,
            }),
        })
    }

    /// Creates the service and builds the first generation.
    pub async fn open(config: &Config, pool: SqlitePool) -> ServiceResult<Self> {
        let service = Self::new(config, pool)?;
        service.refresh().await?;
        Ok(service)
    }

    pub fn authoring(&self) -> bool {
        self.content.authoring
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The live generation.
    pub fn generation(&self) -> Arc<Generation> {
        self.cache.load()
    }

    pub async fn refresh(&self) -> ServiceResult<RefreshReport> {
        let mut state = self.refresh.lock().await;
        let started = Instant::now();
        debug!(root = %self.content.root.display(), "refreshing content");

        let content = self.content.clone();
        let renderer = Arc::clone(&self.renderer);
        let rendered = tokio::task::spawn_blocking(move || render_tree(&content, &renderer)).await??;

        let mut articles = Vec::with_capacity(rendered.len());
        for (slug, doc) in rendered {
            let page_views = pageviews::count_views(&self.pool, self.query_timeout, &slug).await?;
            articles.push(Article {
                slug,
                content: doc.html,
                raw_content: doc.raw,
                page_views,
                metadata: doc.metadata,
            });
        }

        let live = self.cache.load();
        let candidate = Generation::build(state.next_generation, articles);

        if candidate.digest() == live.digest()
            && state.indexed_digest.as_deref() == Some(live.digest())
        {
            debug!(
                generation = live.number(),
                digest = %live.digest(),
                "content unchanged, keeping live generation"
            );
            return Ok(RefreshReport {
                generation: live.number(),
                articles: live.len(),
                indexed: state.indexed_count,
                digest: live.digest().to_string(),
                unchanged: true,
            });
        }

        let generation = Arc::new(candidate);
        state.next_generation += 1;
        state.indexed_digest = None;
        self.cache.publish(Arc::clone(&generation));

        let mut records: Vec<&Article> = generation
            .visible(self.authoring())
            .map(|a| &**a)
            .collect();
        records.sort_by(|a, b| a.slug.cmp(&b.slug));

        let indexed = match search::rebuild_index(&self.pool, records).await {
            Ok(n) => n,
            Err(e) => {
                error!(
                    generation = generation.number(),
                    error = %e,
                    "search index rebuild failed; index is stale relative to the live generation"
                );
                return Err(ServiceError::IndexRebuild(e));
            }
        };
        state.indexed_digest = Some(generation.digest().to_string());
        state.indexed_count = indexed;

        info!(
            generation = generation.number(),
            articles = generation.len(),
            indexed,
            digest = %generation.digest(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cache refreshed"
        );

        Ok(RefreshReport {
            generation: generation.number(),
            articles: generation.len(),
            indexed,
            digest: generation.digest().to_string(),
            unchanged: false,
        })
    }

    /// In authoring mode, refreshes before a read.
    ///
    /// An index rebuild failure does not fail the read: the new generation
    /// is already live and the error has been logged.
    async fn ensure_fresh(&self) -> ServiceResult<()> {
        if !self.authoring() {
            return Ok(());
        }
        match self.refresh().await {
            Ok(_) | Err(ServiceError::IndexRebuild(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn get_article(&self, slug: &str) -> ServiceResult<Arc<Article>> {
        self.ensure_fresh().await?;

        let generation = self.cache.load();
        match generation.get(slug) {
            Some(article) if is_visible(article, self.authoring()) => Ok(Arc::clone(article)),
            _ => Err(ServiceError::ArticleNotFound(slug.to_string())),
        }
    }

    pub async fn list_articles(&self, sort: SortKey) -> ServiceResult<Vec<Arc<Article>>> {
        self.ensure_fresh().await?;
        Ok(self.cache.load().list(self.authoring(), sort))
    }

    pub async fn search(&self, term: &str) -> ServiceResult<Vec<SearchResult>> {
        self.ensure_fresh().await?;
        search::search_articles(&self.pool, self.query_timeout, &self.search, term)
            .await
            .map_err(ServiceError::Search)
    }

    pub async fn get_author(&self, handle: &str) -> ServiceResult<Author> {
        authors::get_author(&self.pool, self.query_timeout, handle).await
    }

    pub async fn record_pageview(&self, view: &Pageview) -> ServiceResult<()> {
        pageviews::record_pageview(&self.pool, self.query_timeout, view).await?;
        Ok(())
    }

    /// Records a pageview without making the caller wait. Failures are
    /// logged and otherwise dropped.
    pub fn spawn_pageview(&self, view: Pageview) -> tokio::task::JoinHandle<()> {
        let pool = self.pool.clone();
        let limit = self.query_timeout;
        tokio::spawn(async move {
            if let Err(e) = pageviews::record_pageview(&pool, limit, &view).await {
                warn!(slug = %view.slug, error = %e, "failed to save pageview");
            }
        })
    }
}

fn render_tree(
    content: &ContentConfig,
    renderer: &Renderer,
) -> ServiceResult<Vec<(String, RenderedDocument)>> {
    let documents = scan_content(content)?;

    documents
        .into_iter()
        .map(|doc| {
            let rendered = renderer
                .render(&doc.bytes)
                .map_err(|source| ServiceError::Render {
                    path: doc.path.clone(),
                    source,
                })?;
            Ok((doc.slug, rendered))
        })
        .collect()
}
