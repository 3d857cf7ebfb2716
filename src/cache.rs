//! In-memory article cache.
//!
//! A [`Generation`] is a complete `slug → Article` map built by one refresh.
//! Generations are immutable; [`ArticleCache`] publishes a new one by
//! atomically replacing the pointer, so readers always see exactly one
//! generation and never wait on a refresh in progress.
//!
//! ```text
//!   refresh (serialized)                 readers (lock-free)
//!   ────────────────────                 ───────────────────
//!   scan → render → count views
//!        │
//!        ▼
//!   Generation::build ──▶ ArticleCache::publish ──▶ load() → Arc<Generation>
//! ```

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::Article;
use crate::sort::{is_visible, SortKey};

/// One immutable snapshot of the content tree.
#[derive(Debug)]
pub struct Generation {
    number: u64,
    built_at: DateTime<Utc>,
    digest: String,
    articles: HashMap<String, Arc<Article>>,
}

impl Generation {
    /// Generation zero: no articles, served before the first refresh.
    pub fn empty() -> Self {
        Self::build(0, Vec::new())
    }

    pub fn build(number: u64, articles: Vec<Article>) -> Self {
        let digest = digest_articles(&articles);
        let articles = articles
            .into_iter()
            .map(|a| (a.slug.clone(), Arc::new(a)))
            .collect();

        Self {
            number,
            built_at: Utc::now(),
            digest,
            articles,
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Hex SHA-256 over every article's slug, source bytes, and view count.
    ///
    /// Two generations built from identical sources and counts share a
    /// digest regardless of build time or generation number.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&Arc<Article>> {
        self.articles.get(slug)
    }

    /// Articles passing the draft rule, in no particular order.
    pub fn visible(&self, authoring: bool) -> impl Iterator<Item = &Arc<Article>> {
        self.articles
            .values()
            .filter(move |a| is_visible(a, authoring))
    }

    /// Visible articles ordered by `key`.
    pub fn list(&self, authoring: bool, key: SortKey) -> Vec<Arc<Article>> {
        let mut list: Vec<Arc<Article>> = self.visible(authoring).cloned().collect();
        list.sort_by(|a, b| key.compare(a, b));
        list
    }
}

fn digest_articles(articles: &[Article]) -> String {
    let mut ordered: Vec<&Article> = articles.iter().collect();
    ordered.sort_by(|a, b| a.slug.cmp(&b.slug));

    let mut hasher = Sha256::new();
    for article in ordered {
        hasher.update((article.slug.len() as u64).to_le_bytes());
        hasher.update(article.slug.as_bytes());
        hasher.update((article.raw_content.len() as u64).to_le_bytes());
        hasher.update(&article.raw_content);
        hasher.update(article.page_views.to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Holder of the currently published generation.
pub struct ArticleCache {
    current: ArcSwap<Generation>,
}

impl ArticleCache {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Generation::empty()),
        }
    }

    /// The live generation. Callers keep it alive for as long as they hold it.
    pub fn load(&self) -> Arc<Generation> {
        self.current.load_full()
    }

    /// Makes `generation` live and returns the one it replaced.
    pub fn publish(&self, generation: Arc<Generation>) -> Arc<Generation> {
        self.current.swap(generation)
    }
}

impl Default for ArticleCache {
    fn default() -> Self {
        Self::new()
    }
}
