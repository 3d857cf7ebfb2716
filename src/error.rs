//! Error types for the content service.
//!
//! [`ServiceError`] is what callers of [`ContentService`](crate::service::ContentService)
//! see. The narrower enums describe failures of individual stages and are
//! wrapped by it.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A document could not be turned into an article.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("document has no front-matter block")]
    MissingFrontMatter,

    #[error("front-matter block is not terminated by a closing `---` line")]
    UnterminatedFrontMatter,

    #[error("front-matter is not valid YAML: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("unknown highlight theme '{0}'")]
    UnknownTheme(String),
}

/// The content tree could not be scanned.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("content root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("failed to walk content tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("slug '{slug}' is produced by both {} and {}", first.display(), second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A store call failed or did not finish in time.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("article not found: {0}")]
    ArticleNotFound(String),

    #[error("author not found: {0}")]
    AuthorNotFound(String),

    #[error("renderer setup failed: {0}")]
    Renderer(#[source] RenderError),

    #[error("failed to render {}: {source}", path.display())]
    Render { path: PathBuf, source: RenderError },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("search failed: {0}")]
    Search(#[source] StoreError),

    /// The new generation is live but the search index still reflects an
    /// older one.
    #[error("search index rebuild failed: {0}")]
    IndexRebuild(#[source] StoreError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::ArticleNotFound(_) | ServiceError::AuthorNotFound(_)
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
