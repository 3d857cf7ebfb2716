//! HTTP JSON API.
//!
//! Thin routing over [`ContentService`]; every handler is one service call
//! plus error mapping.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/articles?sort=date\|popular` | Visible articles, ordered |
//! | `GET`  | `/articles/{slug}` | One article; records a pageview |
//! | `GET`  | `/search?q=term` | Ranked search hits |
//! | `GET`  | `/authors/{handle}` | Author record (`@` prefix optional) |
//! | `POST` | `/refresh` | Rebuild the cache and search index |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "article not found: hello" } }
//! ```
//!
//! Error codes: `not_found` (404), `internal` (500).

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::error::ServiceError;
use crate::models::{Article, Author, Pageview, SearchResult};
use crate::service::ContentService;
use crate::sort::SortKey;
use crate::watch;

/// Starts the server and, if configured, the content watcher.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config, service: Arc<ContentService>) -> anyhow::Result<()> {
    let _watcher = if config.server.watch {
        Some(watch::spawn_watcher(&config.content.root, Arc::clone(&service))?)
    } else {
        None
    };

    let app = router(service);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "folio listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

pub fn router(service: Arc<ContentService>) -> Router {
    Router::new()
        .route("/articles", get(handle_list_articles))
        .route("/articles/{*slug}", get(handle_show_article))
        .route("/search", get(handle_search))
        .route("/authors/{handle}", get(handle_show_author))
        .route("/refresh", post(handle_refresh))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        if err.is_not_found() {
            return AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found".to_string(),
                message: err.to_string(),
            };
        }

        error!(error = %err, "unexpected error");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal".to_string(),
            message: "The server encountered an unexpected error serving your request.".to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Articles ============

#[derive(Deserialize)]
struct ListParams {
    sort: Option<String>,
}

#[derive(Serialize)]
struct ArticleListResponse {
    sort: &'static str,
    articles: Vec<Arc<Article>>,
}

/// Unknown sort keys fall back to date order.
async fn handle_list_articles(
    State(service): State<Arc<ContentService>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ArticleListResponse>, AppError> {
    let sort = SortKey::parse_or_default(params.sort.as_deref());
    let articles = service.list_articles(sort).await?;
    Ok(Json(ArticleListResponse {
        sort: sort.as_str(),
        articles,
    }))
}

async fn handle_show_article(
    State(service): State<Arc<ContentService>>,
    Path(slug): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<Arc<Article>>, AppError> {
    let article = service.get_article(&slug).await?;

    service.spawn_pageview(Pageview {
        slug,
        address: peer.to_string(),
        user_agent: header_str(&headers, header::USER_AGENT),
        referrer: header_str(&headers, header::REFERER),
    });

    Ok(Json(article))
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct SearchResponse {
    articles: Vec<SearchResult>,
}

async fn handle_search(
    State(service): State<Arc<ContentService>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let articles = service.search(&params.q).await?;
    Ok(Json(SearchResponse { articles }))
}

// ============ Authors ============

async fn handle_show_author(
    State(service): State<Arc<ContentService>>,
    Path(handle): Path<String>,
) -> Result<Json<Author>, AppError> {
    Ok(Json(service.get_author(&handle).await?))
}

// ============ POST /refresh ============

#[derive(Serialize)]
struct RefreshResponse {
    generation: u64,
    articles: usize,
    indexed: usize,
    digest: String,
    unchanged: bool,
}

async fn handle_refresh(
    State(service): State<Arc<ContentService>>,
) -> Result<Json<RefreshResponse>, AppError> {
    let report = service.refresh().await?;
    Ok(Json(RefreshResponse {
        generation: report.generation,
        articles: report.articles,
        indexed: report.indexed,
        digest: report.digest,
        unchanged: report.unchanged,
    }))
}
