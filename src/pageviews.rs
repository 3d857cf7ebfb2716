//! Pageview recording and aggregation.
//!
//! Views are appended one row per request and only ever read back as a
//! per-slug count when a cache generation is built.

use sqlx::SqlitePool;
use std::time::Duration;

use crate::db::timed;
use crate::error::StoreError;
use crate::models::Pageview;

pub async fn record_pageview(
    pool: &SqlitePool,
    limit: Duration,
    view: &Pageview,
) -> Result<(), StoreError> {
    timed(
        limit,
        sqlx::query(
            "INSERT INTO pageviews (slug, ip_address, user_agent, referrer) VALUES (?, ?, ?, ?)",
        )
        .bind(&view.slug)
        .bind(&view.address)
        .bind(&view.user_agent)
        .bind(&view.referrer)
        .execute(pool),
    )
    .await?;

    Ok(())
}

/// Number of recorded views for `slug`; zero when none exist.
pub async fn count_views(
    pool: &SqlitePool,
    limit: Duration,
    slug: &str,
) -> Result<i64, StoreError> {
    let count: Option<i64> = timed(
        limit,
        sqlx::query_scalar("SELECT COUNT(*) FROM pageviews WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool),
    )
    .await?;

    Ok(count.unwrap_or(0))
}
