use sqlx::{Row, SqlitePool};
use std::time::Duration;

use crate::db::timed;
use crate::error::{ServiceError, ServiceResult};
use crate::models::Author;

/// Looks up an author by handle. A leading `@` is ignored.
pub async fn get_author(pool: &SqlitePool, limit: Duration, handle: &str) -> ServiceResult<Author> {
    let handle = handle.strip_prefix('@').unwrap_or(handle);

    let row = timed(
        limit,
        sqlx::query(
            "SELECT id, handle, name, bio, birth, image_url, github_url FROM authors WHERE handle = ?",
        )
        .bind(handle)
        .fetch_optional(pool),
    )
    .await?;

    let row = row.ok_or_else(|| ServiceError::AuthorNotFound(handle.to_string()))?;

    Ok(Author {
        id: row.get("id"),
        handle: row.get("handle"),
        name: row.get("name"),
        bio: row.get("bio"),
        birth: row.get("birth"),
        image_url: row.get("image_url"),
        github_url: row.get("github_url"),
    })
}
