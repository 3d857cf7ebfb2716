//! Full-text search over the published generation.
//!
//! The index is the FTS5 table `articles_fts`. It has no life of its own:
//! [`rebuild_index`] replaces its whole contents with the visible articles of
//! one generation inside a single transaction, so a concurrent query sees
//! either the previous record set or the new one.
//!
//! # Ranking
//!
//! Queries are ranked with `bm25(articles_fts, 0, title, subtitle, content)`
//! using the configured column weights. SQLite's BM25 is negated: the more
//! relevant a row, the *lower* its score. Results are therefore ordered by
//! raw score ascending, ties broken by slug.

use sqlx::{Row, SqlitePool};
use std::time::Duration;

use crate::config::SearchConfig;
use crate::db::timed;
use crate::error::StoreError;
use crate::models::{Article, SearchResult};

/// Replaces the index contents with `articles`. Returns the number of records written.
///
/// Nothing is committed unless every insert succeeds.
pub async fn rebuild_index<'a, I>(pool: &SqlitePool, articles: I) -> Result<usize, StoreError>
where
    I: IntoIterator<Item = &'a Article>,
{
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM articles_fts")
        .execute(&mut *tx)
        .await?;

    let mut written = 0;
    for article in articles {
        sqlx::query("INSERT INTO articles_fts (slug, title, subtitle, content) VALUES (?, ?, ?, ?)")
            .bind(&article.slug)
            .bind(&article.metadata.title)
            .bind(&article.metadata.subtitle)
            .bind(html_to_text(&article.content))
            .execute(&mut *tx)
            .await?;
        written += 1;
    }

    tx.commit().await?;
    Ok(written)
}

/// Slugs currently in the index, sorted.
pub async fn indexed_slugs(pool: &SqlitePool) -> Result<Vec<String>, StoreError> {
    let slugs: Vec<String> = sqlx::query_scalar("SELECT slug FROM articles_fts ORDER BY slug")
        .fetch_all(pool)
        .await?;
    Ok(slugs)
}

/// Runs a ranked term search. A term without any word characters matches nothing.
pub async fn search_articles(
    pool: &SqlitePool,
    limit: Duration,
    config: &SearchConfig,
    term: &str,
) -> Result<Vec<SearchResult>, StoreError> {
    let Some(expression) = match_expression(term) else {
        return Ok(Vec::new());
    };

    let rows = timed(
        limit,
        sqlx::query(
            r#"
            SELECT slug, title, subtitle,
                   bm25(articles_fts, 0.0, ?, ?, ?) AS score
            FROM articles_fts
            WHERE articles_fts MATCH ?
            ORDER BY score ASC, slug ASC
            LIMIT ?
            "#,
        )
        .bind(config.title_weight)
        .bind(config.subtitle_weight)
        .bind(config.content_weight)
        .bind(&expression)
        .bind(config.result_limit)
        .fetch_all(pool),
    )
    .await?;

    let results = rows
        .iter()
        .map(|row| SearchResult {
            slug: row.get("slug"),
            title: row.get("title"),
            subtitle: row.get("subtitle"),
            score: row.get("score"),
        })
        .collect();

    Ok(results)
}

/// Builds an FTS5 `MATCH` expression from free text.
///
/// Every run of alphanumeric characters becomes a quoted string token and
/// the tokens are AND-ed, so no user input is ever interpreted as FTS5
/// query syntax.
pub fn match_expression(term: &str) -> Option<String> {
    let tokens: Vec<String> = term
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t))
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Text content of rendered HTML: tags dropped, common entities decoded.
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_expression_quotes_tokens() {
        assert_eq!(match_expression("rust"), Some("\"rust\"".to_string()));
        assert_eq!(
            match_expression("  async   Rust! "),
            Some("\"async\" \"Rust\"".to_string())
        );
        assert_eq!(
            match_expression("nonexistent-term-xyz"),
            Some("\"nonexistent\" \"term\" \"xyz\"".to_string())
        );
    }

    #[test]
    fn match_expression_neutralizes_query_syntax() {
        assert_eq!(
            match_expression("title:\"x\" OR NEAR(a b)*"),
            Some("\"title\" \"x\" \"OR\" \"NEAR\" \"a\" \"b\"".to_string())
        );
    }

    #[test]
    fn match_expression_empty_for_blank_or_punctuation() {
        assert_eq!(match_expression(""), None);
        assert_eq!(match_expression("   "), None);
        assert_eq!(match_expression("\"*-()"), None);
    }

    #[test]
    fn match_expression_keeps_unicode_words() {
        assert_eq!(match_expression("café"), Some("\"café\"".to_string()));
    }

    #[test]
    fn html_to_text_strips_markup() {
        let text = html_to_text("<h2><a id=\"x\"></a>Fish &amp; Chips</h2>\n<p>a &lt;b&gt;</p>");
        assert!(text.contains("Fish & Chips"));
        assert!(text.contains("a <b>"));
        assert!(!text.contains("<h2>"));
        assert!(!text.contains("id="));
    }
}
