//! Core data models used throughout Folio.
//!
//! These types represent the articles, authors, and search results that flow
//! from the content tree and the store to callers.

use serde::{Deserialize, Deserializer, Serialize};

/// Front-matter of a document.
///
/// Text fields accept any YAML scalar, so `title: 1984` reads as `"1984"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleMetadata {
    #[serde(deserialize_with = "scalar_string")]
    pub title: String,
    #[serde(deserialize_with = "scalar_string")]
    pub subtitle: String,
    /// Author handle, as looked up by [`get_author`](crate::authors::get_author).
    #[serde(deserialize_with = "scalar_string")]
    pub author: String,
    pub draft: bool,
    /// Sortable date string, usually ISO-8601.
    #[serde(deserialize_with = "scalar_string")]
    pub date: String,
    #[serde(deserialize_with = "scalar_strings")]
    pub tags: Vec<String>,
}

/// A rendered article as held by one cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub slug: String,
    /// Sanitized HTML.
    pub content: String,
    #[serde(skip)]
    pub raw_content: Vec<u8>,
    /// Views recorded when the generation was built.
    pub page_views: i64,
    #[serde(flatten)]
    pub metadata: ArticleMetadata,
}

impl Article {
    pub fn is_draft(&self) -> bool {
        self.metadata.draft
    }
}

/// Row of the `authors` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: i64,
    pub handle: String,
    pub name: String,
    pub bio: String,
    pub birth: String,
    pub image_url: String,
    pub github_url: String,
}

/// A search hit. The score never leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    /// Raw BM25 score; lower is a better match.
    #[serde(skip)]
    pub score: f64,
}

/// One view of one article, appended to `pageviews`.
#[derive(Debug, Clone, Default)]
pub struct Pageview {
    pub slug: String,
    pub address: String,
    pub user_agent: String,
    pub referrer: String,
}

/// Accepts `2024-01-01`, `"2024-01-01"`, bare numbers such as `2024` and booleans.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    scalar_to_string(value).map_err(serde::de::Error::custom)
}

/// A sequence of scalars, each read as by [`scalar_string`]. Null is empty.
fn scalar_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(Vec::new()),
        serde_yaml::Value::Sequence(items) => items
            .into_iter()
            .map(scalar_to_string)
            .collect::<Result<_, _>>()
            .map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected a list, found {:?}",
            other
        ))),
    }
}

fn scalar_to_string(value: serde_yaml::Value) -> Result<String, String> {
    match value {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected a scalar, found {:?}", other)),
    }
}
