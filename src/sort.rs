//! Ordering and draft visibility for article listings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::Article;

/// How a listing is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Newest first, then title ascending.
    #[default]
    Date,
    /// Most viewed first, then slug ascending.
    Popular,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Popular => "popular",
        }
    }

    /// Parses a user-supplied key, falling back to [`SortKey::Date`].
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn compare(&self, a: &Article, b: &Article) -> Ordering {
        match self {
            SortKey::Date => by_date(a, b),
            SortKey::Popular => by_popularity(a, b),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortKey::Date),
            "popular" => Ok(SortKey::Popular),
            other => Err(format!(
                "unknown sort key '{}'. Use date or popular.",
                other
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date descending, title ascending on ties.
pub fn by_date(a: &Article, b: &Article) -> Ordering {
    b.metadata
        .date
        .cmp(&a.metadata.date)
        .then_with(|| a.metadata.title.cmp(&b.metadata.title))
        .then_with(|| a.slug.cmp(&b.slug))
}

/// View count descending, slug ascending on ties.
pub fn by_popularity(a: &Article, b: &Article) -> Ordering {
    b.page_views
        .cmp(&a.page_views)
        .then_with(|| a.slug.cmp(&b.slug))
}

/// Drafts are only visible in authoring mode.
pub fn is_visible(article: &Article, authoring: bool) -> bool {
    authoring || !article.is_draft()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleMetadata;

    fn article(slug: &str, title: &str, date: &str, views: i64) -> Article {
        Article {
            slug: slug.to_string(),
            content: String::new(),
            raw_content: Vec::new(),
            page_views: views,
            metadata: ArticleMetadata {
                title: title.to_string(),
                date: date.to_string(),
                ..Default::default()
            },
        }
    }

    fn slugs(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.slug.as_str()).collect()
    }

    #[test]
    fn date_is_descending_with_title_tiebreak() {
        let mut list = vec![
            article("old", "Old", "2023-05-01", 0),
            article("b", "Beta", "2024-01-01", 0),
            article("a", "Alpha", "2024-01-01", 0),
            article("new", "New", "2024-06-01", 0),
        ];
        list.sort_by(by_date);
        assert_eq!(slugs(&list), ["new", "a", "b", "old"]);
    }

    #[test]
    fn popularity_is_descending_with_slug_tiebreak() {
        let mut list = vec![
            article("c", "", "", 5),
            article("b", "", "", 9),
            article("a", "", "", 5),
        ];
        list.sort_by(by_popularity);
        assert_eq!(slugs(&list), ["b", "a", "c"]);
    }

    #[test]
    fn parses_sort_keys() {
        assert_eq!("date".parse::<SortKey>().unwrap(), SortKey::Date);
        assert_eq!("popular".parse::<SortKey>().unwrap(), SortKey::Popular);
        assert!("views".parse::<SortKey>().is_err());
        assert_eq!(SortKey::parse_or_default(Some("bogus")), SortKey::Date);
        assert_eq!(SortKey::parse_or_default(None), SortKey::Date);
        assert_eq!(SortKey::parse_or_default(Some("popular")), SortKey::Popular);
    }

    #[test]
    fn drafts_hidden_outside_authoring() {
        let mut draft = article("d", "", "", 0);
        draft.metadata.draft = true;
        assert!(!is_visible(&draft, false));
        assert!(is_visible(&draft, true));
        assert!(is_visible(&article("p", "", "", 0), false));
    }
}
