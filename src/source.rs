//! Content tree scanning.
//!
//! Walks `content.root`, keeps files matching the include globs and not the
//! exclude globs, and reads them into [`SourceDocument`]s keyed by slug.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ContentConfig;
use crate::error::SourceError;

/// Extensions stripped when deriving a slug.
const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// A markdown file read from the content tree.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub slug: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Reads every markdown document under the content root, sorted by slug.
pub fn scan_content(config: &ContentConfig) -> Result<Vec<SourceDocument>, SourceError> {
    let root = &config.root;
    if !root.is_dir() {
        return Err(SourceError::MissingRoot(root.clone()));
    }

    let include_set = build_globset(&config.include_globs)?;

    let exclude_set = build_globset(&config.exclude_globs)?;

    let mut documents = Vec::new();

    let walker = WalkDir::new(root).follow_links(config.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative_str(relative);

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        let Some(slug) = slug_for(&rel_str) else {
            continue;
        };

        let bytes = std::fs::read(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        documents.push(SourceDocument {
            slug,
            path: path.to_path_buf(),
            bytes,
        });
    }

    documents.sort_by(|a, b| a.slug.cmp(&b.slug).then_with(|| a.path.cmp(&b.path)));

    if let Some(pair) = documents.windows(2).find(|w| w[0].slug == w[1].slug) {
        return Err(SourceError::DuplicateSlug {
            slug: pair[0].slug.clone(),
            first: pair[0].path.clone(),
            second: pair[1].path.clone(),
        });
    }

    Ok(documents)
}

/// True when `path` names a markdown document by extension.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

/// `posts/hello.md` → `posts/hello`. Non-markdown paths have no slug.
pub fn slug_for(relative: &str) -> Option<String> {
    let (stem, ext) = relative.rsplit_once('.')?;
    if stem.is_empty() || stem.ends_with('/') || !MARKDOWN_EXTENSIONS.contains(&ext) {
        return None;
    }
    Some(stem.to_string())
}

/// Relative path with `/` separators regardless of platform.
fn relative_str(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, SourceError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (rel, body) in files {
            let path = tmp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        tmp
    }

    #[test]
    fn slug_strips_markdown_extensions_only() {
        assert_eq!(slug_for("hello.md").as_deref(), Some("hello"));
        assert_eq!(slug_for("posts/deep.markdown").as_deref(), Some("posts/deep"));
        assert_eq!(slug_for("v1.2.md").as_deref(), Some("v1.2"));
        assert_eq!(slug_for("notes.txt"), None);
        assert_eq!(slug_for("posts/.md"), None);
        assert_eq!(slug_for("README"), None);
    }

    #[test]
    fn scans_nested_markdown_sorted_by_slug() {
        let tmp = tree(&[
            ("zeta.md", "z"),
            ("posts/alpha.markdown", "a"),
            ("notes.txt", "ignored"),
        ]);

        let docs = scan_content(&ContentConfig::new(tmp.path())).unwrap();
        let slugs: Vec<&str> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, ["posts/alpha", "zeta"]);
        assert_eq!(docs[1].bytes, b"z");
    }

    #[test]
    fn hidden_markdown_is_served_but_git_is_skipped() {
        let tmp = tree(&[
            (".series/part1.md", "p"),
            (".intro.md", "i"),
            (".git/notes.md", "g"),
        ]);

        let docs = scan_content(&ContentConfig::new(tmp.path())).unwrap();
        let slugs: Vec<&str> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, [".intro", ".series/part1"]);
    }

    #[test]
    fn default_excludes_can_be_overridden() {
        let tmp = tree(&[(".series/part1.md", "p"), (".git/notes.md", "g")]);

        let mut config = ContentConfig::new(tmp.path());
        config.exclude_globs = Vec::new();
        let docs = scan_content(&config).unwrap();
        assert_eq!(docs.len(), 2);

        config.exclude_globs = vec!["**/.*/**".to_string()];
        assert!(scan_content(&config).unwrap().is_empty());
    }

    #[test]
    fn exclude_globs_apply() {
        let tmp = tree(&[("keep.md", "k"), ("drafts/skip.md", "s")]);
        let mut config = ContentConfig::new(tmp.path());
        config.exclude_globs = vec!["drafts/**".to_string()];

        let docs = scan_content(&config).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].slug, "keep");
    }

    #[test]
    fn same_slug_from_two_extensions_is_rejected() {
        let tmp = tree(&[("post.md", "a"), ("post.markdown", "b")]);
        let err = scan_content(&ContentConfig::new(tmp.path())).unwrap_err();
        assert!(matches!(err, SourceError::DuplicateSlug { ref slug, .. } if slug == "post"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = scan_content(&ContentConfig::new(tmp.path().join("nope"))).unwrap_err();
        assert!(matches!(err, SourceError::MissingRoot(_)));
    }

    #[test]
    fn detects_markdown_paths() {
        assert!(is_markdown(Path::new("a/b.md")));
        assert!(is_markdown(Path::new("b.markdown")));
        assert!(!is_markdown(Path::new("b.md.swp")));
        assert!(!is_markdown(Path::new("b")));
    }
}
