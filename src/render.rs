//! Markdown → HTML rendering.
//!
//! A document is a `---`-delimited YAML front-matter block followed by a
//! GitHub-flavored markdown body. [`Renderer::render`] is a pure function of
//! the input bytes: it never touches the filesystem or the store, so the
//! cache can call it from blocking worker threads.
//!
//! Raw HTML in the body is dropped and unsafe link schemes are stripped, so
//! the output can be embedded into a page template as-is.

use comrak::plugins::syntect::SyntectAdapter;
use comrak::{markdown_to_html_with_plugins, Options, Plugins};
use syntect::highlighting::ThemeSet;

use crate::error::RenderError;
use crate::models::ArticleMetadata;

/// Output of rendering one document.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub html: String,
    pub metadata: ArticleMetadata,
    pub raw: Vec<u8>,
}

/// Markdown renderer with a preloaded syntax highlighter.
///
/// Loading syntax definitions is the expensive part, so build one renderer
/// and share it.
pub struct Renderer {
    highlighter: SyntectAdapter,
}

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Names of the bundled highlight themes, sorted.
pub fn highlight_themes() -> Vec<String> {
    let mut names: Vec<String> = ThemeSet::load_defaults().themes.into_keys().collect();
    names.sort();
    names
}

impl Renderer {
    /// Fails with [`RenderError::UnknownTheme`] unless `highlight_theme` is
    /// one of [`highlight_themes`].
    pub fn new(highlight_theme: &str) -> Result<Self, RenderError> {
        if !highlight_themes().iter().any(|t| t == highlight_theme) {
            return Err(RenderError::UnknownTheme(highlight_theme.to_string()));
        }
        Ok(Self {
            highlighter: SyntectAdapter::new(Some(highlight_theme)),
        })
    }

    pub fn render(&self, raw: &[u8]) -> Result<RenderedDocument, RenderError> {
        let text = std::str::from_utf8(raw)?;
        let (front_matter, body) = split_front_matter(text)?;

        let metadata = if front_matter.trim().is_empty() {
            ArticleMetadata::default()
        } else {
            serde_yaml::from_str(front_matter)?
        };

        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.header_ids = Some(String::new());
        options.render.unsafe_ = false;

        let mut plugins = Plugins::default();
        plugins.render.codefence_syntax_highlighter = Some(&self.highlighter);

        let html = markdown_to_html_with_plugins(body, &options, &plugins);

        Ok(RenderedDocument {
            html,
            metadata,
            raw: raw.to_vec(),
        })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            highlighter: SyntectAdapter::new(Some(DEFAULT_THEME)),
        }
    }
}

/// Splits `text` into `(front_matter, body)`.
///
/// The block opens with a `---` first line and closes with the next line
/// that is exactly `---` or `...`.
fn split_front_matter(text: &str) -> Result<(&str, &str), RenderError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.split_inclusive('\n');
    let opening = lines.next().ok_or(RenderError::MissingFrontMatter)?;
    if opening.trim_end() != "---" {
        return Err(RenderError::MissingFrontMatter);
    }

    let start = opening.len();
    let mut offset = start;
    for line in lines {
        let marker = line.trim_end();
        if marker == "---" || marker == "..." {
            return Ok((&text[start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(RenderError::UnterminatedFrontMatter)
}
