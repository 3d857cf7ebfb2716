//! TOML configuration.
//!
//! Every section except `[content]` may be omitted; defaults mirror the
//! example config shipped in `config/folio.example.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::render;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    pub content: ContentConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Upper bound for any single store call made by the service.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl DbConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/folio.sqlite")
}
fn default_query_timeout_secs() -> u64 {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub root: PathBuf,
    /// Authoring mode: drafts are visible and every read refreshes first.
    #[serde(default)]
    pub authoring: bool,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    /// Defaults to skipping `.git` directories only; hidden markdown files
    /// are served like any other.
    #[serde(default = "default_exclude_globs")]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl ContentConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            authoring: false,
            include_globs: default_include_globs(),
            exclude_globs: default_exclude_globs(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.markdown".to_string()]
}

fn default_exclude_globs() -> Vec<String> {
    vec!["**/.git/**".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_result_limit")]
    pub result_limit: i64,
    #[serde(default = "default_title_weight")]
    pub title_weight: f64,
    #[serde(default = "default_subtitle_weight")]
    pub subtitle_weight: f64,
    #[serde(default = "default_content_weight")]
    pub content_weight: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
            title_weight: default_title_weight(),
            subtitle_weight: default_subtitle_weight(),
            content_weight: default_content_weight(),
        }
    }
}

fn default_result_limit() -> i64 {
    10
}
fn default_title_weight() -> f64 {
    10.0
}
fn default_subtitle_weight() -> f64 {
    5.0
}
fn default_content_weight() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_highlight_theme")]
    pub highlight_theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            highlight_theme: default_highlight_theme(),
        }
    }
}

fn default_highlight_theme() -> String {
    render::DEFAULT_THEME.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Refresh the cache when files under `content.root` change.
    #[serde(default)]
    pub watch: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            watch: false,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:4000".to_string()
}

impl Config {
    /// Config with every section defaulted, serving `root`.
    pub fn with_content_root(root: impl Into<PathBuf>) -> Self {
        Self {
            db: DbConfig::default(),
            content: ContentConfig::new(root),
            search: SearchConfig::default(),
            render: RenderConfig::default(),
            server: ServerConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.db.query_timeout_secs == 0 {
            anyhow::bail!("db.query_timeout_secs must be > 0");
        }

        if self.content.include_globs.is_empty() {
            anyhow::bail!("content.include_globs must not be empty");
        }

        if self.search.result_limit < 1 {
            anyhow::bail!("search.result_limit must be >= 1");
        }

        let weights = [
            ("title_weight", self.search.title_weight),
            ("subtitle_weight", self.search.subtitle_weight),
            ("content_weight", self.search.content_weight),
        ];
        for (name, weight) in weights {
            if !(weight >= 0.0 && weight.is_finite()) {
                anyhow::bail!("search.{} must be a finite value >= 0", name);
            }
        }

        let themes = render::highlight_themes();
        if !themes.contains(&self.render.highlight_theme) {
            anyhow::bail!(
                "render.highlight_theme '{}' is not a bundled theme. Available: {}",
                self.render.highlight_theme,
                themes.join(", ")
            );
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
