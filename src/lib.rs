//! # Folio
//!
//! Content service for a small publishing site.
//!
//! Folio reads a directory of markdown documents with YAML front-matter,
//! renders them to HTML, keeps them in an in-memory cache, counts
//! pageviews in SQLite, and answers ranked full-text searches through an
//! FTS5 index that is rebuilt whenever the cache changes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ content/    │──▶│  Renderer   │──▶│ ArticleCache │── get / list
//! │ *.md        │   │ md → HTML   │   │ (generation) │
//! └─────────────┘   └─────────────┘   └──────┬───────┘
//!                                            │ rebuild
//!                   ┌─────────────┐   ┌──────▼───────┐
//!  record pageview ▶│  pageviews  │   │ articles_fts │── search
//!                   └─────────────┘   └──────────────┘
//!                          SQLite (single connection)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! folio init                     # create database
//! folio refresh                  # render articles and build the index
//! folio list --sort popular
//! folio search "borrow checker"
//! folio serve                    # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`source`] | Content tree scanning |
//! | [`render`] | Markdown rendering |
//! | [`cache`] | Article generations and atomic publish |
//! | [`sort`] | Listing order and draft visibility |
//! | [`search`] | Search index rebuild and ranked queries |
//! | [`pageviews`] | Pageview recording and counts |
//! | [`authors`] | Author lookup |
//! | [`service`] | The content service |
//! | [`server`] | HTTP JSON API |
//! | [`watch`] | Refresh on filesystem change |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod authors;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod pageviews;
pub mod render;
pub mod search;
pub mod server;
pub mod service;
pub mod sort;
pub mod source;
pub mod watch;
