//! Tracing subscriber setup.
//!
//! Authoring mode logs human-readable lines at `debug`; production logs one
//! JSON object per line at `info`. `RUST_LOG` overrides the level in both.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init(authoring: bool) {
    let default_level = if authoring { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("folio={},tower_http=info", default_level)));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output on stdout stays parseable.
    let result = if authoring {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {}", e);
    }
}
