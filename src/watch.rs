//! Refresh-on-change trigger for `folio serve`.
//!
//! Filesystem events under the content root that touch a markdown file are
//! collected for a short quiet period and then trigger one
//! [`ContentService::refresh`]. A failed refresh is logged; the previous
//! generation stays live.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::service::ContentService;
use crate::source::is_markdown;

const DEBOUNCE: Duration = Duration::from_millis(250);

/// Starts watching `root`. Watching stops when the returned watcher is dropped.
pub fn spawn_watcher(root: &Path, service: Arc<ContentService>) -> Result<RecommendedWatcher> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if is_relevant(&event) => {
            let _ = tx.send(event);
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "content watcher error"),
    })
    .context("Failed to create file watcher")?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", root.display()))?;

    info!(root = %root.display(), "watching content for changes");

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            debug!(paths = ?event.paths, "content changed");

            let quiet = tokio::time::sleep(DEBOUNCE);
            tokio::pin!(quiet);
            loop {
                tokio::select! {
                    _ = &mut quiet => break,
                    more = rx.recv() => {
                        if more.is_none() {
                            return;
                        }
                    }
                }
            }

            match service.refresh().await {
                Ok(report) if report.unchanged => {
                    debug!(generation = report.generation, "refresh found no changes")
                }
                Ok(report) => info!(
                    generation = report.generation,
                    articles = report.articles,
                    "refreshed after content change"
                ),
                Err(e) => error!(error = %e, "refresh after content change failed"),
            }
        }
    });

    Ok(watcher)
}

fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| is_markdown(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};
    use std::path::PathBuf;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn markdown_changes_are_relevant() {
        assert!(is_relevant(&event(EventKind::Create(CreateKind::File), "a/post.md")));
        assert!(is_relevant(&event(EventKind::Modify(ModifyKind::Any), "post.markdown")));
        assert!(is_relevant(&event(EventKind::Remove(RemoveKind::File), "post.md")));
    }

    #[test]
    fn other_changes_are_ignored() {
        assert!(!is_relevant(&event(EventKind::Modify(ModifyKind::Any), "style.css")));
        assert!(!is_relevant(&event(EventKind::Access(AccessKind::Any), "post.md")));
    }
}
