//! Background photo producer.
//!
//! Stands in for the sync/cache collaborator at its interface boundary:
//! rescans the configured directories and publishes the full list through
//! the mailbox whenever membership changes. Never touches the render path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::engine::sleep_cancellable;
use crate::error::Error;
use crate::mailbox::PhotoMailbox;

#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub roots: Vec<PathBuf>,
    pub poll_interval: Duration,
}

/// Return `true` if `path` has an allowed image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    let exts: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| *e == ext)
        })
}

/// Scan the given roots for images, sorted for a stable publish order.
///
/// # Errors
/// Returns [`Error::BadDir`] if any root is missing or not a directory.
pub fn scan(roots: &[PathBuf]) -> Result<Vec<PathBuf>, Error> {
    let bad: Vec<_> = roots
        .iter()
        .filter(|p| !p.is_dir())
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    if !bad.is_empty() {
        return Err(Error::BadDir(bad.join(", ")));
    }

    let mut out = Vec::new();
    for root in roots {
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !should_skip_dir(e))
            .flatten()
        {
            let path = entry.path();
            if path.is_file() && is_supported_image(path) {
                out.push(path.to_path_buf());
            }
        }
    }
    out.sort();
    Ok(out)
}

fn should_skip_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}

/// Rescan until cancelled, publishing through `mailbox` on change.
///
/// `seed` is the list already installed on the consumer, so an unchanged
/// first scan does not trigger a redundant replacement.
pub fn run(
    mailbox: PhotoMailbox,
    opts: SourceOptions,
    seed: Option<Vec<PathBuf>>,
    cancel: CancellationToken,
) {
    let mut last = seed;
    while !cancel.is_cancelled() {
        match scan(&opts.roots) {
            Ok(photos) => {
                if last.as_ref() != Some(&photos) {
                    debug!(count = photos.len(), "publishing photo list");
                    mailbox.publish(photos.clone());
                    last = Some(photos);
                }
            }
            Err(err) => warn!(error = %err, "photo scan failed"),
        }
        sleep_cancellable(&cancel, opts.poll_interval);
    }
}
