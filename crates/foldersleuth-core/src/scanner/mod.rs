/// Scanner module — directory enumeration and shared entry state.
///
/// The enumerator lists the immediate child directories of a root path and
/// populates a **shared entry collection** (`Arc<RwLock<_>>`) so the UI can
/// render rows as they are found. The recursive size aggregation for
/// selected entries lives in [`aggregate`] and mutates the same shared
/// collection in place, one entry at a time.
pub mod aggregate;

use crate::cancel::CancelSignal;
use crate::model::FileSystemEntry;
use crate::progress::{send_progress, ProgressEvent, TaskError};
use compact_str::CompactString;
use crossbeam_channel::Sender;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// A shared, concurrently-readable entry collection.
///
/// Workers hold the write lock briefly per mutation. The UI holds a read
/// lock each frame to render the table.
pub type SharedEntries = Arc<RwLock<Vec<FileSystemEntry>>>;

/// List the immediate child directories of `root`, lazily, in
/// directory-listing order (implementation-defined; callers that need
/// sorted output must sort).
///
/// Symlinked directories are included but not followed further at this
/// stage. Errors reading a specific child are logged and that child is
/// skipped; a missing or non-directory root fails up front with
/// [`TaskError::NotFound`].
pub fn list_subdirectories(
    root: &Path,
) -> Result<impl Iterator<Item = FileSystemEntry>, TaskError> {
    if !root.is_dir() {
        return Err(TaskError::NotFound(root.to_path_buf()));
    }
    let read_dir = std::fs::read_dir(root).map_err(|source| TaskError::Access {
        path: root.to_path_buf(),
        source,
    })?;

    Ok(read_dir.filter_map(|result| {
        let dir_entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!("skipping unreadable directory entry: {err}");
                return None;
            }
        };
        let path = dir_entry.path();
        // `Path::is_dir` follows symlinks, so symlinked directories are
        // listed here; the aggregator later walks entries without
        // following links.
        if !path.is_dir() {
            return None;
        }
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        Some(FileSystemEntry::new(CompactString::new(&name), path))
    }))
}

/// Enumerate worker body: replaces `entries` wholesale with the child
/// directories of `root`, emitting one `Scan` event per entry found.
///
/// The token is checked before each yield; on cancellation mid-listing the
/// worker stops early and reports `Completed { success: false }` —
/// cancellation is not a fault.
pub fn run_enumerate(
    root: PathBuf,
    entries: SharedEntries,
    signal: CancelSignal,
    tx: Sender<ProgressEvent>,
) {
    info!("Enumerating subdirectories of {}", root.display());
    entries.write().clear();

    let iter = match list_subdirectories(&root) {
        Ok(iter) => iter,
        Err(err) => {
            warn!("enumeration failed before start: {err}");
            let _ = tx.send(ProgressEvent::Failed {
                kind: err.kind(),
                message: err.to_string(),
            });
            let _ = tx.send(ProgressEvent::Completed { success: false });
            return;
        }
    };

    let mut found = 0usize;
    for entry in iter {
        if signal.is_cancelled() {
            info!("enumeration cancelled after {found} entries");
            let _ = tx.send(ProgressEvent::Completed { success: false });
            return;
        }
        entries.write().push(entry.clone());
        found += 1;
        send_progress(&tx, ProgressEvent::Scan { entry });
    }

    info!("Enumeration complete: {found} subdirectories");
    let _ = tx.send(ProgressEvent::Completed { success: true });
}
