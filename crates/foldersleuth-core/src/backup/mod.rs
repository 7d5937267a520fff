/// Backup module — recursive buffered copy of selected directories.
///
/// Each source directory is replicated into `<destination>/<basename>`:
/// directories recreated, regular files copied through a fixed-size
/// buffer, symbolic links replicated as links (never dereferenced), and
/// permissions plus timestamps applied after each copy. Every chunk is a
/// cancellation and progress checkpoint.
///
/// Failure policy is deliberately stricter than aggregation: aggregation
/// is advisory and read-only, but a half-copied backup is not a meaningful
/// partial success, so the first I/O error aborts the entire batch. A
/// cancelled or failed copy leaves any partially written destination file
/// in place; cleanup is the caller's decision.
use crate::cancel::CancelSignal;
use crate::progress::{send_progress, ProgressEvent, TaskError};
use crate::rate::RateWindow;
use crossbeam_channel::Sender;
use filetime::FileTime;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Fixed copy buffer size. Bounds memory use and provides a cancellation
/// and progress checkpoint on every chunk.
pub const COPY_CHUNK_SIZE: usize = 8 * 1024;

/// Sliding-window length for the displayed bytes/second rate — roughly
/// 256 KiB of history at full chunks. A tunable, not a correctness
/// requirement.
const COPY_RATE_SAMPLES: usize = 32;

enum CopyOutcome {
    Done,
    Cancelled,
}

/// Per-batch bookkeeping threaded through the recursive copy.
struct BatchProgress {
    /// 1-based position of the source directory currently being copied.
    current: usize,
    /// Number of source directories in the batch.
    total: usize,
    total_bytes_copied: u64,
    rate: RateWindow,
    last_chunk_at: Instant,
}

impl BatchProgress {
    /// Emit a lossy `Copy` progress snapshot for `current_file`.
    fn emit(&self, tx: &Sender<ProgressEvent>, current_file: &Path) {
        send_progress(
            tx,
            ProgressEvent::Copy {
                current_file: current_file.to_path_buf(),
                current: self.current,
                total: self.total,
                bytes_per_sec: self.rate.per_second(),
                total_bytes_copied: self.total_bytes_copied,
            },
        );
    }
}

/// Copy worker body: replicates each source directory under `dest`, in
/// input order. The destination root is created if missing.
pub fn run_copy_batch(
    sources: Vec<PathBuf>,
    dest: PathBuf,
    signal: CancelSignal,
    tx: Sender<ProgressEvent>,
) {
    info!(
        "Backing up {} directories to {}",
        sources.len(),
        dest.display()
    );

    if let Err(source) = fs::create_dir_all(&dest) {
        fail(
            &tx,
            TaskError::Access {
                path: dest.clone(),
                source,
            },
        );
        return;
    }

    let mut progress = BatchProgress {
        current: 0,
        total: sources.len(),
        total_bytes_copied: 0,
        rate: RateWindow::new(COPY_RATE_SAMPLES),
        last_chunk_at: Instant::now(),
    };

    for (position, source) in sources.iter().enumerate() {
        progress.current = position + 1;
        if signal.is_cancelled() {
            let _ = tx.send(ProgressEvent::Completed { success: false });
            return;
        }

        let Some(base_name) = source.file_name() else {
            fail(&tx, TaskError::NotFound(source.clone()));
            return;
        };
        let target = dest.join(base_name);

        match copy_tree(source, &target, &signal, &mut progress, &tx) {
            Ok(CopyOutcome::Done) => {}
            Ok(CopyOutcome::Cancelled) => {
                info!("backup cancelled while copying {}", source.display());
                let _ = tx.send(ProgressEvent::Completed { success: false });
                return;
            }
            Err(err) => {
                warn!("backup of {} failed: {err}", source.display());
                fail(&tx, err);
                return;
            }
        }
    }

    info!(
        "Backup complete: {} bytes copied",
        progress.total_bytes_copied
    );
    let _ = tx.send(ProgressEvent::Completed { success: true });
}

fn fail(tx: &Sender<ProgressEvent>, err: TaskError) {
    let _ = tx.send(ProgressEvent::Failed {
        kind: err.kind(),
        message: err.to_string(),
    });
    let _ = tx.send(ProgressEvent::Completed { success: false });
}

/// Recursively replicate `src` into `dst`.
///
/// Directory metadata is applied after the directory's contents, so a
/// parent's timestamps are not clobbered by writes into it.
fn copy_tree(
    src: &Path,
    dst: &Path,
    signal: &CancelSignal,
    progress: &mut BatchProgress,
    tx: &Sender<ProgressEvent>,
) -> Result<CopyOutcome, TaskError> {
    fs::create_dir_all(dst).map_err(|source| TaskError::Access {
        path: dst.to_path_buf(),
        source,
    })?;

    let read_dir = fs::read_dir(src).map_err(|source| TaskError::Access {
        path: src.to_path_buf(),
        source,
    })?;

    for dir_entry in read_dir {
        if signal.is_cancelled() {
            return Ok(CopyOutcome::Cancelled);
        }

        let dir_entry = dir_entry.map_err(|source| TaskError::Access {
            path: src.to_path_buf(),
            source,
        })?;
        let entry_src = dir_entry.path();
        let entry_dst = dst.join(dir_entry.file_name());
        let file_type = dir_entry.file_type().map_err(|source| TaskError::Access {
            path: entry_src.clone(),
            source,
        })?;

        if file_type.is_symlink() {
            replicate_symlink(&entry_src, &entry_dst)?;
        } else if file_type.is_dir() {
            match copy_tree(&entry_src, &entry_dst, signal, progress, tx)? {
                CopyOutcome::Done => {}
                CopyOutcome::Cancelled => return Ok(CopyOutcome::Cancelled),
            }
        } else {
            match copy_file(&entry_src, &entry_dst, signal, progress, tx)? {
                CopyOutcome::Done => {
                    apply_metadata(&entry_src, &entry_dst)?;
                    // Definite per-file progress point.
                    progress.emit(tx, &entry_src);
                }
                CopyOutcome::Cancelled => return Ok(CopyOutcome::Cancelled),
            }
        }
    }

    apply_metadata(src, dst)?;
    Ok(CopyOutcome::Done)
}

/// Copy one regular file through the fixed-size buffer.
///
/// Every chunk checks the token and feeds the rate window; on cancellation
/// the partially written destination file is left in place (no rollback).
fn copy_file(
    src: &Path,
    dst: &Path,
    signal: &CancelSignal,
    progress: &mut BatchProgress,
    tx: &Sender<ProgressEvent>,
) -> Result<CopyOutcome, TaskError> {
    let mut reader = File::open(src).map_err(|source| TaskError::Access {
        path: src.to_path_buf(),
        source,
    })?;
    let mut writer = File::create(dst).map_err(|source| TaskError::Access {
        path: dst.to_path_buf(),
        source,
    })?;
    let mut buf = [0u8; COPY_CHUNK_SIZE];

    loop {
        if signal.is_cancelled() {
            return Ok(CopyOutcome::Cancelled);
        }

        let read = reader.read(&mut buf).map_err(|source| TaskError::Access {
            path: src.to_path_buf(),
            source,
        })?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buf[..read])
            .map_err(|source| TaskError::Access {
                path: dst.to_path_buf(),
                source,
            })?;

        progress.total_bytes_copied += read as u64;
        let now = Instant::now();
        progress.rate.record(read as u64, now - progress.last_chunk_at);
        progress.last_chunk_at = now;
        progress.emit(tx, src);
    }

    Ok(CopyOutcome::Done)
}

/// Replicate the symbolic link at `src` as a link at `dst` pointing at the
/// same target, without dereferencing it.
fn replicate_symlink(src: &Path, dst: &Path) -> Result<(), TaskError> {
    let target = fs::read_link(src).map_err(|source| TaskError::Access {
        path: src.to_path_buf(),
        source,
    })?;
    make_symlink(&target, src, dst).map_err(|source| TaskError::Access {
        path: dst.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn make_symlink(target: &Path, _src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(windows)]
fn make_symlink(target: &Path, src: &Path, dst: &Path) -> io::Result<()> {
    use std::os::windows::fs::{symlink_dir, symlink_file};
    // `src` still resolves here, so its target kind picks the link flavour.
    if src.is_dir() {
        symlink_dir(target, dst)
    } else {
        symlink_file(target, dst)
    }
}

#[cfg(not(any(unix, windows)))]
fn make_symlink(_target: &Path, _src: &Path, dst: &Path) -> io::Result<()> {
    Err(io::Error::other(format!(
        "symbolic links are unsupported on this platform: {}",
        dst.display()
    )))
}

/// Apply source permissions and timestamps to the copied destination.
fn apply_metadata(src: &Path, dst: &Path) -> Result<(), TaskError> {
    let meta = fs::metadata(src).map_err(|source| TaskError::Access {
        path: src.to_path_buf(),
        source,
    })?;
    fs::set_permissions(dst, meta.permissions()).map_err(|source| TaskError::Access {
        path: dst.to_path_buf(),
        source,
    })?;

    let accessed = FileTime::from_last_access_time(&meta);
    let modified = FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(dst, accessed, modified).map_err(|source| TaskError::Access {
        path: dst.to_path_buf(),
        source,
    })?;
    Ok(())
}
