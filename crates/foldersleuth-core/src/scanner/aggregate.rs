/// Batch size aggregation — a sequential recursive descent per entry.
///
/// Entries are processed strictly in input order with no parallel walks,
/// which protects disk I/O from thrashing and keeps progress semantics
/// simple. A bad entry (unreadable subtree) becomes `EntryStatus::Error`
/// and the batch continues; cancellation stops the batch and never writes
/// partial sums back.
use crate::cancel::CancelSignal;
use crate::model::EntryStatus;
use crate::progress::{send_progress, ProgressEvent};
use crate::rate::RateWindow;
use crate::scanner::SharedEntries;
use crossbeam_channel::Sender;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Sliding-window length for the displayed entries/second rate.
const CALC_RATE_SAMPLES: usize = 5;

/// Outcome of one entry's recursive walk.
enum WalkOutcome {
    /// Total bytes and regular-file count for the subtree.
    Done { size: u64, file_count: u64 },
    Cancelled,
}

/// Aggregate worker body: computes size and file count for the entries at
/// `indices`, strictly in order, mutating them in place in `entries`.
///
/// Per-entry errors do not abort the batch; overall success is true unless
/// the batch was cancelled.
pub fn run_calc_batch(
    entries: SharedEntries,
    indices: Vec<usize>,
    signal: CancelSignal,
    tx: Sender<ProgressEvent>,
) {
    let total = indices.len();
    let mut rate = RateWindow::new(CALC_RATE_SAMPLES);

    for (position, &index) in indices.iter().enumerate() {
        if signal.is_cancelled() {
            let _ = tx.send(ProgressEvent::Completed { success: false });
            return;
        }

        // Reset the entry before the new attempt and take its path; the
        // write lock is held only for the mutation, never across the walk.
        let path = {
            let mut guard = entries.write();
            let Some(entry) = guard.get_mut(index) else {
                warn!("aggregate index {index} out of range, skipping");
                continue;
            };
            entry.reset();
            entry.path().to_path_buf()
        };

        let started = Instant::now();
        let outcome = walk_tree(&path, &signal);
        let elapsed = started.elapsed();

        let snapshot = {
            let mut guard = entries.write();
            let entry = &mut guard[index];
            match outcome {
                Ok(WalkOutcome::Done { size, file_count }) => {
                    entry.mark_computed(size, file_count);
                }
                Ok(WalkOutcome::Cancelled) => {
                    entry.mark_cancelled();
                }
                Err(err) => {
                    warn!("aggregation failed for {}: {err}", path.display());
                    entry.mark_error();
                }
            }
            entry.clone()
        };

        if snapshot.status() == EntryStatus::Cancelled {
            let _ = tx.send(ProgressEvent::Completed { success: false });
            return;
        }

        rate.record(1, elapsed);
        send_progress(
            &tx,
            ProgressEvent::Calc {
                entry: snapshot,
                current: position + 1,
                total,
                items_per_sec: rate.per_second(),
            },
        );
    }

    let _ = tx.send(ProgressEvent::Completed { success: true });
}

/// Recursively walk `root`, summing non-directory sizes.
///
/// Serial traversal with `follow_links(false)`: symlinked directories are
/// not descended into, and a symlink contributes its own link length, not
/// its target's. Regular files contribute length and count. The token is
/// checked on every walked entry; any walk or stat error aborts this
/// entry's walk so the caller can discard the partial sums.
fn walk_tree(root: &Path, signal: &CancelSignal) -> io::Result<WalkOutcome> {
    let walker = jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(jwalk::Parallelism::Serial);

    let mut size: u64 = 0;
    let mut file_count: u64 = 0;

    for entry_result in walker {
        if signal.is_cancelled() {
            return Ok(WalkOutcome::Cancelled);
        }

        let entry = entry_result.map_err(|err| io::Error::other(err.to_string()))?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        // Stat with symlink_metadata so links report their own length.
        let meta = std::fs::symlink_metadata(entry.path())?;
        if file_type.is_file() {
            size += meta.len();
            file_count += 1;
        } else if file_type.is_symlink() {
            size += meta.len();
        }
    }

    debug!(
        "walked {}: {size} bytes in {file_count} files",
        root.display()
    );
    Ok(WalkOutcome::Done { size, file_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_bytes(path: &Path, n: usize) {
        let mut f = fs::File::create(path).unwrap();
        f.write_all(&vec![0u8; n]).unwrap();
    }

    #[test]
    fn walk_sums_regular_files_exactly() {
        let tmp = TempDir::new().unwrap();
        write_bytes(&tmp.path().join("a.bin"), 100);
        let nested = tmp.path().join("deep").join("deeper");
        fs::create_dir_all(&nested).unwrap();
        write_bytes(&nested.join("b.bin"), 250);

        let token = CancelToken::new();
        let signal = token.reset();
        match walk_tree(tmp.path(), &signal).unwrap() {
            WalkOutcome::Done { size, file_count } => {
                assert_eq!(size, 350);
                assert_eq!(file_count, 2);
            }
            WalkOutcome::Cancelled => panic!("walk must not report cancelled"),
        }
    }

    #[test]
    fn walk_observes_pre_cancelled_signal() {
        let tmp = TempDir::new().unwrap();
        write_bytes(&tmp.path().join("a.bin"), 100);

        let token = CancelToken::new();
        let signal = token.reset();
        token.request();
        assert!(matches!(
            walk_tree(tmp.path(), &signal).unwrap(),
            WalkOutcome::Cancelled
        ));
    }

    #[test]
    fn walk_missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("gone");
        let token = CancelToken::new();
        let signal = token.reset();
        assert!(walk_tree(&missing, &signal).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn walk_does_not_follow_symlinked_directories() {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("data");
        fs::create_dir_all(&data).unwrap();
        write_bytes(&data.join("big.bin"), 10_000);

        let scanned = tmp.path().join("scanned");
        fs::create_dir_all(&scanned).unwrap();
        std::os::unix::fs::symlink(&data, scanned.join("link")).unwrap();

        let token = CancelToken::new();
        let signal = token.reset();
        match walk_tree(&scanned, &signal).unwrap() {
            WalkOutcome::Done { size, file_count } => {
                // The link's own length only — never the 10 000-byte target.
                assert!(size < 10_000, "target contents must not be counted, got {size}");
                assert_eq!(file_count, 0);
            }
            WalkOutcome::Cancelled => panic!("walk must not report cancelled"),
        }
    }
}
