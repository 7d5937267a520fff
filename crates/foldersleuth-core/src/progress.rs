/// Progress reporting — lightweight messages sent from worker threads to
/// the caller via a crossbeam channel, plus the operation error taxonomy.
///
/// # Delivery policy
///
/// The entry collection itself (behind its shared lock) is the
/// authoritative state; progress messages only carry counters and
/// snapshots for display. They are therefore sent with `try_send` and
/// dropped when the channel is full — a caller that falls behind loses
/// intermediate updates, never correctness. The terminal
/// [`ProgressEvent::Completed`] and the at-most-one
/// [`ProgressEvent::Failed`] before it use a blocking `send` so they are
/// never lost; their count per operation is bounded, so they cannot flood
/// the channel.
use crate::model::FileSystemEntry;
use crossbeam_channel::Sender;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of progress messages that may queue up in the channel.
///
/// The UI drains this channel once per frame. At 60 fps a burst of 4 096
/// messages gives a worker over a minute of headroom before updates start
/// being dropped; if the UI falls behind (hidden window, resizing) the
/// worker keeps running and only display updates are lost.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Progress updates sent from a worker thread to the caller.
///
/// Delivered in the order they were produced; every operation's stream is
/// terminated by exactly one `Completed`.
#[derive(Debug)]
pub enum ProgressEvent {
    /// The enumerator produced one subdirectory entry.
    Scan { entry: FileSystemEntry },
    /// The aggregator finished one entry of its batch.
    Calc {
        entry: FileSystemEntry,
        current: usize,
        total: usize,
        items_per_sec: f64,
    },
    /// The copy engine advanced: a chunk was written or a file completed.
    Copy {
        current_file: PathBuf,
        current: usize,
        total: usize,
        bytes_per_sec: f64,
        total_bytes_copied: u64,
    },
    /// A fault occurred. Always followed by `Completed { success: false }`.
    Failed { kind: FailureKind, message: String },
    /// Terminal message. `success` is false when the operation was
    /// cancelled or failed; cancellation alone never produces a `Failed`.
    Completed { success: bool },
}

/// Coarse failure classification carried in [`ProgressEvent::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The root path is missing or not a directory; the operation never
    /// started.
    NotFound,
    /// A permission or per-item I/O failure.
    Access,
    /// An unexpected I/O failure.
    Io,
}

/// Operation errors.
///
/// Cancellation is deliberately absent: it is a status, not a fault.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("path not found or not a directory: {0}")]
    NotFound(PathBuf),
    #[error("cannot access {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TaskError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TaskError::NotFound(_) => FailureKind::NotFound,
            TaskError::Access { .. } => FailureKind::Access,
            TaskError::Io(_) => FailureKind::Io,
        }
    }
}

/// Channel slots always left free for the terminal `Failed`/`Completed`
/// pair, which is why a terminal `send` can never block behind a progress
/// backlog (the coordinator joins worker threads, so a worker parked in
/// `send` would freeze the caller).
const TERMINAL_HEADROOM: usize = 2;

/// Lossy send for advisory progress messages.
///
/// Drops the event once the channel is nearly full instead of blocking:
/// the shared entry collection is the authoritative state, so a caller
/// that falls behind only loses display updates.
pub(crate) fn send_progress(tx: &Sender<ProgressEvent>, event: ProgressEvent) {
    if tx.len() + TERMINAL_HEADROOM < PROGRESS_CHANNEL_CAPACITY {
        let _ = tx.try_send(event);
    }
}
