/// Task coordination — single-flight execution of background operations.
///
/// The [`Coordinator`] owns the cancellation token and at most one worker
/// thread. At most one of {enumerate, aggregate batch, copy batch} runs at
/// a time: submitting a new operation first cancels the active one and
/// waits for its thread to finish, so the cancelled operation's terminal
/// event is already in its channel before the new worker even exists. The
/// shared cancel token and the mutable entry collection are not designed
/// for concurrent reuse by two operations, and single-flight keeps it that
/// way.
///
/// Externally observable states are `Idle` and `Running(kind)`; the
/// `Stopping` interval exists only inside [`Coordinator::submit`]'s
/// cancel-and-wait, which blocks the submission, not the caller's event
/// loop at other times.
use crate::backup;
use crate::cancel::CancelToken;
use crate::progress::{ProgressEvent, PROGRESS_CHANNEL_CAPACITY};
use crate::scanner::{self, SharedEntries};
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::thread;
use tracing::debug;

/// A background operation to run on its own worker thread.
#[derive(Debug)]
pub enum Operation {
    /// Replace `entries` with the immediate child directories of `root`.
    Enumerate {
        root: PathBuf,
        entries: SharedEntries,
    },
    /// Compute size and file count for `entries[indices]`, in order.
    Aggregate {
        entries: SharedEntries,
        indices: Vec<usize>,
    },
    /// Copy each source directory into `dest/<basename>`.
    Backup {
        sources: Vec<PathBuf>,
        dest: PathBuf,
    },
}

/// Discriminant of [`Operation`], for state queries and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Enumerate,
    Aggregate,
    Backup,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Enumerate { .. } => OperationKind::Enumerate,
            Operation::Aggregate { .. } => OperationKind::Aggregate,
            Operation::Backup { .. } => OperationKind::Backup,
        }
    }
}

impl OperationKind {
    fn thread_name(self) -> &'static str {
        match self {
            OperationKind::Enumerate => "foldersleuth-enumerate",
            OperationKind::Aggregate => "foldersleuth-aggregate",
            OperationKind::Backup => "foldersleuth-backup",
        }
    }
}

struct ActiveOperation {
    kind: OperationKind,
    thread: thread::JoinHandle<()>,
}

/// Owns the cancellation token lifecycle and enforces single-flight
/// execution of background operations.
pub struct Coordinator {
    token: CancelToken,
    active: Option<ActiveOperation>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            token: CancelToken::new(),
            active: None,
        }
    }

    /// Submit an operation, transparently cancelling and waiting out any
    /// active one first.
    ///
    /// Returns the new operation's event stream: FIFO, terminated by
    /// exactly one [`ProgressEvent::Completed`].
    pub fn submit(&mut self, operation: Operation) -> Receiver<ProgressEvent> {
        self.cancel_and_wait();

        let signal = self.token.reset();
        let (tx, rx) = crossbeam_channel::bounded(PROGRESS_CHANNEL_CAPACITY);
        let kind = operation.kind();
        debug!("submitting {kind:?} operation");

        let thread = thread::Builder::new()
            .name(kind.thread_name().into())
            .spawn(move || match operation {
                Operation::Enumerate { root, entries } => {
                    scanner::run_enumerate(root, entries, signal, tx);
                }
                Operation::Aggregate { entries, indices } => {
                    scanner::aggregate::run_calc_batch(entries, indices, signal, tx);
                }
                Operation::Backup { sources, dest } => {
                    backup::run_copy_batch(sources, dest, signal, tx);
                }
            })
            .expect("failed to spawn worker thread");

        self.active = Some(ActiveOperation { kind, thread });
        rx
    }

    /// Request cancellation of the active operation without blocking.
    ///
    /// The worker reports `Completed { success: false }` once it observes
    /// the request; a request with no active operation is a no-op (the
    /// next submission resets the token to a fresh generation).
    pub fn cancel_current(&self) {
        self.token.request();
    }

    /// Cancel the active operation and block until its thread has exited.
    pub fn cancel_and_wait(&mut self) {
        if let Some(active) = self.active.take() {
            self.token.request();
            debug!("waiting for {:?} worker to stop", active.kind);
            let _ = active.thread.join();
        }
    }

    /// Kind of the operation whose worker thread is still running, if any.
    pub fn running_kind(&self) -> Option<OperationKind> {
        self.active
            .as_ref()
            .filter(|a| !a.thread.is_finished())
            .map(|a| a.kind)
    }

    /// True while a worker thread is running.
    pub fn is_running(&self) -> bool {
        self.running_kind().is_some()
    }
}

impl Drop for Coordinator {
    /// Never leave a detached worker mutating shared state behind the
    /// caller's back.
    fn drop(&mut self) {
        self.cancel_and_wait();
    }
}
