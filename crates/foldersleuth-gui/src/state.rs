/// Application state management.
///
/// Centralises all mutable state that the UI reads and writes. Background
/// workers communicate via the coordinator's event channel; state updates
/// happen in `process_messages()` which runs once per frame. The entry
/// table itself lives in a shared `SharedEntries` that the aggregation
/// worker mutates in place and the UI reads under a read lock each frame.
use crate::config::AppConfig;
use crossbeam_channel::Receiver;
use foldersleuth_core::progress::ProgressEvent;
use foldersleuth_core::scanner::SharedEntries;
use foldersleuth_core::task::{Coordinator, Operation};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

/// The current phase of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// Idle — no operation in progress, possibly showing previous results.
    Idle,
    /// Enumerating subdirectories of the chosen root.
    Scanning,
    /// Computing sizes for the selected entries.
    Calculating,
    /// Copying selected entries to the backup destination.
    BackingUp,
}

/// Maximum number of progress messages drained from the channel per frame.
///
/// Prevents a backlog (e.g. after the window was hidden) from blocking the
/// render thread for a perceptible duration when it is eventually shown
/// again.
const MAX_MESSAGES_PER_FRAME: usize = 300;

/// Maximum retained failure messages. Older failures scroll away rather
/// than growing the list without bound.
const MAX_ERRORS: usize = 1_000;

/// All application state.
pub struct AppState {
    // ── Root selection ─────────────────────────────────
    /// The path text currently in the toolbar input.
    pub root_input: String,
    pub config: AppConfig,

    // ── Operation ──────────────────────────────────────
    pub phase: AppPhase,
    pub coordinator: Coordinator,
    /// Event stream of the active operation, if any.
    pub progress_rx: Option<Receiver<ProgressEvent>>,
    /// Outcome of the most recently finished operation.
    pub last_success: Option<bool>,

    // ── Progress counters ──────────────────────────────
    pub op_current: usize,
    pub op_total: usize,
    pub items_per_sec: f64,
    pub bytes_per_sec: f64,
    pub total_bytes_copied: u64,
    pub current_file: String,

    // ── Entries ────────────────────────────────────────
    pub entries: SharedEntries,

    // ── UI state ───────────────────────────────────────
    pub errors: Vec<String>,
    pub show_about: bool,
    pub show_backup_dialog: bool,
    pub backup_dest_input: String,
    /// `true` = dark mode (default), `false` = light mode.
    pub dark_mode: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(AppConfig::default())
    }
}

impl AppState {
    /// Create initial application state, loading the persisted config.
    pub fn new() -> Self {
        Self::with_config(AppConfig::load())
    }

    /// Create state around an explicit config (used by tests to avoid
    /// touching the on-disk config).
    pub fn with_config(config: AppConfig) -> Self {
        let root_input = config.last_directory.clone().unwrap_or_default();
        Self {
            root_input,
            config,
            phase: AppPhase::Idle,
            coordinator: Coordinator::new(),
            progress_rx: None,
            last_success: None,
            op_current: 0,
            op_total: 0,
            items_per_sec: 0.0,
            bytes_per_sec: 0.0,
            total_bytes_copied: 0,
            current_file: String::new(),
            entries: Arc::new(RwLock::new(Vec::new())),
            errors: Vec::new(),
            show_about: false,
            show_backup_dialog: false,
            backup_dest_input: String::new(),
            dark_mode: true,
        }
    }

    fn begin_operation(&mut self, phase: AppPhase) {
        self.phase = phase;
        self.last_success = None;
        self.op_current = 0;
        self.op_total = 0;
        self.items_per_sec = 0.0;
        self.bytes_per_sec = 0.0;
        self.total_bytes_copied = 0;
        self.current_file.clear();
    }

    /// Start enumerating the given root. Replaces the entry table and any
    /// failures accumulated for the previous one.
    pub fn start_scan(&mut self, root: PathBuf) {
        self.begin_operation(AppPhase::Scanning);
        self.errors.clear();
        self.config.add_recent(&root.to_string_lossy());
        self.config.save();

        let rx = self.coordinator.submit(Operation::Enumerate {
            root,
            entries: self.entries.clone(),
        });
        self.progress_rx = Some(rx);
    }

    /// Start size aggregation for the currently selected entries.
    pub fn start_calculate(&mut self) {
        let indices = self.selected_indices();
        if indices.is_empty() {
            return;
        }
        self.begin_operation(AppPhase::Calculating);
        let rx = self.coordinator.submit(Operation::Aggregate {
            entries: self.entries.clone(),
            indices,
        });
        self.progress_rx = Some(rx);
    }

    /// Start backing up the currently selected entries into `dest`.
    pub fn start_backup(&mut self, dest: PathBuf) {
        let sources: Vec<PathBuf> = {
            let guard = self.entries.read();
            guard
                .iter()
                .filter(|e| e.selected)
                .map(|e| e.path().to_path_buf())
                .collect()
        };
        if sources.is_empty() {
            return;
        }
        self.begin_operation(AppPhase::BackingUp);
        let rx = self.coordinator.submit(Operation::Backup { sources, dest });
        self.progress_rx = Some(rx);
    }

    /// Request cancellation of the active operation.
    pub fn cancel(&self) {
        self.coordinator.cancel_current();
    }

    /// Process pending progress messages. Called once per frame.
    ///
    /// Returns `true` if the UI should repaint (new data arrived). Capped
    /// at [`MAX_MESSAGES_PER_FRAME`] messages per call so a backlog cannot
    /// stall the render thread.
    pub fn process_messages(&mut self) -> bool {
        let Some(rx) = self.progress_rx.clone() else {
            return false;
        };

        let mut repaint = false;
        let mut messages_this_frame = 0usize;
        while messages_this_frame < MAX_MESSAGES_PER_FRAME {
            let msg = match rx.try_recv() {
                Ok(m) => m,
                Err(_) => break,
            };
            messages_this_frame += 1;
            repaint = true;
            match msg {
                ProgressEvent::Scan { .. } => {
                    // The entry is already in the shared collection; the
                    // event is just a repaint hint.
                }
                ProgressEvent::Calc {
                    current,
                    total,
                    items_per_sec,
                    ..
                } => {
                    self.op_current = current;
                    self.op_total = total;
                    self.items_per_sec = items_per_sec;
                }
                ProgressEvent::Copy {
                    current_file,
                    current,
                    total,
                    bytes_per_sec,
                    total_bytes_copied,
                } => {
                    self.current_file = current_file.to_string_lossy().into_owned();
                    self.op_current = current;
                    self.op_total = total;
                    self.bytes_per_sec = bytes_per_sec;
                    self.total_bytes_copied = total_bytes_copied;
                }
                ProgressEvent::Failed { kind, message } => {
                    tracing::warn!("operation failed: {kind:?}: {message}");
                    if self.errors.len() < MAX_ERRORS {
                        self.errors.push(message);
                    }
                }
                ProgressEvent::Completed { success } => {
                    self.last_success = Some(success);
                    self.phase = AppPhase::Idle;
                    self.progress_rx = None;
                    return true;
                }
            }
        }

        repaint
    }

    // ── Selection and totals ───────────────────────────

    /// Indices of the selected entries, in table order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.entries
            .read()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.selected)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.entries.read().iter().filter(|e| e.selected).count()
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        for entry in self.entries.write().iter_mut() {
            entry.selected = selected;
        }
    }

    /// Sum of all computed sizes. Entries without a computed size
    /// contribute nothing.
    pub fn total_size(&self) -> u64 {
        self.entries
            .read()
            .iter()
            .filter_map(|e| e.size())
            .sum()
    }

    /// Sum of all computed file counts.
    pub fn total_files(&self) -> u64 {
        self.entries
            .read()
            .iter()
            .filter_map(|e| e.file_count())
            .sum()
    }
}
