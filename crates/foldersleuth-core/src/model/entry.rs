/// One tracked subdirectory — a single row of scan output.
///
/// Entries are created by the enumerator with nothing computed, mutated in
/// place by the aggregator (the only writer during a computation), and read
/// by the copy engine (paths only) and the UI. The whole collection is
/// replaced wholesale when a new root is scanned, never merged.
use crate::model::size::format_size;
use compact_str::CompactString;
use std::path::{Path, PathBuf};

/// Computation status of a [`FileSystemEntry`].
///
/// Transitions only `NotComputed → {Computed, Cancelled, Error}`; a
/// recomputation calls [`FileSystemEntry::reset`] first, which is the only
/// way back to `NotComputed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    NotComputed,
    Computed,
    Cancelled,
    Error,
}

impl EntryStatus {
    /// Short display label.
    pub fn label(self) -> &'static str {
        match self {
            EntryStatus::NotComputed => "Not computed",
            EntryStatus::Computed => "Computed",
            EntryStatus::Cancelled => "Cancelled",
            EntryStatus::Error => "Error",
        }
    }
}

/// One tracked subdirectory.
///
/// `size` and `file_count` are either both unset or both set. The fields
/// are private and the only mutators are the `mark_*` methods below, so
/// the invariant holds by construction rather than by discipline.
#[derive(Debug, Clone)]
pub struct FileSystemEntry {
    /// Base name of the directory.
    pub name: CompactString,
    /// Absolute path; immutable once created.
    path: PathBuf,
    /// Entries represent directories only in this system; files are never
    /// tracked as rows.
    pub is_directory: bool,
    /// Caller-controlled selection flag, independent of status.
    pub selected: bool,
    size: Option<u64>,
    file_count: Option<u64>,
    status: EntryStatus,
}

impl FileSystemEntry {
    pub fn new(name: impl Into<CompactString>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
            is_directory: true,
            selected: false,
            size: None,
            file_count: None,
            status: EntryStatus::NotComputed,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn file_count(&self) -> Option<u64> {
        self.file_count
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    /// Record a finished computation. Size and count are set together.
    pub fn mark_computed(&mut self, size: u64, file_count: u64) {
        self.size = Some(size);
        self.file_count = Some(file_count);
        self.status = EntryStatus::Computed;
    }

    /// Record a cancelled computation. Partial sums are never written back.
    pub fn mark_cancelled(&mut self) {
        self.size = None;
        self.file_count = None;
        self.status = EntryStatus::Cancelled;
    }

    /// Record a failed computation; size and count stay unset.
    pub fn mark_error(&mut self) {
        self.size = None;
        self.file_count = None;
        self.status = EntryStatus::Error;
    }

    /// Reset before a recomputation.
    pub fn reset(&mut self) {
        self.size = None;
        self.file_count = None;
        self.status = EntryStatus::NotComputed;
    }

    /// Human-readable size, or a placeholder when not yet computed.
    pub fn display_size(&self) -> String {
        match self.size {
            Some(bytes) => format_size(bytes),
            None => "Not computed".to_string(),
        }
    }
}
