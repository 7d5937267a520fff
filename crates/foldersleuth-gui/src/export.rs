/// CSV export of the entry table.
use foldersleuth_core::model::FileSystemEntry;
use std::path::Path;

/// Write the entries to `path` as CSV, one row per entry.
///
/// Sizes appear both formatted and as raw bytes so the file is usable by
/// humans and spreadsheets alike; uncomputed values are left empty.
pub fn write_csv(path: &Path, entries: &[FileSystemEntry]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Name", "Path", "Size", "Size (bytes)", "Files", "Status"])?;

    for entry in entries {
        let size_bytes = entry.size().map(|s| s.to_string()).unwrap_or_default();
        let files = entry
            .file_count()
            .map(|c| c.to_string())
            .unwrap_or_default();
        writer.write_record([
            entry.name.as_str(),
            &entry.path().display().to_string(),
            &entry.display_size(),
            &size_bytes,
            &files,
            entry.status().label(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
