//! FolderSleuth — folder size surveyor and backup tool.
//!
//! Thin binary entry point. All logic lives in the `foldersleuth-core`
//! and `foldersleuth-gui` crates.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("FolderSleuth starting");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("FolderSleuth -- Folder Size & Backup")
            .with_inner_size([980.0, 640.0])
            .with_min_inner_size([720.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "FolderSleuth",
        options,
        Box::new(|cc| Ok(Box::new(foldersleuth_gui::FolderSleuthApp::new(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}
