/// Top action bar — root selection, operation controls, export, and
/// branding.
use crate::export;
use crate::state::{AppPhase, AppState};
use egui::Ui;
use std::path::PathBuf;

/// Draw the toolbar.
pub fn toolbar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        // App title — uses the egui accent/hyperlink colour so it adapts to
        // dark and light mode automatically.
        ui.label(
            egui::RichText::new("🗂 FolderSleuth")
                .size(18.0)
                .strong()
                .color(ui.visuals().hyperlink_color),
        );

        ui.separator();

        let idle = state.phase == AppPhase::Idle;

        // Root path input + native folder picker.
        ui.add_enabled(
            idle,
            egui::TextEdit::singleline(&mut state.root_input)
                .hint_text("Folder to survey…")
                .desired_width(260.0),
        );
        if ui.add_enabled(idle, egui::Button::new("📂 Browse")).clicked() {
            if let Some(path) = rfd::FileDialog::new().pick_folder() {
                state.root_input = path.to_string_lossy().into_owned();
            }
        }

        // Recent directories.
        let mut picked_recent: Option<String> = None;
        egui::ComboBox::from_id_salt("recent_dirs")
            .selected_text("Recent")
            .width(80.0)
            .show_ui(ui, |ui| {
                for dir in &state.config.recent_directories {
                    if ui.selectable_label(false, dir).clicked() {
                        picked_recent = Some(dir.clone());
                    }
                }
            });
        if let Some(dir) = picked_recent {
            state.root_input = dir;
        }

        ui.separator();

        // Scan button.
        let can_scan = idle && !state.root_input.trim().is_empty();
        if ui
            .add_enabled(can_scan, egui::Button::new("▶ Scan"))
            .on_hover_text("List the subdirectories of the chosen folder")
            .clicked()
        {
            let root = PathBuf::from(state.root_input.trim());
            state.start_scan(root);
        }

        // Calculate button.
        let can_calculate = idle && state.selected_count() > 0;
        if ui
            .add_enabled(can_calculate, egui::Button::new("∑ Calculate"))
            .on_hover_text(if can_calculate {
                "Compute size and file count for the ticked folders"
            } else {
                "Tick at least one folder first"
            })
            .clicked()
        {
            state.start_calculate();
        }

        // Backup button opens the destination dialog.
        let can_backup = idle && state.selected_count() > 0;
        if ui
            .add_enabled(can_backup, egui::Button::new("🗄 Backup"))
            .on_hover_text(if can_backup {
                "Copy the ticked folders to a backup destination"
            } else {
                "Tick at least one folder first"
            })
            .clicked()
        {
            state.show_backup_dialog = true;
        }

        // Stop button (only while an operation runs).
        if ui
            .add_enabled(!idle, egui::Button::new("⏹ Stop"))
            .clicked()
        {
            state.cancel();
        }

        ui.separator();

        // Selection helpers.
        let has_entries = !state.entries.read().is_empty();
        if ui
            .add_enabled(has_entries && idle, egui::Button::new("Select all"))
            .clicked()
        {
            state.set_all_selected(true);
        }
        if ui
            .add_enabled(has_entries && idle, egui::Button::new("Clear"))
            .clicked()
        {
            state.set_all_selected(false);
        }

        ui.separator();

        // Export the current table to CSV.
        if ui
            .add_enabled(has_entries, egui::Button::new("📤 Export"))
            .on_hover_text(if has_entries {
                "Export the table to CSV"
            } else {
                "Scan a folder first to enable export"
            })
            .clicked()
        {
            if let Some(path) = rfd::FileDialog::new()
                .set_file_name("foldersleuth.csv")
                .add_filter("CSV", &["csv"])
                .save_file()
            {
                let entries = state.entries.read().clone();
                if let Err(err) = export::write_csv(&path, &entries) {
                    tracing::warn!("CSV export failed: {err}");
                    state.errors.push(format!("Export failed: {err}"));
                }
            }
        }

        // Right-aligned controls.
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            // About button.
            if ui.button("ℹ").on_hover_text("About FolderSleuth").clicked() {
                state.show_about = true;
            }

            // Theme toggle (☀ light / 🌙 dark).
            let theme_label = if state.dark_mode { "☀" } else { "🌙" };
            let theme_tip = if state.dark_mode {
                "Switch to light mode"
            } else {
                "Switch to dark mode"
            };
            if ui.button(theme_label).on_hover_text(theme_tip).clicked() {
                state.dark_mode = !state.dark_mode;
            }
        });
    });
}
