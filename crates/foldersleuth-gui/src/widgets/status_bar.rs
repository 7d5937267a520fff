/// Bottom status bar — operation progress and table totals.
use crate::state::{AppPhase, AppState};
use egui::Ui;
use foldersleuth_core::model::size::{format_count, format_size};

/// Draw the status bar at the bottom of the window.
pub fn status_bar(ui: &mut Ui, state: &AppState) {
    // Extract theme-adaptive colours once for this frame.
    let color_accent = ui.visuals().hyperlink_color;
    let color_weak = ui.visuals().weak_text_color();
    let color_normal = ui.visuals().text_color();
    let color_warning = egui::Color32::from_rgb(0xfa, 0xb3, 0x87);
    let color_success = egui::Color32::from_rgb(0xa6, 0xe3, 0xa1);

    ui.horizontal(|ui| {
        match state.phase {
            AppPhase::Idle => {
                match state.last_success {
                    Some(true) => {
                        ui.label(
                            egui::RichText::new("\u{2713} Done")
                                .size(12.0)
                                .color(color_success),
                        );
                    }
                    Some(false) => {
                        ui.label(
                            egui::RichText::new("\u{23f9} Stopped")
                                .size(12.0)
                                .color(color_warning),
                        );
                    }
                    None => {
                        ui.label(egui::RichText::new("Ready").size(12.0).color(color_weak));
                    }
                }
            }
            AppPhase::Scanning => {
                ui.spinner();
                let found = state.entries.read().len();
                ui.label(
                    egui::RichText::new(format!("Scanning… {found} folders found"))
                        .size(12.0)
                        .color(color_normal),
                );
            }
            AppPhase::Calculating => {
                ui.spinner();
                ui.label(
                    egui::RichText::new(format!(
                        "Calculating… {}/{}",
                        state.op_current, state.op_total
                    ))
                    .size(12.0)
                    .color(color_normal),
                );
                if state.items_per_sec > 0.0 {
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!("{:.1} folders/s", state.items_per_sec))
                            .size(12.0)
                            .color(color_weak),
                    );
                }
            }
            AppPhase::BackingUp => {
                ui.spinner();
                let display_path = truncate_path(&state.current_file, 50);
                ui.label(
                    egui::RichText::new(format!(
                        "Backing up {}/{}: {display_path}",
                        state.op_current, state.op_total
                    ))
                    .size(12.0)
                    .color(color_normal),
                );
                ui.separator();
                ui.label(
                    egui::RichText::new(format_size(state.total_bytes_copied))
                        .size(12.0)
                        .color(color_accent),
                );
                if state.bytes_per_sec > 0.0 {
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!("{}/s", format_size(state.bytes_per_sec as u64)))
                            .size(12.0)
                            .color(color_weak),
                    );
                }
            }
        }

        // Table totals, always visible on the right.
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let entry_count = state.entries.read().len();
            ui.label(
                egui::RichText::new(format_size(state.total_size()))
                    .size(12.0)
                    .color(color_accent),
            );
            ui.separator();
            ui.label(
                egui::RichText::new(format!("{} files", format_count(state.total_files())))
                    .size(12.0)
                    .color(color_normal),
            );
            ui.separator();
            ui.label(
                egui::RichText::new(format!("{} folders", format_count(entry_count as u64)))
                    .size(12.0)
                    .color(color_normal),
            );
            if !state.errors.is_empty() {
                ui.separator();
                ui.label(
                    egui::RichText::new(format!("{} errors", state.errors.len()))
                        .size(12.0)
                        .color(color_warning),
                );
            }
        });
    });
}

/// Truncate a path string to fit within `max_len` characters,
/// replacing the middle with "..." if needed.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.len() <= max_len {
        return path.to_string();
    }
    let half = (max_len - 3) / 2;
    format!("{}...{}", &path[..half], &path[path.len() - half..])
}
