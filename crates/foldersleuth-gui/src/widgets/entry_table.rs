/// Central entry table — one row per tracked subdirectory.
///
/// Rendered with `egui_extras` in striped mode. The table reads and writes
/// the shared entry collection directly: the tick column mutates
/// `entry.selected` (caller-owned, independent of status), everything else
/// is read-only display.
use crate::state::AppState;
use egui::Ui;
use egui_extras::{Column, TableBuilder};
use foldersleuth_core::model::EntryStatus;

const ROW_HEIGHT: f32 = 22.0;

/// Draw the entry table.
pub fn entry_table(ui: &mut Ui, state: &mut AppState) {
    let entries = state.entries.clone();
    let mut guard = entries.write();
    let row_count = guard.len();

    // Theme-adaptive status colours.
    let color_success = egui::Color32::from_rgb(0xa6, 0xe3, 0xa1);
    let color_error = egui::Color32::from_rgb(0xf3, 0x8b, 0xa8);
    let color_warning = egui::Color32::from_rgb(0xfa, 0xb3, 0x87);
    let color_weak = ui.visuals().weak_text_color();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::exact(24.0))
        .column(Column::remainder().at_least(160.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(70.0))
        .column(Column::auto().at_least(90.0))
        .header(22.0, |mut header| {
            header.col(|_ui| {});
            header.col(|ui| {
                ui.strong("Name");
            });
            header.col(|ui| {
                ui.strong("Size");
            });
            header.col(|ui| {
                ui.strong("Files");
            });
            header.col(|ui| {
                ui.strong("Status");
            });
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, row_count, |mut row| {
                let entry = &mut guard[row.index()];

                row.col(|ui| {
                    ui.checkbox(&mut entry.selected, "");
                });
                row.col(|ui| {
                    ui.label(entry.name.as_str())
                        .on_hover_text(entry.path().display().to_string());
                });
                row.col(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(entry.display_size());
                    });
                });
                row.col(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        match entry.file_count() {
                            Some(count) => ui.label(count.to_string()),
                            None => ui.label(egui::RichText::new("—").color(color_weak)),
                        };
                    });
                });
                row.col(|ui| {
                    let (label, color) = match entry.status() {
                        EntryStatus::NotComputed => (EntryStatus::NotComputed.label(), color_weak),
                        EntryStatus::Computed => (EntryStatus::Computed.label(), color_success),
                        EntryStatus::Cancelled => (EntryStatus::Cancelled.label(), color_warning),
                        EntryStatus::Error => (EntryStatus::Error.label(), color_error),
                    };
                    ui.label(egui::RichText::new(label).color(color));
                });
            });
        });
}
