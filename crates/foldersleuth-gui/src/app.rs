/// Main `eframe::App` implementation for FolderSleuth.
///
/// This is the top-level UI layout that composes the toolbar, the entry
/// table, the status bar, and the dialogs.
use crate::state::{AppPhase, AppState};
use crate::widgets;
use std::path::PathBuf;

/// The FolderSleuth application.
pub struct FolderSleuthApp {
    state: AppState,
}

impl FolderSleuthApp {
    /// Create a new application instance, loading the persisted config.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Apply initial dark visuals.
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self {
            state: AppState::new(),
        }
    }
}

impl eframe::App for FolderSleuthApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Apply theme ───────────────────────────────────────────────────
        // Called every frame so that toggling dark_mode takes effect
        // immediately on the next rendered frame.
        if self.state.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        // ── Process background messages ───────────────────────────────────
        let _data_changed = self.state.process_messages();

        // Request continuous repaint while an operation runs so progress
        // and the live entry table keep moving without input events.
        if self.state.phase != AppPhase::Idle {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        // ── Top toolbar ───────────────────────────────────────────────────
        egui::TopBottomPanel::top("toolbar")
            .min_height(36.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                widgets::toolbar::toolbar(ui, &mut self.state);
                ui.add_space(4.0);
            });

        // ── Backup destination dialog ─────────────────────────────────────
        if self.state.show_backup_dialog {
            let mut open = true;
            let mut start_backup = false;
            egui::Window::new("Backup destination")
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!(
                        "Copy {} selected folder(s) to:",
                        self.state.selected_count()
                    ));
                    ui.add_space(4.0);
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.state.backup_dest_input)
                                .hint_text("Destination folder…")
                                .desired_width(280.0),
                        );
                        if ui.button("📂 Browse").clicked() {
                            if let Some(path) = rfd::FileDialog::new().pick_folder() {
                                self.state.backup_dest_input =
                                    path.to_string_lossy().into_owned();
                            }
                        }
                    });
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        let can_start = !self.state.backup_dest_input.trim().is_empty();
                        if ui
                            .add_enabled(can_start, egui::Button::new("Start backup"))
                            .clicked()
                        {
                            start_backup = true;
                        }
                        if ui.button("Cancel").clicked() {
                            self.state.show_backup_dialog = false;
                        }
                    });
                });
            if start_backup {
                let dest = PathBuf::from(self.state.backup_dest_input.trim());
                self.state.show_backup_dialog = false;
                self.state.start_backup(dest);
            }
            if !open {
                self.state.show_backup_dialog = false;
            }
        }

        // ── About dialog ──────────────────────────────────────────────────
        let mut show_about = self.state.show_about;
        egui::Window::new("About FolderSleuth")
            .open(&mut show_about)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .fixed_size([320.0, 0.0])
            .show(ctx, |ui| {
                let accent = ui.visuals().hyperlink_color;
                let muted = ui.visuals().weak_text_color();

                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.label(
                        egui::RichText::new("🗂 FolderSleuth")
                            .size(24.0)
                            .strong()
                            .color(accent),
                    );
                    ui.add_space(4.0);
                    ui.label(
                        egui::RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                            .size(13.0)
                            .color(muted),
                    );
                    ui.add_space(12.0);
                    ui.label(
                        egui::RichText::new(
                            "A folder size surveyor and backup tool.\n\
                             Cancellable scans, exact per-folder totals,\n\
                             and buffered backup copies.",
                        )
                        .size(12.0),
                    );
                    ui.add_space(12.0);
                    ui.separator();
                    ui.add_space(8.0);
                    ui.hyperlink_to(
                        "github.com/Swatto86/FolderSleuth",
                        "https://github.com/Swatto86/FolderSleuth",
                    );
                    ui.add_space(4.0);
                    ui.label(
                        egui::RichText::new("MIT License - (c) 2026 Swatto")
                            .size(11.0)
                            .color(muted),
                    );
                    ui.add_space(8.0);
                });
            });
        self.state.show_about = show_about;

        // ── Bottom status bar ─────────────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(24.0)
            .show(ctx, |ui| {
                ui.add_space(2.0);
                widgets::status_bar::status_bar(ui, &self.state);
                ui.add_space(2.0);
            });

        // ── Central panel (entry table) ───────────────────────────────────
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.entries.read().is_empty() && self.state.phase == AppPhase::Idle {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("Pick a folder and press Scan to begin")
                            .color(ui.visuals().weak_text_color()),
                    );
                });
            } else {
                widgets::entry_table::entry_table(ui, &mut self.state);
            }
        });
    }
}
