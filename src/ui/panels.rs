use eframe::egui::{self, Align2, Color32, RichText, ScrollArea, Ui};

use crate::config::{Delimiter, FileType};
use crate::state::AppState;
use crate::ui::preview;

// ---------------------------------------------------------------------------
// Left side panel – data file, actions and status log
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data");
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        let edit = egui::TextEdit::singleline(&mut state.config.file_options.filename)
            .hint_text("data file")
            .desired_width(ui.available_width() - 70.0);
        if ui.add(edit).lost_focus() {
            state.filename_edited();
        }
        if ui.button("Import…").clicked() {
            import_file_dialog(state);
        }
    });

    file_options(ui, state);

    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Load data").clicked() {
            state.load_data();
        }
        if ui.button("Show plots").clicked() {
            state.show_plots();
        }
        if ui.button("Close plots").clicked() {
            state.close_plots();
        }
    });

    if let Some(table) = &state.data {
        let (rows, cols) = table.shape();
        egui::CollapsingHeader::new(format!("Preview  [{rows}, {cols}]"))
            .default_open(false)
            .show(ui, |ui: &mut Ui| preview::data_preview(ui, table));
    }

    ui.separator();
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Log");
        if ui.small_button("Clear").clicked() {
            state.clear_log();
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui: &mut Ui| {
            for entry in &state.log {
                ui.label(RichText::new(entry).monospace());
            }
        });
}

/// File type, delimiter, column count and header rows.
fn file_options(ui: &mut Ui, state: &mut AppState) {
    let mut changed = false;
    let opts = &mut state.config.file_options;

    egui::Grid::new("file_options")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Format");
            egui::ComboBox::from_id_salt("file_type")
                .selected_text(opts.filetype.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for t in FileType::ALL {
                        changed |= ui
                            .selectable_value(&mut opts.filetype, t, t.label())
                            .changed();
                    }
                });
            ui.end_row();

            let is_text = opts.filetype == FileType::Text;

            ui.label("Delimiter");
            ui.add_enabled_ui(is_text, |ui: &mut Ui| {
                egui::ComboBox::from_id_salt("delimiter")
                    .selected_text(opts.delimiter.label())
                    .show_ui(ui, |ui: &mut Ui| {
                        for d in Delimiter::ALL {
                            changed |= ui
                                .selectable_value(&mut opts.delimiter, d, d.label())
                                .changed();
                        }
                    });
            });
            ui.end_row();

            ui.label("Header rows");
            changed |= ui
                .add_enabled(
                    is_text,
                    egui::DragValue::new(&mut opts.header_rows).range(0..=9999),
                )
                .changed();
            ui.end_row();

            ui.label("Columns");
            changed |= ui
                .add_enabled(
                    opts.filetype.is_binary(),
                    egui::DragValue::new(&mut opts.columns).range(1..=9999),
                )
                .changed();
            ui.end_row();
        });

    if changed {
        state.file_options_changed();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open config…").clicked() {
                open_config_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save config…").clicked() {
                save_config_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Exit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                ui.close_menu();
            }
        });
        ui.menu_button("Help", |ui: &mut Ui| {
            if ui.button("About").clicked() {
                state.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();

        match &state.data {
            Some(table) => {
                let (rows, cols) = table.shape();
                ui.label(format!("{rows} rows × {cols} columns"));
            }
            None => {
                ui.label("no data loaded");
            }
        }
        if state.needs_reload {
            ui.label(RichText::new("reload pending").color(Color32::YELLOW));
        }
    });
}

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

pub fn import_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Import data file")
        .add_filter("All files", &["*"])
        .add_filter("Text", &["txt", "csv", "dat"])
        .add_filter("Binary", &["bin", "dat"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.import_file(&path);
    }
}

pub fn open_config_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Open configuration")
        .add_filter("YAML", &["yaml", "yml"])
        .add_filter("JSON", &["json"]);
    if let Some(dir) = state.config_open_dir() {
        dialog = dialog.set_directory(dir);
    }

    if let Some(path) = dialog.pick_file() {
        state.load_config(&path);
    }
}

/// Returns whether a configuration was written.
pub fn save_config_dialog(state: &mut AppState) -> bool {
    let Some(target) = state.config_save_target() else {
        return false;
    };

    let mut dialog = rfd::FileDialog::new()
        .set_title("Save configuration")
        .add_filter("YAML", &["yaml", "yml"])
        .add_filter("JSON", &["json"]);
    if let Some(dir) = target.parent() {
        dialog = dialog.set_directory(dir);
    }
    if let Some(name) = target.file_name().and_then(|n| n.to_str()) {
        dialog = dialog.set_file_name(name);
    }

    match dialog.save_file() {
        Some(path) => state.save_config(&path),
        None => false,
    }
}

pub fn about_window(ctx: &egui::Context, state: &mut AppState) {
    egui::Window::new("About tplots")
        .open(&mut state.show_about)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            ui.heading("A GUI plot tool");
            ui.label(format!("Version: {}", env!("CARGO_PKG_VERSION")));
            ui.add_space(6.0);
            ui.label("Plot up to three columns of a text, binary or Parquet data file.");
            ui.label("Figure and series settings are saved as YAML.");
        });
}

/// Answer to the unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitChoice {
    Save,
    Discard,
    Cancel,
}

pub fn exit_dialog(ctx: &egui::Context) -> Option<ExitChoice> {
    let mut choice = None;
    egui::Window::new("Confirm Save")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            ui.label("The document has been modified.");
            ui.label("Do you want to save your changes?");
            ui.add_space(6.0);
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Save").clicked() {
                    choice = Some(ExitChoice::Save);
                }
                if ui.button("Discard").clicked() {
                    choice = Some(ExitChoice::Discard);
                }
                if ui.button("Cancel").clicked() {
                    choice = Some(ExitChoice::Cancel);
                }
            });
        });
    choice
}
