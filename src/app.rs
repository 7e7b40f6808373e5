use eframe::egui;

use crate::state::AppState;
use crate::ui::panels::{self, ExitChoice};
use crate::ui::{options, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TplotsApp {
    pub state: AppState,
    /// Set once the user has answered the save prompt, so the next close
    /// request goes through.
    exit_confirmed: bool,
}

impl TplotsApp {
    /// Intercept window close while a data file is set and ask to save.
    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.exit_confirmed || self.state.data_file.is_none() {
                return;
            }
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.state.confirm_exit = true;
        }

        if !self.state.confirm_exit {
            return;
        }
        let Some(choice) = panels::exit_dialog(ctx) else {
            return;
        };
        self.state.confirm_exit = false;
        match choice {
            ExitChoice::Save => {
                panels::save_config_dialog(&mut self.state);
                self.exit(ctx);
            }
            ExitChoice::Discard => self.exit(ctx),
            ExitChoice::Cancel => {}
        }
    }

    fn exit(&mut self, ctx: &egui::Context) {
        self.state.close_plots();
        self.exit_confirmed = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

impl eframe::App for TplotsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: data file, actions, log ----
        egui::SidePanel::left("data_panel")
            .default_width(340.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: option editors ----
        egui::CentralPanel::default().show(ctx, |ui| {
            options::option_panel(ui, &mut self.state);
        });

        plot::figure_windows(ctx, &mut self.state);
        panels::about_window(ctx, &mut self.state);
        self.handle_close_request(ctx);
    }
}
