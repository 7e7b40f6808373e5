use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::parse_color;
use crate::config::{
    FigSize, FigureOptions, LegendLoc, LineStyle, MarkerStyle, PlotOptions, SERIES_COUNT,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – figure option tree and per-series option grid
// ---------------------------------------------------------------------------

/// Render both option editors. Disabled until a data file is imported.
pub fn option_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.add_enabled_ui(state.editors_enabled, |ui: &mut Ui| {
                egui::CollapsingHeader::new(RichText::new("Figure").strong())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        figure_tree(ui, &mut state.config.figure_options);
                    });

                egui::CollapsingHeader::new(RichText::new("Series").strong())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        plot_grid(ui, &mut state.config.plot_options);
                    });
            });
        });
}

fn figure_tree(ui: &mut Ui, fig: &mut FigureOptions) {
    egui::Grid::new("figure_options")
        .num_columns(2)
        .spacing([24.0, 4.0])
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("Figure name");
            ui.text_edit_singleline(&mut fig.figure);
            ui.end_row();

            ui.label("Figure size");
            egui::ComboBox::from_id_salt("figsize")
                .selected_text(fig.figsize.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for s in FigSize::ALL {
                        ui.selectable_value(&mut fig.figsize, s, s.to_string());
                    }
                });
            ui.end_row();

            ui.label("X axis");
            ui.label(RichText::new(fig.x_axis_summary()).italics());
            ui.end_row();

            ui.label("    data column");
            ui.add_enabled(
                !fig.xaxiscnt,
                egui::DragValue::new(&mut fig.xaxiscol).range(0..=9999),
            );
            ui.end_row();

            ui.label("    count index");
            ui.checkbox(&mut fig.xaxiscnt, "");
            ui.end_row();

            ui.label("Title");
            ui.text_edit_singleline(&mut fig.title);
            ui.end_row();

            ui.label("X label");
            ui.text_edit_singleline(&mut fig.xlabel);
            ui.end_row();

            ui.label("Y label");
            ui.text_edit_singleline(&mut fig.ylabel);
            ui.end_row();

            ui.label("Font size");
            ui.add(egui::DragValue::new(&mut fig.fontsize).range(4.0..=72.0));
            ui.end_row();

            ui.label("Grid");
            ui.checkbox(&mut fig.grid, "");
            ui.end_row();

            ui.label("Legend");
            ui.checkbox(&mut fig.legend, "");
            ui.end_row();

            ui.add_enabled_ui(fig.legend, |ui: &mut Ui| ui.label("    markers and lines"));
            let mut all = fig.legendall;
            if ui
                .add_enabled(fig.legend, egui::Checkbox::without_text(&mut all))
                .changed()
            {
                fig.set_legend_all(all);
            }
            ui.end_row();

            ui.add_enabled_ui(fig.legend, |ui: &mut Ui| ui.label("    markers only"));
            let mut markers = fig.legendmarker;
            if ui
                .add_enabled(fig.legend, egui::Checkbox::without_text(&mut markers))
                .changed()
            {
                fig.set_legend_marker(markers);
            }
            ui.end_row();

            ui.add_enabled_ui(fig.legend, |ui: &mut Ui| ui.label("    location"));
            ui.add_enabled_ui(fig.legend, |ui: &mut Ui| {
                egui::ComboBox::from_id_salt("legendloc")
                    .selected_text(fig.legendloc.label())
                    .show_ui(ui, |ui: &mut Ui| {
                        for loc in LegendLoc::ALL {
                            ui.selectable_value(&mut fig.legendloc, loc, loc.label());
                        }
                    });
            });
            ui.end_row();
        });
}

/// One grid row: a label then one cell per series.
fn series_row(
    ui: &mut Ui,
    label: &str,
    series: &mut [PlotOptions; SERIES_COUNT],
    mut cell: impl FnMut(&mut Ui, usize, &mut PlotOptions),
) {
    ui.label(label);
    for (k, s) in series.iter_mut().enumerate() {
        cell(ui, k, s);
    }
    ui.end_row();
}

/// Colour text field with a swatch, red when the text isn't a colour.
fn color_edit(ui: &mut Ui, enabled: bool, value: &mut String) {
    ui.horizontal(|ui: &mut Ui| {
        ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(value).desired_width(70.0),
        );
        match parse_color(value) {
            Some(c) => ui.colored_label(c, "■"),
            None => ui.colored_label(Color32::RED, "?"),
        };
    });
}

fn plot_grid(ui: &mut Ui, series: &mut [PlotOptions; SERIES_COUNT]) {
    egui::Grid::new("plot_options")
        .num_columns(SERIES_COUNT + 1)
        .spacing([16.0, 4.0])
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for k in 0..SERIES_COUNT {
                ui.strong(format!("Series {}", k + 1));
            }
            ui.end_row();

            series_row(ui, "Data column", series, |ui, _, s| {
                ui.add(egui::DragValue::new(&mut s.yindex).range(0..=9999));
            });
            series_row(ui, "Legend", series, |ui, _, s| {
                ui.add(egui::TextEdit::singleline(&mut s.legend).desired_width(90.0));
            });

            series_row(ui, "Line", series, |ui, _, s| {
                ui.checkbox(&mut s.line, "");
            });
            series_row(ui, "    style", series, |ui, k, s| {
                ui.add_enabled_ui(s.line, |ui: &mut Ui| {
                    egui::ComboBox::from_id_salt(("linestyle", k))
                        .selected_text(s.linestyle.label())
                        .show_ui(ui, |ui: &mut Ui| {
                            for style in LineStyle::ALL {
                                ui.selectable_value(&mut s.linestyle, style, style.label());
                            }
                        });
                });
            });
            series_row(ui, "    width", series, |ui, _, s| {
                ui.add_enabled(
                    s.line,
                    egui::DragValue::new(&mut s.linewidth).range(0.1..=20.0).speed(0.1),
                );
            });
            series_row(ui, "    custom colour", series, |ui, _, s| {
                ui.add_enabled(s.line, egui::Checkbox::without_text(&mut s.islinecolor));
            });
            series_row(ui, "        colour", series, |ui, _, s| {
                color_edit(ui, s.line && s.islinecolor, &mut s.linecolor);
            });

            series_row(ui, "Marker", series, |ui, _, s| {
                ui.checkbox(&mut s.marker, "");
            });
            series_row(ui, "    style", series, |ui, k, s| {
                ui.add_enabled_ui(s.marker, |ui: &mut Ui| {
                    egui::ComboBox::from_id_salt(("markerstyle", k))
                        .selected_text(s.markerstyle.label())
                        .show_ui(ui, |ui: &mut Ui| {
                            for style in MarkerStyle::ALL {
                                ui.selectable_value(&mut s.markerstyle, style, style.label());
                            }
                        });
                });
            });
            series_row(ui, "    size", series, |ui, _, s| {
                ui.add_enabled(
                    s.marker,
                    egui::DragValue::new(&mut s.markersize).range(1.0..=40.0).speed(0.2),
                );
            });
            series_row(ui, "    custom colour", series, |ui, _, s| {
                ui.add_enabled(s.marker, egui::Checkbox::without_text(&mut s.ismarkercolor));
            });
            series_row(ui, "        colour", series, |ui, _, s| {
                color_edit(ui, s.marker && s.ismarkercolor, &mut s.markercolor);
            });

            series_row(ui, "Text", series, |ui, _, s| {
                ui.checkbox(&mut s.text, "");
            });
            series_row(ui, "    string", series, |ui, _, s| {
                ui.add_enabled(
                    s.text,
                    egui::TextEdit::singleline(&mut s.textstr).desired_width(90.0),
                );
            });
            series_row(ui, "    position", series, |ui, _, s| {
                ui.label(RichText::new(s.text_coord_summary()).italics());
            });
            series_row(ui, "        x", series, |ui, _, s| {
                ui.add_enabled(s.text, egui::DragValue::new(&mut s.textcoordx).speed(0.1));
            });
            series_row(ui, "        y", series, |ui, _, s| {
                ui.add_enabled(s.text, egui::DragValue::new(&mut s.textcoordy).speed(0.1));
            });
            series_row(ui, "    size", series, |ui, _, s| {
                ui.add_enabled(
                    s.text,
                    egui::DragValue::new(&mut s.textsize).range(4.0..=72.0),
                );
            });
            series_row(ui, "    colour", series, |ui, _, s| {
                color_edit(ui, s.text, &mut s.textcolor);
            });
        });
}
