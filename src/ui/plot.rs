use eframe::egui::{self, Align2, RichText, Ui};
use egui_plot::{Corner, Legend, Line, MarkerShape, Plot, PlotPoint, Points, Text};

use crate::config::{fmt_g, LegendLoc, LineStyle, MarkerStyle};
use crate::figure::{Figure, PlotItem};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Figure windows
// ---------------------------------------------------------------------------

/// Draw every open figure in its own window; windows closed by the user are
/// dropped from the state.
pub fn figure_windows(ctx: &egui::Context, state: &mut AppState) {
    let mut closed = Vec::new();

    for fig in &state.figures {
        let mut open = true;
        egui::Window::new(fig.name.as_str())
            .id(egui::Id::new(("figure", &fig.name)))
            .open(&mut open)
            .default_size(fig.size)
            .resizable(true)
            .show(ctx, |ui: &mut Ui| figure_plot(ui, fig));
        if !open {
            closed.push(fig.name.clone());
        }
    }

    if !closed.is_empty() {
        state.figures.retain(|f| !closed.contains(&f.name));
        for name in closed {
            log::debug!("figure {name} closed");
        }
    }
}

fn figure_plot(ui: &mut Ui, fig: &Figure) {
    if !fig.title.is_empty() {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(&fig.title).size(fig.fontsize).strong());
        });
    }

    let xlabel = match fig.x_offset {
        Some(offset) if fig.xlabel.is_empty() => format!("+{}", fmt_g(offset)),
        Some(offset) => format!("{}  (+{})", fig.xlabel, fmt_g(offset)),
        None => fig.xlabel.clone(),
    };

    let mut plot = Plot::new(("figure_plot", &fig.name))
        .x_axis_label(RichText::new(xlabel).size(fig.fontsize))
        .y_axis_label(RichText::new(&fig.ylabel).size(fig.fontsize))
        .show_grid(fig.grid)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if let Some(loc) = fig.legend {
        plot = plot.legend(legend_at(loc));
    }
    if let Some(offset) = fig.x_offset {
        plot = plot.x_axis_formatter(move |mark, _range| fmt_g(mark.value - offset));
    }

    plot.show(ui, |plot_ui| {
        for item in &fig.items {
            match item {
                PlotItem::Markers {
                    name,
                    points,
                    shape,
                    size,
                    color,
                } => {
                    plot_ui.points(
                        Points::new(points.clone())
                            .name(name.as_deref().unwrap_or(""))
                            .shape(marker_shape(*shape))
                            .radius(size / 2.0)
                            .filled(true)
                            .color(*color),
                    );
                }
                PlotItem::Line {
                    name,
                    points,
                    style,
                    width,
                    color,
                } => {
                    plot_ui.line(
                        Line::new(points.clone())
                            .name(name.as_deref().unwrap_or(""))
                            .style(line_style(*style))
                            .width(*width)
                            .color(*color),
                    );
                }
                PlotItem::Text {
                    position,
                    text,
                    size,
                    color,
                } => {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(position[0], position[1]),
                            RichText::new(text).size(*size),
                        )
                        .color(*color)
                        .anchor(Align2::LEFT_BOTTOM),
                    );
                }
            }
        }
    });
}

/// `best` has no counterpart in egui_plot; it keeps the default corner.
fn legend_at(loc: LegendLoc) -> Legend {
    let legend = Legend::default();
    match loc {
        LegendLoc::Best => legend,
        LegendLoc::UpperRight => legend.position(Corner::RightTop),
        LegendLoc::UpperLeft => legend.position(Corner::LeftTop),
        LegendLoc::LowerRight => legend.position(Corner::RightBottom),
        LegendLoc::LowerLeft => legend.position(Corner::LeftBottom),
    }
}

fn marker_shape(style: MarkerStyle) -> MarkerShape {
    match style {
        MarkerStyle::Circle => MarkerShape::Circle,
        MarkerStyle::Triangle => MarkerShape::Up,
        MarkerStyle::Square => MarkerShape::Square,
        // No pentagon in egui_plot.
        MarkerStyle::Pentagon => MarkerShape::Down,
        MarkerStyle::Star => MarkerShape::Asterisk,
        MarkerStyle::Cross => MarkerShape::Cross,
        MarkerStyle::Plus => MarkerShape::Plus,
        MarkerStyle::Diamond => MarkerShape::Diamond,
    }
}

fn line_style(style: LineStyle) -> egui_plot::LineStyle {
    match style {
        LineStyle::Solid => egui_plot::LineStyle::Solid,
        LineStyle::Dashed => egui_plot::LineStyle::dashed_loose(),
        LineStyle::DashDot => egui_plot::LineStyle::dashed_dense(),
        LineStyle::Dotted => egui_plot::LineStyle::dotted_dense(),
    }
}
