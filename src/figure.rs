use eframe::egui::Color32;
use thiserror::Error;

use crate::color::{default_cycle, parse_color};
use crate::config::{Config, LegendLoc, LineStyle, MarkerStyle, PlotOptions};
use crate::data::model::DataTable;

/// Screen pixels per figure-size inch.
pub const DPI: f32 = 100.0;

/// x values above this are drawn relative to a rounded offset.
const X_OFFSET_THRESHOLD: f64 = 99999.0;

#[derive(Debug, Error, PartialEq)]
pub enum PlotError {
    #[error("data column {column} of series {series} is out of range ({columns} columns loaded)")]
    SeriesColumnOutOfRange {
        series: usize,
        column: usize,
        columns: usize,
    },
    #[error("x-axis column {column} is out of range ({columns} columns loaded)")]
    XColumnOutOfRange { column: usize, columns: usize },
    #[error("series {series}: '{value}' is not a valid {field} colour")]
    InvalidColor {
        series: usize,
        field: &'static str,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Figure – a ready-to-draw snapshot
// ---------------------------------------------------------------------------

/// One drawable element, in the order it is laid down.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotItem {
    Markers {
        name: Option<String>,
        points: Vec<[f64; 2]>,
        shape: MarkerStyle,
        size: f32,
        color: Color32,
    },
    Line {
        name: Option<String>,
        points: Vec<[f64; 2]>,
        style: LineStyle,
        width: f32,
        color: Color32,
    },
    Text {
        position: [f64; 2],
        text: String,
        size: f32,
        color: Color32,
    },
}

/// Everything a figure window needs, detached from the options and the data
/// it was built from so later edits don't change an open window.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub name: String,
    pub size: [f32; 2],
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub fontsize: f32,
    pub grid: bool,
    /// Legend placement, `None` when the legend is off.
    pub legend: Option<LegendLoc>,
    /// Tick labels on the x axis are shown relative to this value.
    pub x_offset: Option<f64>,
    pub items: Vec<PlotItem>,
}

/// Build the figure described by `config` from `data`.
///
/// Markers go down first, then lines, then text annotations. A marker set is
/// named in the legend whenever the legend is on; a line only when the legend
/// covers lines too (`legendall`).
pub fn build_figure(config: &Config, data: &DataTable) -> Result<Figure, PlotError> {
    let fig = &config.figure_options;
    let columns = data.columns();

    for (k, series) in config.plot_options.iter().enumerate() {
        if series.uses_data() && series.yindex >= columns {
            return Err(PlotError::SeriesColumnOutOfRange {
                series: k + 1,
                column: series.yindex,
                columns,
            });
        }
    }

    let x: Vec<f64> = if fig.xaxiscnt {
        (0..data.rows()).map(|i| i as f64).collect()
    } else {
        data.column(fig.xaxiscol)
            .ok_or(PlotError::XColumnOutOfRange {
                column: fig.xaxiscol,
                columns,
            })?
    };
    let x_offset = if fig.xaxiscnt { None } else { x_offset_for(&x) };

    let points_for = |series: &PlotOptions| -> Vec<[f64; 2]> {
        let y = data.column(series.yindex).unwrap_or_default();
        x.iter().zip(y).map(|(&xi, yi)| [xi, yi]).collect()
    };

    let mut items = Vec::new();

    for (k, series) in config.plot_options.iter().enumerate() {
        if !series.marker {
            continue;
        }
        let color = series_color(k, series.ismarkercolor, &series.markercolor, "marker")?;
        items.push(PlotItem::Markers {
            name: fig.legend.then(|| series.legend.clone()),
            points: points_for(series),
            shape: series.markerstyle,
            size: series.markersize,
            color,
        });
    }

    for (k, series) in config.plot_options.iter().enumerate() {
        if !series.line {
            continue;
        }
        let color = series_color(k, series.islinecolor, &series.linecolor, "line")?;
        items.push(PlotItem::Line {
            name: (fig.legend && fig.legendall).then(|| series.legend.clone()),
            points: points_for(series),
            style: series.linestyle,
            width: series.linewidth,
            color,
        });
    }

    for (k, series) in config.plot_options.iter().enumerate() {
        if !series.text {
            continue;
        }
        let color = parse_color(&series.textcolor).ok_or_else(|| PlotError::InvalidColor {
            series: k + 1,
            field: "text",
            value: series.textcolor.clone(),
        })?;
        items.push(PlotItem::Text {
            position: [series.textcoordx, series.textcoordy],
            text: series.textstr.clone(),
            size: series.textsize,
            color,
        });
    }

    let [w, h] = fig.figsize.inches();
    Ok(Figure {
        name: fig.figure.clone(),
        size: [w * DPI, h * DPI],
        title: fig.title.clone(),
        xlabel: fig.xlabel.clone(),
        ylabel: fig.ylabel.clone(),
        fontsize: fig.fontsize,
        grid: fig.grid,
        legend: fig.legend.then_some(fig.legendloc),
        x_offset,
        items,
    })
}

/// Large x values (e.g. GPS seconds of week) are ticked relative to the
/// first value rounded down to a thousand.
fn x_offset_for(x: &[f64]) -> Option<f64> {
    let first = *x.first()?;
    (first > X_OFFSET_THRESHOLD).then(|| (first / 1000.0).trunc() * 1000.0)
}

fn series_color(
    k: usize,
    custom: bool,
    spec: &str,
    field: &'static str,
) -> Result<Color32, PlotError> {
    if !custom {
        return Ok(default_cycle(k));
    }
    parse_color(spec).ok_or_else(|| PlotError::InvalidColor {
        series: k + 1,
        field,
        value: spec.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FigSize;

    fn table() -> DataTable {
        DataTable::from_rows(vec![
            vec![345600.5, 1.0, 10.0, 100.0],
            vec![345601.5, 2.0, 20.0, 200.0],
            vec![345602.5, 3.0, 30.0, 300.0],
        ])
        .unwrap()
    }

    #[test]
    fn default_config_draws_one_line() {
        let fig = build_figure(&Config::default(), &table()).unwrap();
        assert_eq!(fig.items.len(), 1);
        match &fig.items[0] {
            PlotItem::Line { points, color, name, .. } => {
                assert_eq!(points[1], [345601.5, 2.0]);
                assert_eq!(*color, default_cycle(0));
                assert_eq!(*name, None);
            }
            other => panic!("unexpected item {other:?}"),
        }
        assert_eq!(fig.size, [1000.0, 750.0]);
        assert_eq!(fig.legend, None);
    }

    #[test]
    fn large_x_values_get_an_offset() {
        let fig = build_figure(&Config::default(), &table()).unwrap();
        assert_eq!(fig.x_offset, Some(345000.0));

        let mut cfg = Config::default();
        cfg.figure_options.xaxiscol = 1;
        assert_eq!(build_figure(&cfg, &table()).unwrap().x_offset, None);
    }

    #[test]
    fn counter_axis_ignores_x_column() {
        let mut cfg = Config::default();
        cfg.figure_options.xaxiscnt = true;
        cfg.figure_options.xaxiscol = 99;
        let fig = build_figure(&cfg, &table()).unwrap();
        assert_eq!(fig.x_offset, None);
        match &fig.items[0] {
            PlotItem::Line { points, .. } => {
                assert_eq!(points, &vec![[0.0, 1.0], [1.0, 2.0], [2.0, 3.0]])
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn out_of_range_columns_are_rejected() {
        let mut cfg = Config::default();
        cfg.plot_options[2].marker = true;
        cfg.plot_options[2].yindex = 4;
        assert_eq!(
            build_figure(&cfg, &table()),
            Err(PlotError::SeriesColumnOutOfRange {
                series: 3,
                column: 4,
                columns: 4
            })
        );

        // Disabled series are not checked.
        cfg.plot_options[2].marker = false;
        assert!(build_figure(&cfg, &table()).is_ok());

        cfg.figure_options.xaxiscol = 7;
        assert_eq!(
            build_figure(&cfg, &table()),
            Err(PlotError::XColumnOutOfRange { column: 7, columns: 4 })
        );
    }

    #[test]
    fn draw_order_and_legend_naming() {
        let mut cfg = Config::default();
        cfg.figure_options.legend = true;
        cfg.figure_options.set_legend_marker(true);
        cfg.figure_options.figsize = FigSize::Small;
        cfg.plot_options[0].marker = true;
        cfg.plot_options[1].line = true;
        cfg.plot_options[1].text = true;
        cfg.plot_options[1].textstr = "note".into();

        let fig = build_figure(&cfg, &table()).unwrap();
        assert_eq!(fig.size, [800.0, 600.0]);
        assert_eq!(fig.legend, Some(LegendLoc::Best));
        let kinds: Vec<&str> = fig
            .items
            .iter()
            .map(|i| match i {
                PlotItem::Markers { .. } => "markers",
                PlotItem::Line { .. } => "line",
                PlotItem::Text { .. } => "text",
            })
            .collect();
        assert_eq!(kinds, ["markers", "line", "line", "text"]);

        match (&fig.items[0], &fig.items[1]) {
            (PlotItem::Markers { name: m, .. }, PlotItem::Line { name: l, .. }) => {
                assert_eq!(m.as_deref(), Some("y1"));
                assert_eq!(*l, None);
            }
            other => panic!("unexpected items {other:?}"),
        }

        cfg.figure_options.set_legend_all(true);
        let fig = build_figure(&cfg, &table()).unwrap();
        match &fig.items[2] {
            PlotItem::Line { name, .. } => assert_eq!(name.as_deref(), Some("y2")),
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn custom_colours_are_validated() {
        let mut cfg = Config::default();
        cfg.plot_options[0].islinecolor = true;
        cfg.plot_options[0].linecolor = "tab:green".into();
        match &build_figure(&cfg, &table()).unwrap().items[0] {
            PlotItem::Line { color, .. } => assert_eq!(*color, default_cycle(2)),
            other => panic!("unexpected item {other:?}"),
        }

        cfg.plot_options[0].linecolor = "blurple".into();
        assert_eq!(
            build_figure(&cfg, &table()),
            Err(PlotError::InvalidColor {
                series: 1,
                field: "line",
                value: "blurple".into()
            })
        );
    }
}
