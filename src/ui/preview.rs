use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::config::fmt_g;
use crate::data::model::DataTable;

const PREVIEW_ROWS: usize = 10;
const PREVIEW_COLUMNS: usize = 8;

/// First rows of the loaded table.
pub fn data_preview(ui: &mut Ui, table: &DataTable) {
    let rows = table.rows().min(PREVIEW_ROWS);
    let cols = table.columns().min(PREVIEW_COLUMNS);

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(24.0))
        .columns(Column::auto().at_least(48.0), cols)
        .header(18.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("#");
            });
            for c in 0..cols {
                header.col(|ui: &mut Ui| {
                    ui.strong(c.to_string());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows, |mut row| {
                let r = row.index();
                row.col(|ui: &mut Ui| {
                    ui.label(r.to_string());
                });
                for &v in &table.row(r)[..cols] {
                    row.col(|ui: &mut Ui| {
                        ui.monospace(fmt_g(v));
                    });
                }
            });
        });

    if table.columns() > cols {
        ui.weak(format!("… {} more columns", table.columns() - cols));
    }
}
