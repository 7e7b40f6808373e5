use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

// The document format lives in the main binary; tests load the generated
// file through it.
#[cfg(test)]
#[allow(dead_code)]
#[path = "../config.rs"]
mod config;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const COLUMNS: [&str; 4] = ["time", "north", "east", "down"];

/// Position errors of a slowly drifting receiver, one row per second of a
/// GPS week so the time column exercises the x-axis offset.
fn generate_rows(n: usize, rng: &mut SimpleRng) -> Vec<[f64; 4]> {
    let t0 = 345_600.0;
    (0..n)
        .map(|i| {
            let t = t0 + i as f64;
            let phase = i as f64 / 120.0;
            [
                t,
                0.8 * phase.sin() + rng.gauss(0.0, 0.05),
                0.5 * (0.7 * phase).cos() + rng.gauss(0.0, 0.05),
                0.02 * i as f64 / 60.0 + rng.gauss(0.0, 0.1),
            ]
        })
        .collect()
}

fn write_text(path: &str, rows: &[[f64; 4]]) -> Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(out, "{}", COLUMNS.join("  "))?;
    for r in rows {
        writeln!(out, "{:.1}  {:.4}  {:.4}  {:.4}", r[0], r[1], r[2], r[3])?;
    }
    out.flush()?;
    Ok(())
}

fn write_binary(path: &str, rows: &[[f64; 4]]) -> Result<()> {
    let bytes: Vec<u8> = rows
        .iter()
        .flat_map(|r| r.iter().flat_map(|v| v.to_le_bytes()))
        .collect();
    std::fs::write(path, bytes)?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[[f64; 4]]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, false))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = (0..COLUMNS.len())
        .map(|c| Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r[c]))) as ArrayRef)
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;
    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

/// A configuration matching the text file, ready for File → Open config.
fn write_config(path: &str, data_file: &str) -> Result<()> {
    let series = |k: usize, name: &str, line: bool, marker: bool| {
        json!({
            "yindex": k,
            "legend": name,
            "line": line,
            "linestyle": "-",
            "linewidth": 1.5,
            "islinecolor": false,
            "linecolor": "b",
            "marker": marker,
            "markerstyle": "o",
            "markersize": 3.0,
            "ismarkercolor": false,
            "markercolor": "r",
            "text": false,
            "textstr": "",
            "textcoordx": 345600.0,
            "textcoordy": 0.0,
            "textsize": 12.0,
            "textcolor": "k",
        })
    };
    let doc = json!({
        "figure_options": {
            "figure": "position error",
            "figsize": [10.0, 7.5],
            "xaxiscol": 0,
            "xaxiscnt": false,
            "title": "Position error",
            "xlabel": "GPS time (s)",
            "ylabel": "Error (m)",
            "fontsize": 12.0,
            "grid": true,
            "legend": true,
            "legendall": true,
            "legendmarker": false,
            "legendloc": "upper right",
        },
        "plot_options": [
            series(1, "north", true, false),
            series(2, "east", true, false),
            series(3, "down", false, true),
        ],
        "file_options": {
            "filename": data_file,
            "filetype": 0,
            "delimiter": 0,
            "columns": COLUMNS.len(),
            "header_rows": 1,
        },
    });
    std::fs::write(path, serde_yaml::to_string(&doc)?)?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(3600, &mut rng);

    write_text("sample_data.txt", &rows).context("writing sample_data.txt")?;
    write_binary("sample_data.bin", &rows).context("writing sample_data.bin")?;
    write_parquet("sample_data.parquet", &rows).context("writing sample_data.parquet")?;

    let data_file = std::fs::canonicalize("sample_data.txt")?;
    write_config("tplots.yaml", &data_file.display().to_string())
        .context("writing tplots.yaml")?;

    println!(
        "Wrote {} rows × {} columns to sample_data.{{txt,bin,parquet}} and tplots.yaml",
        rows.len(),
        COLUMNS.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Delimiter, FigSize, FileType, LegendLoc};

    #[test]
    fn written_config_loads_as_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tplots.yaml");
        write_config(path.to_str().unwrap(), "/data/sample_data.txt").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.figure_options.figsize, FigSize::Medium);
        assert_eq!(cfg.figure_options.legendloc, LegendLoc::UpperRight);
        assert_eq!(cfg.file_options.filename, "/data/sample_data.txt");
        assert_eq!(cfg.file_options.filetype, FileType::Text);
        assert_eq!(cfg.file_options.delimiter, Delimiter::Whitespace);
        assert_eq!(cfg.file_options.columns, COLUMNS.len());
        assert_eq!(cfg.file_options.header_rows, 1);
        let legends: Vec<&str> = cfg.plot_options.iter().map(|s| s.legend.as_str()).collect();
        assert_eq!(legends, ["north", "east", "down"]);
        assert!(cfg.plot_options[2].marker && !cfg.plot_options[2].line);
    }

    #[test]
    fn text_sample_has_a_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        let rows = generate_rows(5, &mut SimpleRng::new(1));
        write_text(path.to_str().unwrap(), &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("time  north  east  down"));
        assert_eq!(lines.count(), 5);
    }
}
