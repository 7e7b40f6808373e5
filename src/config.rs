use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Number of overlaid series a figure can carry.
pub const SERIES_COUNT: usize = 3;

/// File name suggested when saving a configuration.
pub const CONFIG_FILE_NAME: &str = "tplots.yaml";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("expected {SERIES_COUNT} plot series, found {0}")]
    SeriesCount(usize),
    #[error("unknown file type index {0}")]
    FileType(u8),
    #[error("unknown delimiter index {0}")]
    Delimiter(u8),
    #[error("unsupported figure size [{0}, {1}]")]
    FigSize(f32, f32),
    #[error("plot series {0}: {1}")]
    Series(usize, String),
}

// ---------------------------------------------------------------------------
// File options
// ---------------------------------------------------------------------------

/// Layout of the data file. Persisted as its index so saved documents stay
/// stable when labels change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FileType {
    /// Delimited text.
    #[default]
    Text,
    /// Raw little-endian `f64` dump.
    F64,
    /// Raw little-endian `f32` dump.
    F32,
    /// Raw little-endian `i64` dump.
    I64,
    /// Parquet file; every numeric column becomes a table column.
    Parquet,
}

impl FileType {
    pub const ALL: [FileType; 5] = [
        FileType::Text,
        FileType::F64,
        FileType::F32,
        FileType::I64,
        FileType::Parquet,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FileType::Text => "Text",
            FileType::F64 => "Binary f64",
            FileType::F32 => "Binary f32",
            FileType::I64 => "Binary i64",
            FileType::Parquet => "Parquet",
        }
    }

    /// Whether the column count must be supplied by the user.
    pub fn is_binary(self) -> bool {
        matches!(self, FileType::F64 | FileType::F32 | FileType::I64)
    }
}

impl TryFrom<u8> for FileType {
    type Error = ConfigError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        FileType::ALL
            .get(v as usize)
            .copied()
            .ok_or(ConfigError::FileType(v))
    }
}

impl From<FileType> for u8 {
    fn from(t: FileType) -> u8 {
        t as u8
    }
}

/// Field separator for text files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Delimiter {
    /// Runs of blanks or tabs.
    #[default]
    Whitespace,
    Comma,
    Semicolon,
}

impl Delimiter {
    pub const ALL: [Delimiter; 3] = [Delimiter::Whitespace, Delimiter::Comma, Delimiter::Semicolon];

    pub fn label(self) -> &'static str {
        match self {
            Delimiter::Whitespace => "Whitespace",
            Delimiter::Comma => "Comma ,",
            Delimiter::Semicolon => "Semicolon ;",
        }
    }
}

impl TryFrom<u8> for Delimiter {
    type Error = ConfigError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Delimiter::ALL
            .get(v as usize)
            .copied()
            .ok_or(ConfigError::Delimiter(v))
    }
}

impl From<Delimiter> for u8 {
    fn from(d: Delimiter) -> u8 {
        d as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    pub filename: String,
    pub filetype: FileType,
    pub delimiter: Delimiter,
    /// Column count of binary dumps; refreshed from the data after a load.
    pub columns: usize,
    /// Leading text rows skipped before parsing.
    pub header_rows: usize,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            filename: String::new(),
            filetype: FileType::Text,
            delimiter: Delimiter::Whitespace,
            columns: 1,
            header_rows: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Figure options
// ---------------------------------------------------------------------------

/// Figure window size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "[f32; 2]", into = "[f32; 2]")]
pub enum FigSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FigSize {
    pub const ALL: [FigSize; 3] = [FigSize::Small, FigSize::Medium, FigSize::Large];

    pub fn inches(self) -> [f32; 2] {
        match self {
            FigSize::Small => [8.0, 6.0],
            FigSize::Medium => [10.0, 7.5],
            FigSize::Large => [12.0, 9.0],
        }
    }
}

impl fmt::Display for FigSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [w, h] = self.inches();
        write!(f, "[{w}, {h}]")
    }
}

impl TryFrom<[f32; 2]> for FigSize {
    type Error = ConfigError;

    fn try_from(v: [f32; 2]) -> Result<Self, Self::Error> {
        FigSize::ALL
            .into_iter()
            .find(|s| s.inches() == v)
            .ok_or(ConfigError::FigSize(v[0], v[1]))
    }
}

impl From<FigSize> for [f32; 2] {
    fn from(s: FigSize) -> [f32; 2] {
        s.inches()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegendLoc {
    #[default]
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "upper right")]
    UpperRight,
    #[serde(rename = "upper left")]
    UpperLeft,
    #[serde(rename = "lower right")]
    LowerRight,
    #[serde(rename = "lower left")]
    LowerLeft,
}

impl LegendLoc {
    pub const ALL: [LegendLoc; 5] = [
        LegendLoc::Best,
        LegendLoc::UpperRight,
        LegendLoc::UpperLeft,
        LegendLoc::LowerRight,
        LegendLoc::LowerLeft,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LegendLoc::Best => "Automatic",
            LegendLoc::UpperRight => "Upper right",
            LegendLoc::UpperLeft => "Upper left",
            LegendLoc::LowerRight => "Lower right",
            LegendLoc::LowerLeft => "Lower left",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureOptions {
    /// Window name; showing a figure with an existing name replaces it.
    pub figure: String,
    pub figsize: FigSize,
    pub xaxiscol: usize,
    /// Use the row counter as the x axis instead of `xaxiscol`.
    pub xaxiscnt: bool,
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub fontsize: f32,
    pub grid: bool,
    pub legend: bool,
    pub legendall: bool,
    pub legendmarker: bool,
    pub legendloc: LegendLoc,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            figure: "Figure 1".to_string(),
            figsize: FigSize::Medium,
            xaxiscol: 0,
            xaxiscnt: false,
            title: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            fontsize: 12.0,
            grid: true,
            legend: false,
            legendall: true,
            legendmarker: false,
            legendloc: LegendLoc::Best,
        }
    }
}

impl FigureOptions {
    /// Select "legend covers markers and lines". Clears `legendmarker`.
    pub fn set_legend_all(&mut self, on: bool) {
        self.legendall = on;
        self.legendmarker = !on;
    }

    /// Select "legend covers markers only". Clears `legendall`.
    pub fn set_legend_marker(&mut self, on: bool) {
        self.legendmarker = on;
        self.legendall = !on;
    }

    /// Summary shown next to the x-axis item.
    pub fn x_axis_summary(&self) -> String {
        if self.xaxiscnt {
            "count index".to_string()
        } else {
            format!("data column  [{}]", self.xaxiscol)
        }
    }
}

// ---------------------------------------------------------------------------
// Plot (series) options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    #[serde(rename = "-")]
    Solid,
    #[serde(rename = "--")]
    Dashed,
    #[serde(rename = "-.")]
    DashDot,
    #[serde(rename = ":")]
    Dotted,
}

impl LineStyle {
    pub const ALL: [LineStyle; 4] = [
        LineStyle::Solid,
        LineStyle::Dashed,
        LineStyle::DashDot,
        LineStyle::Dotted,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LineStyle::Solid => "-  solid",
            LineStyle::Dashed => "-- dashed",
            LineStyle::DashDot => "-. dash-dot",
            LineStyle::Dotted => ":  dotted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerStyle {
    #[default]
    #[serde(rename = "o")]
    Circle,
    #[serde(rename = "^")]
    Triangle,
    #[serde(rename = "s")]
    Square,
    #[serde(rename = "p")]
    Pentagon,
    #[serde(rename = "*")]
    Star,
    #[serde(rename = "x")]
    Cross,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "d")]
    Diamond,
}

impl MarkerStyle {
    pub const ALL: [MarkerStyle; 8] = [
        MarkerStyle::Circle,
        MarkerStyle::Triangle,
        MarkerStyle::Square,
        MarkerStyle::Pentagon,
        MarkerStyle::Star,
        MarkerStyle::Cross,
        MarkerStyle::Plus,
        MarkerStyle::Diamond,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MarkerStyle::Circle => "o circle",
            MarkerStyle::Triangle => "^ triangle",
            MarkerStyle::Square => "s square",
            MarkerStyle::Pentagon => "p pentagon",
            MarkerStyle::Star => "* star",
            MarkerStyle::Cross => "x cross",
            MarkerStyle::Plus => "+ plus",
            MarkerStyle::Diamond => "d diamond",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    pub yindex: usize,
    pub legend: String,
    pub line: bool,
    pub linestyle: LineStyle,
    pub linewidth: f32,
    pub islinecolor: bool,
    pub linecolor: String,
    pub marker: bool,
    pub markerstyle: MarkerStyle,
    pub markersize: f32,
    pub ismarkercolor: bool,
    pub markercolor: String,
    pub text: bool,
    pub textstr: String,
    pub textcoordx: f64,
    pub textcoordy: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub textsize: f32,
    pub textcolor: String,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self::for_series(0)
    }
}

impl PlotOptions {
    /// Defaults for the `k`-th series: plots column `k + 1`, only the first
    /// series is switched on.
    pub fn for_series(k: usize) -> Self {
        Self {
            yindex: k + 1,
            legend: format!("y{}", k + 1),
            line: k == 0,
            linestyle: LineStyle::Solid,
            linewidth: 1.5,
            islinecolor: false,
            linecolor: "b".to_string(),
            marker: false,
            markerstyle: MarkerStyle::Circle,
            markersize: 6.0,
            ismarkercolor: false,
            markercolor: "r".to_string(),
            text: false,
            textstr: String::new(),
            textcoordx: 0.0,
            textcoordy: 0.0,
            textsize: 12.0,
            textcolor: "k".to_string(),
        }
    }

    /// Whether this series draws anything from the data table.
    pub fn uses_data(&self) -> bool {
        self.line || self.marker
    }

    /// Summary shown next to the text-position item, e.g. `[1.5, 2]`.
    pub fn text_coord_summary(&self) -> String {
        format!("[{}, {}]", fmt_g(self.textcoordx), fmt_g(self.textcoordy))
    }
}

/// `%g`-style formatting: six significant digits, no trailing zeros.
pub fn fmt_g(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    // The style follows the exponent after rounding to six digits.
    let s = format!("{v:.5e}");
    let (mantissa, e) = s.split_once('e').unwrap_or((&s, "0"));
    let exp: i32 = e.parse().unwrap_or(0);
    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.abs());
    }
    let decimals = (5 - exp).max(0) as usize;
    trim_zeros(&format!("{v:.decimals$}")).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f32),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ---------------------------------------------------------------------------
// Config document
// ---------------------------------------------------------------------------

/// The persisted document: figure, series and file options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    pub figure_options: FigureOptions,
    pub plot_options: [PlotOptions; SERIES_COUNT],
    pub file_options: FileOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            figure_options: FigureOptions::default(),
            plot_options: std::array::from_fn(PlotOptions::for_series),
            file_options: FileOptions::default(),
        }
    }
}

/// On-disk shape before validation. Each series is kept as a loose mapping
/// so missing keys fall back to that series' own defaults. Older documents
/// only stored the colour switches on the first series; later series
/// inherit them.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    figure_options: FigureOptions,
    #[serde(default = "default_raw_series")]
    plot_options: Vec<serde_json::Value>,
    #[serde(default)]
    file_options: FileOptions,
}

const INHERITED_SWITCHES: [&str; 2] = ["islinecolor", "ismarkercolor"];

fn default_raw_series() -> Vec<serde_json::Value> {
    vec![serde_json::Value::Object(serde_json::Map::new()); SERIES_COUNT]
}

/// Overlay the stored keys of series `k` on `PlotOptions::for_series(k)`.
fn resolve_series(
    k: usize,
    stored: &serde_json::Value,
    inherited: &serde_json::Map<String, serde_json::Value>,
) -> Result<PlotOptions, ConfigError> {
    let invalid = |reason: String| ConfigError::Series(k + 1, reason);
    let fields = stored
        .as_object()
        .ok_or_else(|| invalid("expected a mapping".into()))?;

    let mut merged = match serde_json::to_value(PlotOptions::for_series(k)) {
        Ok(serde_json::Value::Object(base)) => base,
        Ok(_) => return Err(invalid("defaults are not a mapping".into())),
        Err(e) => return Err(invalid(e.to_string())),
    };
    merged.extend(inherited.iter().map(|(key, v)| (key.clone(), v.clone())));
    merged.extend(fields.iter().map(|(key, v)| (key.clone(), v.clone())));

    serde_json::from_value(serde_json::Value::Object(merged)).map_err(|e| invalid(e.to_string()))
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let found = raw.plot_options.len();
        if found != SERIES_COUNT {
            return Err(ConfigError::SeriesCount(found));
        }

        let mut inherited = serde_json::Map::new();
        if let Some(first) = raw.plot_options.first().and_then(|s| s.as_object()) {
            for key in INHERITED_SWITCHES {
                if let Some(v) = first.get(key) {
                    inherited.insert(key.to_string(), v.clone());
                }
            }
        }

        let series = raw
            .plot_options
            .iter()
            .enumerate()
            .map(|(k, stored)| resolve_series(k, stored, &inherited))
            .collect::<Result<Vec<_>, _>>()?;
        let plot_options: [PlotOptions; SERIES_COUNT] = series
            .try_into()
            .map_err(|_| ConfigError::SeriesCount(found))?;

        Ok(Config {
            figure_options: raw.figure_options,
            plot_options,
            file_options: raw.file_options,
        })
    }
}

/// Serialization format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn format_for(path: &Path) -> Format {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => Format::Json,
        _ => Format::Yaml,
    }
}

impl Config {
    /// Load a configuration document. `.json` files are read as JSON,
    /// everything else as YAML.
    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        match format_for(path) {
            Format::Json => serde_json::from_str(&text).context("parsing JSON config"),
            Format::Yaml => serde_yaml::from_str(&text).context("parsing YAML config"),
        }
    }

    /// Write the document, format chosen by extension like [`Config::load`].
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = match format_for(path) {
            Format::Json => serde_json::to_string_pretty(self).context("encoding JSON config")?,
            Format::Yaml => serde_yaml::to_string(self).context("encoding YAML config")?,
        };
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }
}

/// Where the save dialog starts: next to the data file when there is one.
pub fn default_config_path(data_file: Option<&Path>) -> PathBuf {
    match data_file.and_then(Path::parent) {
        Some(dir) => dir.join(CONFIG_FILE_NAME),
        None => PathBuf::from(CONFIG_FILE_NAME),
    }
}
