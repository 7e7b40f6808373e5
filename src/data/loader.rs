use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::DataTable;
use crate::config::{Delimiter, FileOptions, FileType};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a numeric table from `path`.  Dispatch by the configured file type.
///
/// Supported layouts:
/// * text    – one row per line, fields split by `opts.delimiter`, the first
///   `opts.header_rows` lines skipped
/// * binary  – raw little-endian `f64` / `f32` / `i64` values, reshaped into
///   rows of `opts.columns`
/// * parquet – every numeric column of the file
pub fn load_file(path: &Path, opts: &FileOptions) -> Result<DataTable> {
    let table = match opts.filetype {
        FileType::Text => load_text(path, opts.delimiter, opts.header_rows)?,
        FileType::F64 => load_binary(path, opts.columns, 8, |b| {
            f64::from_le_bytes(b.try_into().unwrap_or([0; 8]))
        })?,
        FileType::F32 => load_binary(path, opts.columns, 4, |b| {
            f32::from_le_bytes(b.try_into().unwrap_or([0; 4])) as f64
        })?,
        FileType::I64 => load_binary(path, opts.columns, 8, |b| {
            i64::from_le_bytes(b.try_into().unwrap_or([0; 8])) as f64
        })?,
        FileType::Parquet => load_parquet(path)?,
    };

    if table.is_empty() {
        bail!("{} contains no data rows", path.display());
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Text loader
// ---------------------------------------------------------------------------

fn load_text(path: &Path, delimiter: Delimiter, header_rows: usize) -> Result<DataTable> {
    let text = std::fs::read_to_string(path).context("reading text file")?;
    // Byte offset of the first line after the header block.
    let body_start = text
        .split_inclusive('\n')
        .take(header_rows)
        .map(str::len)
        .sum::<usize>();
    let body = &text[body_start..];

    let rows = match delimiter {
        Delimiter::Whitespace => parse_whitespace(body, header_rows)?,
        Delimiter::Comma => parse_delimited(body, b',', header_rows)?,
        Delimiter::Semicolon => parse_delimited(body, b';', header_rows)?,
    };
    if rows.is_empty() {
        bail!("{} contains no data rows", path.display());
    }
    DataTable::from_rows(rows)
}

/// Blank- or tab-separated fields, any number of separators in a row.
fn parse_whitespace(body: &str, first_line: usize) -> Result<Vec<Vec<f64>>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (i, line) in body.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = first_line + i + 1;
        let row = line
            .split_whitespace()
            .enumerate()
            .map(|(j, tok)| parse_field(tok, line_no, j))
            .collect::<Result<Vec<f64>>>()?;
        check_width(&rows, &row, line_no)?;
        rows.push(row);
    }
    Ok(rows)
}

/// Single-character separators with surrounding blanks trimmed.
fn parse_delimited(body: &str, delimiter: u8, first_line: usize) -> Result<Vec<Vec<f64>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for result in reader.records() {
        let record = result.context("reading delimited record")?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line_no = first_line
            + record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(rows.len() + 1);
        let row = record
            .iter()
            .enumerate()
            .map(|(j, tok)| parse_field(tok, line_no, j))
            .collect::<Result<Vec<f64>>>()?;
        check_width(&rows, &row, line_no)?;
        rows.push(row);
    }
    Ok(rows)
}

fn parse_field(tok: &str, line: usize, field: usize) -> Result<f64> {
    tok.parse::<f64>()
        .with_context(|| format!("line {line}, field {field}: '{tok}' is not a number"))
}

fn check_width(rows: &[Vec<f64>], row: &[f64], line: usize) -> Result<()> {
    if let Some(first) = rows.first() {
        if first.len() != row.len() {
            bail!(
                "line {line} has {} fields, expected {}",
                row.len(),
                first.len()
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Binary loader
// ---------------------------------------------------------------------------

/// Decode a raw dump of fixed-size little-endian values.
fn load_binary(
    path: &Path,
    columns: usize,
    width: usize,
    decode: impl Fn(&[u8]) -> f64,
) -> Result<DataTable> {
    if columns == 0 {
        bail!("column count must be set for binary files");
    }
    let bytes = std::fs::read(path).context("reading binary file")?;
    if bytes.len() % width != 0 {
        bail!(
            "file size {} is not a multiple of the {width}-byte element size",
            bytes.len()
        );
    }
    let values: Vec<f64> = bytes.chunks_exact(width).map(decode).collect();
    DataTable::from_flat(values, columns)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load every numeric column of a Parquet file.
///
/// Float64, Float32, Int32 and Int64 columns are kept in schema order; other
/// columns are skipped. Nulls become `NaN`. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<DataTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Vec<f64>> = Vec::new();
    let mut names: Vec<String> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let numeric: Vec<usize> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| is_numeric(f.data_type()))
            .map(|(i, _)| i)
            .collect();

        if names.is_empty() {
            names = numeric
                .iter()
                .map(|&i| schema.field(i).name().clone())
                .collect();
            columns = vec![Vec::new(); numeric.len()];
        }

        for (slot, &col_idx) in numeric.iter().enumerate() {
            let values = extract_f64(batch.column(col_idx))
                .with_context(|| format!("column '{}'", schema.field(col_idx).name()))?;
            columns[slot].extend(values);
        }
    }

    if columns.is_empty() {
        bail!("parquet file has no numeric columns");
    }
    log::debug!("parquet columns: {names:?}");
    DataTable::from_columns(&columns)
}

fn is_numeric(dt: &DataType) -> bool {
    matches!(
        dt,
        DataType::Float64 | DataType::Float32 | DataType::Int32 | DataType::Int64
    )
}

/// Convert a numeric Arrow column to `f64`.
fn extract_f64(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)).collect())
    } else {
        bail!("unsupported column type {:?}", col.data_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f
    }

    fn text_opts(delimiter: Delimiter, header_rows: usize) -> FileOptions {
        FileOptions {
            delimiter,
            header_rows,
            ..FileOptions::default()
        }
    }

    #[test]
    fn whitespace_text_with_header() {
        let f = write_temp(b"time  north east\n\n0.0   1.0  2.0\n0.5\t3.0   4.0\n\n1.0 5.0 6.0\n");
        let t = load_file(f.path(), &text_opts(Delimiter::Whitespace, 1)).unwrap();
        assert_eq!(t.shape(), (3, 3));
        assert_eq!(t.row(1), &[0.5, 3.0, 4.0]);
    }

    #[test]
    fn comma_text_trims_blanks() {
        let f = write_temp(b"1 , 2,3\n4,  5 ,6\n");
        let t = load_file(f.path(), &text_opts(Delimiter::Comma, 0)).unwrap();
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.column(1), Some(vec![2.0, 5.0]));
    }

    #[test]
    fn delimited_text_skips_blank_lines() {
        let f = write_temp(b"1,2\n   \n3,4\n");
        let t = load_file(f.path(), &text_opts(Delimiter::Comma, 0)).unwrap();
        assert_eq!(t.shape(), (2, 2));
        assert_eq!(t.row(1), &[3.0, 4.0]);

        let f = write_temp(b"1;2\n\t\n3;4\n");
        let t = load_file(f.path(), &text_opts(Delimiter::Semicolon, 0)).unwrap();
        assert_eq!(t.shape(), (2, 2));
    }

    #[test]
    fn semicolon_text_skips_header_block() {
        let f = write_temp(b"# exported\na;b\n1.5;2.5\n-1e3;4\n");
        let t = load_file(f.path(), &text_opts(Delimiter::Semicolon, 2)).unwrap();
        assert_eq!(t.shape(), (2, 2));
        assert_eq!(t.get(1, 0), Some(-1000.0));
    }

    #[test]
    fn unskipped_header_is_a_content_error() {
        let f = write_temp(b"x y\n1 2\n");
        let err = load_file(f.path(), &text_opts(Delimiter::Whitespace, 0)).unwrap_err();
        assert!(format!("{err:#}").contains("line 1, field 0: 'x' is not a number"));
    }

    #[test]
    fn ragged_text_names_the_line() {
        let f = write_temp(b"skip\n1,2\n3\n");
        let err = load_file(f.path(), &text_opts(Delimiter::Comma, 1)).unwrap_err();
        assert!(format!("{err:#}").contains("line 3 has 1 fields, expected 2"));
    }

    #[test]
    fn empty_file_is_an_error() {
        let f = write_temp(b"header only\n");
        assert!(load_file(f.path(), &text_opts(Delimiter::Whitespace, 1)).is_err());
    }

    #[test]
    fn binary_dumps_reshape_by_column_count() {
        let values = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let f = write_temp(&bytes);
        let opts = FileOptions {
            filetype: FileType::F64,
            columns: 2,
            ..FileOptions::default()
        };
        let t = load_file(f.path(), &opts).unwrap();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.row(2), &[5.0, 6.0]);

        let opts = FileOptions { columns: 4, ..opts };
        assert!(load_file(f.path(), &opts).is_err());
    }

    #[test]
    fn binary_f32_and_i64() {
        let bytes: Vec<u8> = [0.5f32, 1.5, 2.5].iter().flat_map(|v| v.to_le_bytes()).collect();
        let f = write_temp(&bytes);
        let opts = FileOptions {
            filetype: FileType::F32,
            columns: 3,
            ..FileOptions::default()
        };
        assert_eq!(load_file(f.path(), &opts).unwrap().row(0), &[0.5, 1.5, 2.5]);

        let bytes: Vec<u8> = [-7i64, 9].iter().flat_map(|v| v.to_le_bytes()).collect();
        let f = write_temp(&bytes);
        let opts = FileOptions {
            filetype: FileType::I64,
            columns: 1,
            ..FileOptions::default()
        };
        assert_eq!(load_file(f.path(), &opts).unwrap().column(0), Some(vec![-7.0, 9.0]));
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let f = write_temp(&[0u8; 12]);
        let opts = FileOptions {
            filetype: FileType::F64,
            columns: 1,
            ..FileOptions::default()
        };
        let err = load_file(f.path(), &opts).unwrap_err();
        assert!(err.to_string().contains("not a multiple"));

        let opts = FileOptions { columns: 0, ..opts };
        assert!(load_file(f.path(), &opts).is_err());
    }

    #[test]
    fn parquet_numeric_columns() {
        use arrow::array::StringArray;
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("t", DataType::Float64, false),
            Field::new("label", DataType::Utf8, false),
            Field::new("n", DataType::Int32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![0.0, 1.0])),
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(Int32Array::from(vec![Some(3), None])),
            ],
        )
        .unwrap();

        let f = tempfile::NamedTempFile::new().unwrap();
        let mut writer = ArrowWriter::try_new(std::fs::File::create(f.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let opts = FileOptions {
            filetype: FileType::Parquet,
            ..FileOptions::default()
        };
        let t = load_file(f.path(), &opts).unwrap();
        assert_eq!(t.shape(), (2, 2));
        assert_eq!(t.get(0, 1), Some(3.0));
        assert!(t.get(1, 1).unwrap().is_nan());
    }
}
