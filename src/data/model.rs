use anyhow::{bail, Result};

// ---------------------------------------------------------------------------
// DataTable – the loaded numeric matrix
// ---------------------------------------------------------------------------

/// A dense, row-major 2-D table of `f64` values.
///
/// Every row has exactly `columns` values; the constructor enforces it so the
/// accessors below can index without further checks.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    values: Vec<f64>,
    columns: usize,
}

impl DataTable {
    /// Build a table from a flat row-major buffer.
    pub fn from_flat(values: Vec<f64>, columns: usize) -> Result<Self> {
        if columns == 0 {
            bail!("column count must be at least 1");
        }
        if values.len() % columns != 0 {
            bail!(
                "cannot reshape {} values into rows of {columns} columns",
                values.len()
            );
        }
        Ok(DataTable { values, columns })
    }

    /// Build a table from parsed rows. All rows must share one width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        let mut values = Vec::with_capacity(rows.len() * columns);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != columns {
                bail!("row {i} has {} values, expected {columns}", row.len());
            }
            values.extend(row);
        }
        Self::from_flat(values, columns)
    }

    /// Build a table from equally long columns.
    pub fn from_columns(cols: &[Vec<f64>]) -> Result<Self> {
        let rows = cols.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = cols.iter().position(|c| c.len() != rows) {
            bail!("column {bad} has {} values, expected {rows}", cols[bad].len());
        }
        let mut values = Vec::with_capacity(rows * cols.len());
        for r in 0..rows {
            values.extend(cols.iter().map(|c| c[r]));
        }
        Self::from_flat(values, cols.len())
    }

    pub fn rows(&self) -> usize {
        self.values.len() / self.columns
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.columns)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if col >= self.columns {
            return None;
        }
        self.values.get(row * self.columns + col).copied()
    }

    /// One row as a slice.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.columns;
        &self.values[start..start + self.columns]
    }

    /// Copy out a whole column.
    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        if col >= self.columns {
            return None;
        }
        Some(
            self.values
                .iter()
                .skip(col)
                .step_by(self.columns)
                .copied()
                .collect(),
        )
    }
}
