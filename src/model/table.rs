//! Table types.

use super::ImageData;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A table item: a grid of cells as recognized by the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableItem {
    /// Cells with their grid position
    pub cells: Vec<TableCell>,

    /// Number of rows in the grid
    pub num_rows: u32,

    /// Number of columns in the grid
    pub num_cols: u32,

    /// Number of leading rows that form the column header (0 = no header)
    #[serde(default = "default_header_rows")]
    pub header_rows: u32,

    /// Table caption
    #[serde(default)]
    pub caption: Option<String>,

    /// Rendered table image, when available
    #[serde(default)]
    pub image: Option<ImageData>,
}

fn default_header_rows() -> u32 {
    1
}

impl TableItem {
    /// Create an empty table with the given grid size and a single header row.
    pub fn new(num_rows: u32, num_cols: u32) -> Self {
        Self {
            cells: Vec::new(),
            num_rows,
            num_cols,
            header_rows: 1,
            caption: None,
            image: None,
        }
    }

    /// Build a table from rows of strings; the first row is the header.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(0, 0);
        for (r, row) in rows.into_iter().enumerate() {
            let mut cols = 0;
            for (c, text) in row.into_iter().enumerate() {
                table.cells.push(TableCell::new(r as u32, c as u32, text));
                cols = c as u32 + 1;
            }
            table.num_rows = r as u32 + 1;
            table.num_cols = table.num_cols.max(cols);
        }
        table
    }

    /// Set the number of header rows and return self.
    pub fn with_header_rows(mut self, header_rows: u32) -> Self {
        self.header_rows = header_rows;
        self
    }

    /// Add a cell to the table.
    pub fn add_cell(&mut self, cell: TableCell) {
        self.cells.push(cell);
    }

    /// Export the table as tabular data.
    ///
    /// Spanning cells repeat their text over every covered grid position.
    /// An empty grid gives an empty frame. Fails when a cell lies outside
    /// the declared grid or the grid exceeds [`MAX_TABLE_CELLS`].
    pub fn to_frame(&self) -> Result<TableFrame> {
        let rows = self.num_rows as usize;
        let cols = self.num_cols as usize;
        if rows.max(1).saturating_mul(cols.max(1)) > MAX_TABLE_CELLS {
            return Err(Error::TableExport(format!(
                "{}x{} grid exceeds {} cells",
                self.num_rows, self.num_cols, MAX_TABLE_CELLS
            )));
        }
        let mut grid = vec![vec![String::new(); cols]; rows];

        for cell in &self.cells {
            let (Some(row_end), Some(col_end)) = (
                cell.row.checked_add(cell.row_span.max(1)),
                cell.col.checked_add(cell.col_span.max(1)),
            ) else {
                return Err(Error::TableExport(format!(
                    "cell at ({}, {}) has an overflowing span",
                    cell.row, cell.col
                )));
            };
            if row_end > self.num_rows || col_end > self.num_cols {
                return Err(Error::TableExport(format!(
                    "cell at ({}, {}) exceeds {}x{} grid",
                    cell.row, cell.col, self.num_rows, self.num_cols
                )));
            }
            for r in cell.row..row_end {
                for c in cell.col..col_end {
                    grid[r as usize][c as usize] = cell.text.clone();
                }
            }
        }

        let header_rows = (self.header_rows as usize).min(rows);
        let body = grid.split_off(header_rows);
        let columns = if header_rows == 0 {
            (0..cols).map(|c| c.to_string()).collect()
        } else {
            (0..cols)
                .map(|c| {
                    grid.iter()
                        .map(|row| row[c].as_str())
                        .collect::<Vec<_>>()
                        .join(".")
                })
                .collect()
        };

        Ok(TableFrame {
            columns,
            rows: body,
        })
    }
}

/// Largest grid, in cells, that [`TableItem::to_frame`] will materialize.
pub const MAX_TABLE_CELLS: usize = 1_000_000;

/// A cell positioned in a table grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    /// Row index (0-based)
    pub row: u32,

    /// Column index (0-based)
    pub col: u32,

    /// Cell text
    pub text: String,

    /// Number of rows this cell spans
    #[serde(default = "default_span")]
    pub row_span: u32,

    /// Number of columns this cell spans
    #[serde(default = "default_span")]
    pub col_span: u32,
}

fn default_span() -> u32 {
    1
}

impl TableCell {
    /// Create a single-span cell.
    pub fn new(row: u32, col: u32, text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            text: text.into(),
            row_span: 1,
            col_span: 1,
        }
    }

    /// Set column span and return self.
    pub fn col_span(mut self, span: u32) -> Self {
        self.col_span = span;
        self
    }

    /// Set row span and return self.
    pub fn row_span(mut self, span: u32) -> Self {
        self.row_span = span;
        self
    }
}

/// Tabular data exported from a [`TableItem`]: named columns over body rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFrame {
    /// Column names, possibly repeated
    pub columns: Vec<String>,

    /// Body rows, each as wide as `columns`
    pub rows: Vec<Vec<String>>,
}

impl TableFrame {
    /// Check if the frame has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names with duplicates disambiguated by `_2`, `_3`, ... in encounter order.
    ///
    /// Suffixes skip any name already taken, so the result never repeats.
    pub fn unique_columns(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();
        self.columns
            .iter()
            .map(|name| {
                let count = counts.entry(name.as_str()).or_insert(0);
                *count += 1;
                let mut candidate = if *count == 1 {
                    name.clone()
                } else {
                    format!("{}_{}", name, count)
                };
                while taken.contains(&candidate) {
                    *count += 1;
                    candidate = format!("{}_{}", name, count);
                }
                taken.insert(candidate.clone());
                candidate
            })
            .collect()
    }

    /// Column name to ordered cell values, using disambiguated column names.
    pub fn to_column_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.unique_columns()
            .into_iter()
            .enumerate()
            .map(|(c, name)| {
                let values = self
                    .rows
                    .iter()
                    .map(|row| serde_json::Value::String(row[c].clone()))
                    .collect();
                (name, serde_json::Value::Array(values))
            })
            .collect()
    }

    /// Aligned text dump with a leading row index column.
    pub fn to_text(&self) -> String {
        if self.columns.is_empty() || self.rows.is_empty() {
            return format!(
                "Empty table\nColumns: [{}]\nIndex: []",
                self.columns.join(", ")
            );
        }

        let index: Vec<String> = (0..self.rows.len()).map(|i| i.to_string()).collect();
        let index_width = index.iter().map(|i| width(i)).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(c, name)| {
                self.rows
                    .iter()
                    .map(|row| width(&row[c]))
                    .chain(std::iter::once(width(name)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        let mut header = " ".repeat(index_width);
        for (name, w) in self.columns.iter().zip(&widths) {
            header.push_str("  ");
            header.push_str(&pad_left(name, *w));
        }
        lines.push(header);

        for (idx, row) in index.iter().zip(&self.rows) {
            let mut line = format!("{:<width$}", idx, width = index_width);
            for (value, w) in row.iter().zip(&widths) {
                line.push_str("  ");
                line.push_str(&pad_left(value, *w));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn pad_left(s: &str, w: usize) -> String {
    let mut out = " ".repeat(w.saturating_sub(width(s)));
    out.push_str(s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let table = TableItem::from_rows([["Name", "Age"], ["Alice", "30"], ["Bob", "25"]]);
        assert_eq!(table.num_rows, 3);
        assert_eq!(table.num_cols, 2);

        let frame = table.to_frame().unwrap();
        assert_eq!(frame.columns, vec!["Name", "Age"]);
        assert_eq!(frame.rows.len(), 2);
    }

    #[test]
    fn test_frame_without_header() {
        let table = TableItem::from_rows([["a", "b"]]).with_header_rows(0);
        let frame = table.to_frame().unwrap();
        assert_eq!(frame.columns, vec!["0", "1"]);
        assert_eq!(frame.rows, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_spanning_cell_fills_grid() {
        let mut table = TableItem::new(2, 2);
        table.add_cell(TableCell::new(0, 0, "Merged").col_span(2));
        table.add_cell(TableCell::new(1, 0, "x"));
        table.add_cell(TableCell::new(1, 1, "y"));

        let frame = table.to_frame().unwrap();
        assert_eq!(frame.columns, vec!["Merged", "Merged"]);
        assert_eq!(frame.unique_columns(), vec!["Merged", "Merged_2"]);
    }

    #[test]
    fn test_out_of_grid_cell_fails() {
        let mut table = TableItem::new(1, 1);
        table.add_cell(TableCell::new(0, 3, "stray"));
        assert!(matches!(table.to_frame(), Err(Error::TableExport(_))));
    }

    #[test]
    fn test_overflowing_cell_fails() {
        let mut table = TableItem::new(2, 2);
        table.add_cell(TableCell::new(u32::MAX, 0, "far"));
        table.add_cell(TableCell::new(0, 1, "wide").col_span(u32::MAX));
        assert!(matches!(table.to_frame(), Err(Error::TableExport(_))));

        let mut table = TableItem::new(2, 2);
        table.add_cell(TableCell::new(0, u32::MAX, "far"));
        assert!(matches!(table.to_frame(), Err(Error::TableExport(_))));
    }

    #[test]
    fn test_oversized_grid_fails() {
        let table = TableItem::new(u32::MAX, u32::MAX);
        assert!(matches!(table.to_frame(), Err(Error::TableExport(_))));
        let table = TableItem::new(0, u32::MAX);
        assert!(matches!(table.to_frame(), Err(Error::TableExport(_))));
    }

    #[test]
    fn test_unique_columns() {
        let frame = TableFrame {
            columns: vec!["A".into(), "A".into(), "B".into(), "A".into()],
            rows: Vec::new(),
        };
        assert_eq!(frame.unique_columns(), vec!["A", "A_2", "B", "A_3"]);
    }

    #[test]
    fn test_unique_columns_skip_taken_suffixes() {
        let frame = TableFrame {
            columns: vec!["A".into(), "A".into(), "A_2".into()],
            rows: vec![vec!["1".into(), "2".into(), "3".into()]],
        };
        assert_eq!(frame.unique_columns(), vec!["A", "A_2", "A_2_2"]);
        assert_eq!(frame.to_column_map().len(), 3);

        let frame = TableFrame {
            columns: vec!["A_2".into(), "A".into(), "A".into()],
            rows: Vec::new(),
        };
        assert_eq!(frame.unique_columns(), vec!["A_2", "A", "A_3"]);
    }

    #[test]
    fn test_column_map_keeps_order() {
        let table = TableItem::from_rows([["Z", "A", "Z"], ["1", "2", "3"]]);
        let map = table.to_frame().unwrap().to_column_map();
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["Z", "A", "Z_2"]);
        assert_eq!(map["Z_2"], serde_json::json!(["3"]));
    }

    #[test]
    fn test_to_text_alignment() {
        let table = TableItem::from_rows([["Name", "Age"], ["Alice", "30"], ["Bob", "5"]]);
        let text = table.to_frame().unwrap().to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "    Name  Age");
        assert_eq!(lines[1], "0  Alice   30");
        assert_eq!(lines[2], "1    Bob    5");
    }

    #[test]
    fn test_to_text_empty() {
        let frame = TableItem::new(0, 0).to_frame().unwrap();
        assert!(frame.to_text().starts_with("Empty table"));
    }
}
