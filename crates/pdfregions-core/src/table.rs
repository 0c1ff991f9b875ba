//! Plan table: the fixed-schema CSV every capture session and batch run
//! appends to, plus the flat per-rectangle capture CSV.
//!
//! The plan table always has exactly the columns in [`PLAN_COLUMNS`], in that
//! order. Accumulation is a pure append: existing rows first, new rows after,
//! no deduplication.

use std::io::Write;
use std::path::Path;

use crate::capture::CaptureRow;
use crate::error::TableError;
use crate::persist::write_atomic;

/// Document identity column.
pub const DOCUMENT_COLUMN: &str = "nombre_plan";

/// Inpatient cost tiers (high, medium, low) then their outpatient counterparts.
pub const FIELD_COLUMNS: [&str; 6] = [
    "alto",
    "medio",
    "bajo",
    "alto_ambu",
    "medio_ambu",
    "bajo_ambu",
];

/// Full plan table schema, in output order.
pub const PLAN_COLUMNS: [&str; 7] = [
    DOCUMENT_COLUMN,
    FIELD_COLUMNS[0],
    FIELD_COLUMNS[1],
    FIELD_COLUMNS[2],
    FIELD_COLUMNS[3],
    FIELD_COLUMNS[4],
    FIELD_COLUMNS[5],
];

/// Header of the flat capture CSV.
pub const CAPTURE_COLUMNS: [&str; 6] = ["etiqueta", "texto", "x0", "y0", "x1", "y1"];

/// Text extracted from one document for every label of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    /// File stem of the source document.
    pub document_id: String,
    /// `(label, text)` pairs in template order.
    pub fields: Vec<(String, String)>,
}

impl ExtractedRecord {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, t)| t.as_str())
    }
}

/// One row of the plan table. Every column is always present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanRow {
    values: [String; 7],
}

impl PlanRow {
    /// A row for `document_id` with every field column empty.
    pub fn new(document_id: impl Into<String>) -> Self {
        let mut row = Self::default();
        row.values[0] = document_id.into();
        row
    }

    /// Build a row from arbitrary `(column, value)` pairs.
    ///
    /// Pairs naming a column outside [`PLAN_COLUMNS`] are ignored; a column
    /// named twice keeps the last value; columns never named stay empty.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut row = Self::default();
        for (column, value) in pairs {
            row.set(column.as_ref(), value);
        }
        row
    }

    /// Project an extracted record onto the plan schema.
    ///
    /// Labels that are not plan field columns are dropped.
    pub fn from_record(record: &ExtractedRecord) -> Self {
        let mut row = Self::new(record.document_id.clone());
        for (label, text) in &record.fields {
            if FIELD_COLUMNS.contains(&label.as_str()) {
                row.set(label, text.clone());
            }
        }
        row
    }

    /// Build the session row from capture rows; the last row carrying a
    /// field column's label provides that column's text.
    pub fn from_capture(document_id: impl Into<String>, rows: &[CaptureRow]) -> Self {
        let mut row = Self::new(document_id);
        for capture in rows {
            if FIELD_COLUMNS.contains(&capture.label.as_str()) {
                row.set(&capture.label, capture.text.clone());
            }
        }
        row
    }

    /// Set a column by name. Returns `false` for an unknown column.
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> bool {
        match column_index(column) {
            Some(i) => {
                self.values[i] = value.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        column_index(column).map(|i| self.values[i].as_str())
    }

    pub fn document_id(&self) -> &str {
        &self.values[0]
    }

    /// Values in [`PLAN_COLUMNS`] order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

fn column_index(column: &str) -> Option<usize> {
    PLAN_COLUMNS.iter().position(|c| *c == column)
}

/// Ordered plan rows sharing the fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanTable {
    rows: Vec<PlanRow>,
}

impl PlanTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[PlanRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: PlanRow) {
        self.rows.push(row);
    }

    /// Parse a plan table from CSV.
    ///
    /// Columns are matched by header name, so a table written with a different
    /// column order (or missing columns) is re-aligned to the fixed schema;
    /// unknown columns are dropped. An empty input yields an empty table.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let positions: Vec<Option<usize>> = PLAN_COLUMNS
            .iter()
            .map(|col| headers.iter().position(|h| h.trim() == *col))
            .collect();

        let mut table = Self::new();
        for record in csv_reader.records() {
            let record = record?;
            let mut row = PlanRow::default();
            for (slot, pos) in row.values.iter_mut().zip(&positions) {
                if let Some(value) = pos.and_then(|p| record.get(p)) {
                    *slot = value.to_string();
                }
            }
            table.push(row);
        }
        Ok(table)
    }

    /// Read the table at `path`, or `None` if no file exists there yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, TableError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file).map(Some)
    }

    /// Serialize with a header row, columns in [`PLAN_COLUMNS`] order.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(PLAN_COLUMNS)?;
        for row in &self.rows {
            csv_writer.write_record(row.values())?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Replace the file at `path` with this table in one atomic step.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        write_atomic(path.as_ref(), |w| w.write_all(&bytes))?;
        Ok(())
    }
}

/// Append `new_rows` after the rows of `existing` (if any).
///
/// No deduplication or key-based upsert: running twice over the same
/// document yields two identical rows.
pub fn merge<I>(existing: Option<PlanTable>, new_rows: I) -> PlanTable
where
    I: IntoIterator<Item = PlanRow>,
{
    let mut table = existing.unwrap_or_default();
    table.rows.extend(new_rows);
    table
}

/// Read the table at `path`, append `new_rows`, and write it back in full.
///
/// Returns the merged table.
pub fn accumulate<I>(path: impl AsRef<Path>, new_rows: I) -> Result<PlanTable, TableError>
where
    I: IntoIterator<Item = PlanRow>,
{
    let path = path.as_ref();
    let existing = PlanTable::load(path)?;
    let table = merge(existing, new_rows);
    table.save(path)?;
    Ok(table)
}

/// Write the flat per-rectangle capture CSV.
pub fn write_capture_csv<W: Write>(rows: &[CaptureRow], writer: W) -> Result<(), TableError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CAPTURE_COLUMNS)?;
    for row in rows {
        let coords = row.bbox.to_array().map(|v| format!("{v:?}"));
        csv_writer.write_record([
            row.label.as_str(),
            row.text.as_str(),
            coords[0].as_str(),
            coords[1].as_str(),
            coords[2].as_str(),
            coords[3].as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Atomically write the flat capture CSV to `path`.
pub fn save_capture_csv(rows: &[CaptureRow], path: impl AsRef<Path>) -> Result<(), TableError> {
    let mut bytes = Vec::new();
    write_capture_csv(rows, &mut bytes)?;
    write_atomic(path.as_ref(), |w| w.write_all(&bytes))?;
    Ok(())
}

/// Render rows as a plain-text grid with aligned columns, for console previews.
pub fn render_grid<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.as_ref().chars().count());
            }
        }
    }

    let mut out = String::new();
    push_grid_line(&mut out, &widths, headers.iter().copied());
    for row in rows {
        push_grid_line(&mut out, &widths, row.iter().map(|c| c.as_ref()));
    }
    out
}

fn push_grid_line<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

impl std::fmt::Display for PlanTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<Vec<&str>> = self
            .rows
            .iter()
            .map(|r| r.values().iter().map(String::as_str).collect())
            .collect();
        f.write_str(&render_grid(&PLAN_COLUMNS, &rows))
    }
}
