//! Tabular containers shared by every pipeline stage.
//!
//! [`RawTable`] is what the loader produces: headers plus rows of untouched
//! strings. [`Table`] is the typed, named-column snapshot handed to the
//! persistence sink.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;

// ── RawTable ──────────────────────────────────────────────────────────────────

/// A delimited source file as read from disk, before any cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Logical name of the source (`"potential"`, `"sales"`, `"summary"`).
    pub source: String,
    /// Trimmed header names, in file order.
    pub headers: Vec<String>,
    /// Data rows; every row has exactly `headers.len()` fields.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(source: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.into(),
            headers,
            rows,
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first header equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Field at (`row`, `col`), or `None` when it is out of range or empty.
    ///
    /// Empty fields are nulls, matching how the upstream exports encode
    /// missing values.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

// ── Cell / Column ─────────────────────────────────────────────────────────────

/// Storage type of a [`Table`] column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// SQL type affinity used when the column is materialised in a store.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Real)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Integer)
    }
}

/// One value of a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Cell::Real(v),
            _ => Cell::Null,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::from(Some(value))
    }
}

impl From<Option<i64>> for Cell {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Cell::Null, Cell::Integer)
    }
}

impl From<Option<u64>> for Cell {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Cell::Null, |v| {
            Cell::Integer(i64::try_from(v).unwrap_or(i64::MAX))
        })
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::from(Some(value))
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Cell::Null, |s| Cell::Text(s.to_string()))
    }
}

impl From<&Option<String>> for Cell {
    fn from(value: &Option<String>) -> Self {
        Cell::from(value.as_deref())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<Option<NaiveDateTime>> for Cell {
    fn from(value: Option<NaiveDateTime>) -> Self {
        value.map_or(Cell::Null, |dt| {
            Cell::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string())
        })
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// An ordered relational snapshot with typed columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table.
    ///
    /// Column names are made unique, compared case-insensitively: a blank
    /// name becomes `Unnamed: <position>` and a repeated one gets a `.1`,
    /// `.2`, ... suffix.
    pub fn new(mut columns: Vec<Column>) -> Self {
        let names = unique_column_names(columns.iter().map(|c| c.name.as_str()));
        for (column, name) in columns.iter_mut().zip(names) {
            column.name = name;
        }
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding it with nulls or truncating it to the column
    /// count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Build a table from a raw source, inferring one type per column.
    ///
    /// A column is `Integer` when every non-empty field parses as `i64`,
    /// `Real` when every non-empty field parses as a finite `f64`, and
    /// `Text` otherwise. Empty fields become [`Cell::Null`].
    pub fn from_raw(raw: &RawTable) -> Self {
        let kinds: Vec<ColumnType> = (0..raw.headers.len())
            .map(|col| infer_column_type(raw, col))
            .collect();

        let columns = raw
            .headers
            .iter()
            .zip(&kinds)
            .map(|(name, kind)| Column::new(name.clone(), *kind))
            .collect();

        let mut table = Table::new(columns);
        for row in 0..raw.len() {
            let cells = kinds
                .iter()
                .enumerate()
                .map(|(col, kind)| typed_cell(raw.cell(row, col), *kind))
                .collect();
            table.push_row(cells);
        }
        table
    }
}

/// Conversion of a pipeline output into a [`Table`] for persistence.
pub trait ToTable {
    fn to_table(&self) -> Table;
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn unique_column_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for (position, name) in names.enumerate() {
        let base = match name.trim() {
            "" => format!("Unnamed: {position}"),
            trimmed => trimmed.to_string(),
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while !seen.insert(candidate.to_lowercase()) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        out.push(candidate);
    }
    out
}

fn infer_column_type(raw: &RawTable, col: usize) -> ColumnType {
    let values: Vec<&str> = (0..raw.len())
        .filter_map(|row| raw.cell(row, col))
        .map(str::trim)
        .collect();

    if values.is_empty() {
        return ColumnType::Text;
    }
    if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        return ColumnType::Integer;
    }
    if values
        .iter()
        .all(|v| v.parse::<f64>().map(f64::is_finite).unwrap_or(false))
    {
        return ColumnType::Real;
    }
    ColumnType::Text
}

fn typed_cell(value: Option<&str>, kind: ColumnType) -> Cell {
    let Some(value) = value else {
        return Cell::Null;
    };
    match kind {
        ColumnType::Integer => value
            .trim()
            .parse::<i64>()
            .map_or(Cell::Null, Cell::Integer),
        ColumnType::Real => value.trim().parse::<f64>().ok().into(),
        ColumnType::Text => Cell::Text(value.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
