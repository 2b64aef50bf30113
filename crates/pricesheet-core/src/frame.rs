//! Date-indexed table of fetched price columns.
//!
//! The provider answer is kept in a loose, column-oriented shape (optional
//! date index, flat or two-level headers, heterogeneous cells) so the
//! normalizer can reshape it step by step into a [`PriceSheet`](crate::PriceSheet).

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::{PriceRow, Symbol, TradingDate};

pub const DATE: &str = "Date";
pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const ADJ_CLOSE: &str = "Adj Close";
pub const VOLUME: &str = "Volume";

/// Column order of a fetched frame: price fields sorted by name, the way
/// grouped multi-symbol downloads lay them out.
pub const FETCHED_COLUMNS: [&str; 6] = [ADJ_CLOSE, CLOSE, HIGH, LOW, OPEN, VOLUME];

/// Errors raised when a frame does not have the expected shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("column '{column}' not found in price data")]
    MissingColumn { column: String },
    #[error("column '{column}' holds an unexpected value at row {row}")]
    UnexpectedCell { column: String, row: usize },
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Column header: a plain name, or a (field, symbol, ...) tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnHeader {
    Flat(String),
    Levels(Vec<String>),
}

impl ColumnHeader {
    pub fn flat(name: impl Into<String>) -> Self {
        Self::Flat(name.into())
    }

    pub fn levels<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Levels(levels.into_iter().map(Into::into).collect())
    }

    pub fn first_level(&self) -> &str {
        match self {
            Self::Flat(name) => name,
            Self::Levels(levels) => levels.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn is_multi_level(&self) -> bool {
        matches!(self, Self::Levels(levels) if levels.len() > 1)
    }

    /// Matches a flat name, or the first level of a grouped header.
    pub fn matches(&self, name: &str) -> bool {
        self.first_level() == name
    }
}

impl Display for ColumnHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat(name) => f.write_str(name),
            Self::Levels(levels) => write!(f, "({})", levels.join(", ")),
        }
    }
}

/// Single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Date(TradingDate),
    Text(String),
    Number(f64),
    Integer(u64),
    Empty,
}

impl Cell {
    pub fn from_number(value: Option<f64>) -> Self {
        value.filter(|v| v.is_finite()).map_or(Self::Empty, Self::Number)
    }

    pub fn from_integer(value: Option<u64>) -> Self {
        value.map_or(Self::Empty, Self::Integer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: ColumnHeader,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(header: ColumnHeader, cells: Vec<Cell>) -> Self {
        Self { header, cells }
    }
}

/// Fetched price table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFrame {
    index_name: String,
    index: Option<Vec<TradingDate>>,
    columns: Vec<Column>,
}

impl PriceFrame {
    /// Frame with a date index and no columns yet.
    pub fn with_index(index_name: impl Into<String>, index: Vec<TradingDate>) -> Self {
        Self {
            index_name: index_name.into(),
            index: Some(index),
            columns: Vec::new(),
        }
    }

    /// Date-indexed frame in the provider layout. With `grouped` set, headers
    /// are `(field, symbol)` pairs as produced by a grouped download.
    pub fn from_rows(symbol: &Symbol, rows: &[PriceRow], grouped: bool) -> Self {
        let index = rows.iter().map(|row| row.date).collect();
        let mut frame = Self::with_index(DATE, index);

        for name in FETCHED_COLUMNS {
            let header = if grouped {
                ColumnHeader::levels([name, symbol.as_str()])
            } else {
                ColumnHeader::flat(name)
            };
            let cells = rows
                .iter()
                .map(|row| match name {
                    ADJ_CLOSE => Cell::from_number(row.adj_close),
                    CLOSE => Cell::from_number(row.close),
                    HIGH => Cell::from_number(row.high),
                    LOW => Cell::from_number(row.low),
                    OPEN => Cell::from_number(row.open),
                    _ => Cell::from_integer(row.volume),
                })
                .collect();
            frame.columns.push(Column::new(header, cells));
        }

        frame
    }

    pub fn push_column(&mut self, column: Column) -> Result<(), ShapeError> {
        let expected = self.len();
        let has_rows = self.index.is_some() || !self.columns.is_empty();
        if has_rows && column.cells.len() != expected {
            return Err(ShapeError::LengthMismatch {
                column: column.header.to_string(),
                expected,
                actual: column.cells.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn len(&self) -> usize {
        match (&self.index, self.columns.first()) {
            (Some(index), _) => index.len(),
            (None, Some(column)) => column.cells.len(),
            (None, None) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn headers(&self) -> Vec<&ColumnHeader> {
        self.columns.iter().map(|column| &column.header).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.header.matches(name))
    }

    pub fn has_multi_level_headers(&self) -> bool {
        self.columns.iter().any(|column| column.header.is_multi_level())
    }

    /// Move the date index into a leading flat column named after the index.
    pub fn reset_index(&mut self) {
        if let Some(index) = self.index.take() {
            let cells = index.into_iter().map(Cell::Date).collect();
            let header = ColumnHeader::flat(self.index_name.clone());
            self.columns.insert(0, Column::new(header, cells));
        }
    }

    /// Replace every header with its first level.
    pub fn flatten_headers(&mut self) {
        for column in &mut self.columns {
            if let ColumnHeader::Levels(_) = column.header {
                column.header = ColumnHeader::flat(column.header.first_level());
            }
        }
    }

    /// Remove every column called `name`; returns whether one was present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let before = self.columns.len();
        self.columns.retain(|column| !column.header.matches(name));
        self.columns.len() != before
    }

    /// Keep exactly `names`, in that order. The first column matching each
    /// name wins.
    pub fn select(&self, names: &[&str]) -> Result<Self, ShapeError> {
        let columns = names
            .iter()
            .map(|name| {
                self.column(name)
                    .cloned()
                    .ok_or_else(|| ShapeError::MissingColumn {
                        column: (*name).to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            index_name: self.index_name.clone(),
            index: self.index.clone(),
            columns,
        })
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}
