//! Typed tabular input and the canonical time-indexed table.
//!
//! Sources arrive as a [`SourceTable`]: an ordered list of named, typed,
//! nullable columns plus a [`RowKey`] describing the row-key dimension.
//! Normalization turns a source into a [`CanonicalTable`], whose index is
//! unique, strictly increasing, and millisecond-aligned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TsIdxError;

/// Element type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit floating point.
    Float,
    /// 64-bit signed integer.
    Int,
    /// Boolean.
    Bool,
    /// UTF-8 text.
    Text,
    /// UTC datetime.
    Timestamp,
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Float => "float64",
            Self::Int => "int64",
            Self::Bool => "bool",
            Self::Text => "text",
            Self::Timestamp => "datetime",
        })
    }
}

/// Column storage. `None` cells are nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    /// Floating point cells.
    Float(Vec<Option<f64>>),
    /// Integer cells.
    Int(Vec<Option<i64>>),
    /// Boolean cells.
    Bool(Vec<Option<bool>>),
    /// Text cells.
    Text(Vec<Option<String>>),
    /// Datetime cells.
    Timestamp(Vec<Option<DateTime<Utc>>>),
}

macro_rules! each_variant {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ColumnData::Float($v) => $body,
            ColumnData::Int($v) => $body,
            ColumnData::Bool($v) => $body,
            ColumnData::Text($v) => $body,
            ColumnData::Timestamp($v) => $body,
        }
    };
}

macro_rules! map_variant {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ColumnData::Float($v) => ColumnData::Float($body),
            ColumnData::Int($v) => ColumnData::Int($body),
            ColumnData::Bool($v) => ColumnData::Bool($body),
            ColumnData::Text($v) => ColumnData::Text($body),
            ColumnData::Timestamp($v) => ColumnData::Timestamp($body),
        }
    };
}

impl ColumnData {
    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        each_variant!(self, v => v.len())
    }

    /// True when the column has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type.
    #[must_use]
    pub const fn dtype(&self) -> DataType {
        match self {
            Self::Float(_) => DataType::Float,
            Self::Int(_) => DataType::Int,
            Self::Bool(_) => DataType::Bool,
            Self::Text(_) => DataType::Text,
            Self::Timestamp(_) => DataType::Timestamp,
        }
    }

    /// A column of `len` nulls of the given type.
    #[must_use]
    pub fn nulls(dtype: DataType, len: usize) -> Self {
        match dtype {
            DataType::Float => Self::Float(vec![None; len]),
            DataType::Int => Self::Int(vec![None; len]),
            DataType::Bool => Self::Bool(vec![None; len]),
            DataType::Text => Self::Text(vec![None; len]),
            DataType::Timestamp => Self::Timestamp(vec![None; len]),
        }
    }

    /// True if the cell at `i` is null (or out of range).
    #[must_use]
    pub fn is_null(&self, i: usize) -> bool {
        each_variant!(self, v => v.get(i).is_none_or(Option::is_none))
    }

    /// Gather the cells at `indices`, in that order.
    #[must_use]
    pub fn take(&self, indices: &[usize]) -> Self {
        map_variant!(self, v => indices.iter().map(|&i| v[i].clone()).collect())
    }

    /// Drop the first `n` cells.
    #[must_use]
    pub fn skip(&self, n: usize) -> Self {
        map_variant!(self, v => v.iter().skip(n).cloned().collect())
    }

    /// Render a cell for display; nulls render as `NaN`/`NaT`/empty.
    #[must_use]
    pub fn display_cell(&self, i: usize) -> String {
        match self {
            Self::Float(v) => v
                .get(i)
                .copied()
                .flatten()
                .map_or_else(|| "NaN".to_string(), |x| x.to_string()),
            Self::Int(v) => v
                .get(i)
                .copied()
                .flatten()
                .map_or_else(String::new, |x| x.to_string()),
            Self::Bool(v) => v
                .get(i)
                .copied()
                .flatten()
                .map_or_else(String::new, |x| x.to_string()),
            Self::Text(v) => v.get(i).cloned().flatten().unwrap_or_default(),
            Self::Timestamp(v) => v
                .get(i)
                .copied()
                .flatten()
                .map_or_else(|| "NaT".to_string(), |t| format_ts(t)),
        }
    }

    /// Concatenate two columns. Mismatched types are unified as text.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => Self::Float([a.as_slice(), b].concat()),
            (Self::Int(a), Self::Int(b)) => Self::Int([a.as_slice(), b].concat()),
            (Self::Bool(a), Self::Bool(b)) => Self::Bool([a.as_slice(), b].concat()),
            (Self::Text(a), Self::Text(b)) => Self::Text([a.as_slice(), b].concat()),
            (Self::Timestamp(a), Self::Timestamp(b)) => {
                Self::Timestamp([a.as_slice(), b].concat())
            }
            (a, b) => Self::Text(a.to_text().into_iter().chain(b.to_text()).collect()),
        }
    }

    fn to_text(&self) -> Vec<Option<String>> {
        (0..self.len())
            .map(|i| (!self.is_null(i)).then(|| self.display_cell(i)))
            .collect()
    }
}

/// Format a timestamp the way tables display it (millisecond precision).
#[must_use]
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column label.
    pub name: String,
    /// Cells.
    pub data: ColumnData,
}

impl Column {
    /// Create a column.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Float column from plain values.
    pub fn float(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            name,
            ColumnData::Float(values.into_iter().map(Some).collect()),
        )
    }

    /// Text column from string-like values; empty strings become nulls.
    pub fn text<S: AsRef<str>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            name,
            ColumnData::Text(
                values
                    .into_iter()
                    .map(|s| {
                        let s = s.as_ref().trim();
                        (!s.is_empty()).then(|| s.to_string())
                    })
                    .collect(),
            ),
        )
    }

    /// Cell count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element type.
    #[must_use]
    pub const fn dtype(&self) -> DataType {
        self.data.dtype()
    }
}

/// The row-key dimension of a source table.
///
/// The variant states up front whether the key is already temporal, so
/// column resolution never has to introspect cell types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowKey {
    /// Rows are keyed by position only.
    Ordinal,
    /// Rows are keyed by datetimes.
    Temporal {
        /// Key label, if any.
        name: Option<String>,
        /// Key values.
        values: Vec<Option<DateTime<Utc>>>,
    },
    /// Rows are keyed by a labeled, non-temporal dimension.
    Labeled {
        /// Key label.
        name: String,
        /// Key values.
        data: ColumnData,
    },
}

impl RowKey {
    /// Key label, if the key has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Ordinal => None,
            Self::Temporal { name, .. } => name.as_deref(),
            Self::Labeled { name, .. } => Some(name),
        }
    }

    fn len(&self) -> Option<usize> {
        match self {
            Self::Ordinal => None,
            Self::Temporal { values, .. } => Some(values.len()),
            Self::Labeled { data, .. } => Some(data.len()),
        }
    }

    fn skip(&self, n: usize) -> Self {
        match self {
            Self::Ordinal => Self::Ordinal,
            Self::Temporal { name, values } => Self::Temporal {
                name: name.clone(),
                values: values.iter().skip(n).copied().collect(),
            },
            Self::Labeled { name, data } => Self::Labeled {
                name: name.clone(),
                data: data.skip(n),
            },
        }
    }
}

/// Heterogeneous tabular input.
///
/// Invariant: the key (when not ordinal) and every column have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    key: RowKey,
    columns: Vec<Column>,
}

impl SourceTable {
    /// Build a source table, validating lengths and column-name uniqueness.
    ///
    /// # Errors
    /// Returns `TsIdxError::NotTabular` when columns disagree in length or a
    /// column name repeats.
    pub fn new(key: RowKey, columns: Vec<Column>) -> Result<Self, TsIdxError> {
        let expected = key
            .len()
            .or_else(|| columns.first().map(Column::len))
            .unwrap_or(0);
        for c in &columns {
            if c.len() != expected {
                return Err(TsIdxError::not_tabular(format!(
                    "column {:?} has {} rows, expected {expected}",
                    c.name,
                    c.len()
                )));
            }
        }
        for (i, c) in columns.iter().enumerate() {
            if columns[..i].iter().any(|p| p.name == c.name) {
                return Err(TsIdxError::not_tabular(format!(
                    "duplicate column name {:?}",
                    c.name
                )));
            }
        }
        Ok(Self { key, columns })
    }

    /// Positionally keyed table.
    ///
    /// # Errors
    /// See [`SourceTable::new`].
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TsIdxError> {
        Self::new(RowKey::Ordinal, columns)
    }

    /// Table built from string records (e.g. parsed CSV) under `header`.
    /// Empty cells become nulls.
    ///
    /// # Errors
    /// Returns `TsIdxError::NotTabular` for ragged records or a duplicate header.
    pub fn from_records<H, R, S>(header: &[H], rows: &[R]) -> Result<Self, TsIdxError>
    where
        H: AsRef<str>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let width = header.len();
        for (i, r) in rows.iter().enumerate() {
            if r.as_ref().len() != width {
                return Err(TsIdxError::not_tabular(format!(
                    "record {i} has {} fields, header has {width}",
                    r.as_ref().len()
                )));
            }
        }
        let columns = header
            .iter()
            .enumerate()
            .map(|(j, h)| Column::text(h.as_ref(), rows.iter().map(|r| r.as_ref()[j].as_ref())))
            .collect();
        Self::from_columns(columns)
    }

    /// Table keyed by datetimes with a single float column.
    pub fn from_pairs(
        timestamp_field: &str,
        value_field: &str,
        pairs: impl IntoIterator<Item = (DateTime<Utc>, f64)>,
    ) -> Self {
        let (ts, vals): (Vec<_>, Vec<_>) = pairs.into_iter().map(|(t, v)| (Some(t), Some(v))).unzip();
        Self {
            key: RowKey::Temporal {
                name: Some(timestamp_field.to_string()),
                values: ts,
            },
            columns: vec![Column::new(value_field, ColumnData::Float(vals))],
        }
    }

    /// Replace the row key with a datetime key.
    ///
    /// # Errors
    /// Returns `TsIdxError::NotTabular` when `values` does not match the row count.
    pub fn with_temporal_key(
        mut self,
        name: Option<String>,
        values: Vec<Option<DateTime<Utc>>>,
    ) -> Result<Self, TsIdxError> {
        if !self.columns.is_empty() && values.len() != self.columns[0].len() {
            return Err(TsIdxError::not_tabular(format!(
                "key has {} rows, columns have {}",
                values.len(),
                self.columns[0].len()
            )));
        }
        self.key = RowKey::Temporal { name, values };
        Ok(self)
    }

    /// Row-key dimension.
    #[must_use]
    pub const fn key(&self) -> &RowKey {
        &self.key
    }

    /// Columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column by exact name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.key
            .len()
            .or_else(|| self.columns.first().map(Column::len))
            .unwrap_or(0)
    }

    /// Copy of the table without its first `n` rows.
    #[must_use]
    pub fn skip_rows(&self, n: usize) -> Self {
        if n == 0 {
            return self.clone();
        }
        Self {
            key: self.key.skip(n),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.skip(n)))
                .collect(),
        }
    }

    pub(crate) fn into_parts(self) -> (RowKey, Vec<Column>) {
        (self.key, self.columns)
    }
}

/// A single cell value. Never tabular on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// Missing value.
    Null,
    /// Float.
    Float(f64),
    /// Integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
    /// Text.
    Text(String),
    /// Datetime.
    Timestamp(DateTime<Utc>),
}

/// Names the adapter may use when a source carries no labels of its own.
#[derive(Debug, Clone, Copy)]
pub struct FieldNames<'a> {
    /// Timestamp dimension name.
    pub timestamp: &'a str,
    /// Value dimension name.
    pub value: &'a str,
}

/// Adapter seam: anything that may be turned into a [`SourceTable`].
pub trait IntoSourceTable {
    /// Convert into a source table.
    ///
    /// # Errors
    /// Returns `TsIdxError::NotTabular` when the value has no tabular shape.
    fn into_source_table(self, fields: FieldNames<'_>) -> Result<SourceTable, TsIdxError>;
}

impl IntoSourceTable for SourceTable {
    fn into_source_table(self, _fields: FieldNames<'_>) -> Result<SourceTable, TsIdxError> {
        Ok(self)
    }
}

impl IntoSourceTable for &SourceTable {
    fn into_source_table(self, _fields: FieldNames<'_>) -> Result<SourceTable, TsIdxError> {
        Ok(self.clone())
    }
}

impl IntoSourceTable for Vec<(DateTime<Utc>, f64)> {
    fn into_source_table(self, fields: FieldNames<'_>) -> Result<SourceTable, TsIdxError> {
        Ok(SourceTable::from_pairs(fields.timestamp, fields.value, self))
    }
}

impl IntoSourceTable for Scalar {
    fn into_source_table(self, _fields: FieldNames<'_>) -> Result<SourceTable, TsIdxError> {
        Err(TsIdxError::not_tabular(format!(
            "a scalar ({self:?}) has no rows or columns"
        )))
    }
}

impl IntoSourceTable for CanonicalTable {
    fn into_source_table(self, _fields: FieldNames<'_>) -> Result<SourceTable, TsIdxError> {
        Ok(SourceTable {
            key: RowKey::Temporal {
                name: Some(self.index_name),
                values: self.index.into_iter().map(Some).collect(),
            },
            columns: self.columns,
        })
    }
}

impl IntoSourceTable for &CanonicalTable {
    fn into_source_table(self, fields: FieldNames<'_>) -> Result<SourceTable, TsIdxError> {
        self.clone().into_source_table(fields)
    }
}

/// The canonical table: a unique, ascending, millisecond-aligned timestamp
/// index plus one or more columns. The first column is the value column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTable {
    index_name: String,
    index: Vec<DateTime<Utc>>,
    columns: Vec<Column>,
}

impl CanonicalTable {
    /// Empty table with a float value column.
    pub fn empty(index_name: impl Into<String>, value_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            index: Vec::new(),
            columns: vec![Column::new(value_name, ColumnData::Float(Vec::new()))],
        }
    }

    /// Build a canonical table from parts.
    ///
    /// # Errors
    /// Returns `TsIdxError::InvalidArg` when the index is not strictly
    /// increasing or a column length differs from the index length.
    pub fn try_new(
        index_name: impl Into<String>,
        index: Vec<DateTime<Utc>>,
        columns: Vec<Column>,
    ) -> Result<Self, TsIdxError> {
        if index.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TsIdxError::InvalidArg(
                "index must be strictly increasing".into(),
            ));
        }
        if let Some(c) = columns.iter().find(|c| c.len() != index.len()) {
            return Err(TsIdxError::InvalidArg(format!(
                "column {:?} has {} rows, index has {}",
                c.name,
                c.len(),
                index.len()
            )));
        }
        Ok(Self {
            index_name: index_name.into(),
            index,
            columns,
        })
    }

    pub(crate) const fn from_parts_unchecked(
        index_name: String,
        index: Vec<DateTime<Utc>>,
        columns: Vec<Column>,
    ) -> Self {
        Self {
            index_name,
            index,
            columns,
        }
    }

    pub(crate) fn into_parts(self) -> (String, Vec<DateTime<Utc>>, Vec<Column>) {
        (self.index_name, self.index, self.columns)
    }

    /// Name of the timestamp key.
    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Timestamp key sequence.
    #[must_use]
    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    /// Columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column by exact name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The value column (first column).
    #[must_use]
    pub fn value_column(&self) -> Option<&Column> {
        self.columns.first()
    }

    /// Values of the first column as floats; nulls and non-float cells are NaN.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        match self.columns.first().map(|c| &c.data) {
            Some(ColumnData::Float(v)) => v.iter().map(|x| x.unwrap_or(f64::NAN)).collect(),
            Some(ColumnData::Int(v)) => v
                .iter()
                .map(|x| x.map_or(f64::NAN, |i| i as f64))
                .collect(),
            Some(other) => vec![f64::NAN; other.len()],
            None => vec![f64::NAN; self.index.len()],
        }
    }

    /// Column names with their types, key first.
    #[must_use]
    pub fn schema(&self) -> Vec<(String, DataType)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.dtype()))
            .collect()
    }

    /// Row count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Rows at `indices`, in index order. Repeated and out-of-range
    /// positions are ignored.
    #[must_use]
    pub fn take(&self, indices: &[usize]) -> Self {
        let mut rows: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.index.len())
            .collect();
        rows.sort_unstable();
        rows.dedup();
        self.gather(&rows)
    }

    /// Rows at `indices` in the given order. Callers keep the resulting
    /// index strictly increasing.
    pub(crate) fn gather(&self, indices: &[usize]) -> Self {
        Self {
            index_name: self.index_name.clone(),
            index: indices.iter().map(|&i| self.index[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.take(indices)))
                .collect(),
        }
    }

    /// Rows with `start <= ts <= end`; `None` is unbounded on that side.
    #[must_use]
    pub fn slice_by_time(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        let lo = start.map_or(0, |s| self.index.partition_point(|t| *t < s));
        let hi = end.map_or(self.index.len(), |e| self.index.partition_point(|t| *t <= e));
        let range: Vec<usize> = if lo < hi { (lo..hi).collect() } else { Vec::new() };
        self.gather(&range)
    }
}
