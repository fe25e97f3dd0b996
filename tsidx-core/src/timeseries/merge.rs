use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::table::{CanonicalTable, Column, ColumnData, DataType};

/// Merge `incoming` into `existing`, keyed by timestamp.
///
/// - Columns are aligned by name: `existing`'s columns keep their order and
///   columns only present in `incoming` follow. Missing cells are null.
/// - When both tables hold a timestamp, the `incoming` row wins.
/// - The output is sorted ascending by timestamp.
///
/// An empty `existing` table contributes nothing, not even its columns.
#[must_use]
pub fn merge_last_wins(existing: &CanonicalTable, incoming: CanonicalTable) -> CanonicalTable {
    if existing.is_empty() {
        let (_, index, columns) = incoming.into_parts();
        return CanonicalTable::from_parts_unchecked(
            existing.index_name().to_string(),
            index,
            columns,
        );
    }
    if incoming.is_empty() {
        return existing.clone();
    }

    let n_old = existing.len();
    let n_new = incoming.len();

    let mut names: Vec<&str> = existing.columns().iter().map(|c| c.name.as_str()).collect();
    for c in incoming.columns() {
        if !names.contains(&c.name.as_str()) {
            names.push(&c.name);
        }
    }

    let columns: Vec<Column> = names
        .iter()
        .map(|&name| {
            let old = existing.column(name);
            let new = incoming.column(name);
            let dtype = old.or(new).map_or(DataType::Float, Column::dtype);
            let head = old.map_or_else(|| ColumnData::nulls(dtype, n_old), |c| c.data.clone());
            let tail = new.map_or_else(
                || ColumnData::nulls(dtype, n_new),
                |c| c.data.clone(),
            );
            Column::new(name, head.concat(&tail))
        })
        .collect();

    let index: Vec<DateTime<Utc>> = existing
        .index()
        .iter()
        .chain(incoming.index())
        .copied()
        .collect();

    let mut by_ts: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    for (row, ts) in index.iter().enumerate() {
        by_ts.insert(*ts, row);
    }
    let rows: Vec<usize> = by_ts.into_values().collect();

    CanonicalTable::from_parts_unchecked(existing.index_name().to_string(), index, columns)
        .gather(&rows)
}
