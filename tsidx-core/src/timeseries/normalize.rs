//! Conversion of an arbitrary source table into canonical form.
//!
//! The pipeline resolves the timestamp and value dimensions, coerces their
//! types, drops incomplete rows, rounds timestamps to the millisecond,
//! removes duplicate timestamps (last occurrence wins) and sorts ascending.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::datetime::{DateParser, LenientDateParser, from_epoch_seconds, round_to_millis};
use crate::table::{CanonicalTable, Column, ColumnData, RowKey, SourceTable};
use crate::timeseries::util::push_warning;
use crate::{DEFAULT_SOURCE_TIME_FORMAT, DEFAULT_TIMESTAMP_FIELD, FieldRole, TsIdxError, Warning};

/// Parameters of [`normalize`].
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions<'a> {
    /// Name of the timestamp dimension.
    pub timestamp_field: &'a str,
    /// Name of the value dimension; the canonical value column is named this.
    pub value_field: &'a str,
    /// Strict format tried before lenient parsing.
    pub source_time_format: &'a str,
    /// Resolve the dimensions positionally when the names do not match.
    pub force_column_names: bool,
    /// Timezone for naive timestamps.
    pub timezone: Tz,
    /// Date parser.
    pub parser: &'a dyn DateParser,
}

impl<'a> NormalizeOptions<'a> {
    /// Options with the default timestamp field, format, UTC and the lenient parser.
    #[must_use]
    pub fn new(value_field: &'a str) -> Self {
        Self {
            timestamp_field: DEFAULT_TIMESTAMP_FIELD,
            value_field,
            source_time_format: DEFAULT_SOURCE_TIME_FORMAT,
            force_column_names: false,
            timezone: Tz::UTC,
            parser: &LenientDateParser,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TsSource {
    Key,
    Column(usize),
}

/// Normalize `source` into a canonical table.
///
/// The value column comes first, renamed to `value_field`; the remaining
/// source columns follow in source order. Numeric timestamps are Unix epoch
/// seconds.
///
/// # Errors
/// Returns `TsIdxError::MissingField` when the value or timestamp dimension
/// cannot be located.
pub fn normalize(
    source: SourceTable,
    opts: &NormalizeOptions<'_>,
    warnings: &mut Vec<Warning>,
) -> Result<CanonicalTable, TsIdxError> {
    let (key, mut columns) = source.into_parts();
    let key_matches = key.name() == Some(opts.timestamp_field);

    if key_matches {
        if let Some(pos) = columns.iter().position(|c| c.name == opts.timestamp_field) {
            #[cfg(feature = "tracing")]
            tracing::info!(
                field = opts.timestamp_field,
                "index and a column both match the timestamp name; dropping the column"
            );
            columns.remove(pos);
        }
    }

    let (ts_src, value_idx) = resolve(&key, &columns, opts);

    let available = || {
        key.name()
            .map(str::to_string)
            .into_iter()
            .chain(columns.iter().map(|c| c.name.clone()))
            .collect::<Vec<_>>()
    };
    let Some(value_idx) = value_idx else {
        return Err(TsIdxError::missing_field(
            FieldRole::Value,
            opts.value_field,
            available(),
        ));
    };
    let ts_src = match (ts_src, &key) {
        (Some(TsSource::Key), RowKey::Ordinal) | (None, _) => {
            return Err(TsIdxError::missing_field(
                FieldRole::Timestamp,
                opts.timestamp_field,
                available(),
            ));
        }
        (Some(src), _) => src,
    };

    let value_col = &columns[value_idx];
    let floats = coerce_values(value_col, warnings);

    let stamps: Vec<Option<DateTime<Utc>>> = match (ts_src, &key) {
        (TsSource::Key, RowKey::Temporal { values, .. }) => values.clone(),
        (TsSource::Key, RowKey::Labeled { name, data }) => {
            coerce_timestamps(name, data, opts, warnings)
        }
        (TsSource::Column(i), _) => {
            coerce_timestamps(&columns[i].name, &columns[i].data, opts, warnings)
        }
        (TsSource::Key, RowKey::Ordinal) => Vec::new(),
    };

    let mut rows: Vec<(DateTime<Utc>, usize)> = stamps
        .iter()
        .zip(&floats)
        .enumerate()
        .filter_map(|(i, (ts, v))| match (ts, v) {
            (Some(ts), Some(_)) => Some((round_to_millis(*ts), i)),
            _ => None,
        })
        .collect();
    rows.sort_by_key(|(ts, _)| *ts);

    let mut kept: Vec<(DateTime<Utc>, usize)> = Vec::with_capacity(rows.len());
    for (ts, i) in rows {
        match kept.last_mut() {
            Some(last) if last.0 == ts => *last = (ts, i),
            _ => kept.push((ts, i)),
        }
    }

    let positions: Vec<usize> = kept.iter().map(|(_, i)| *i).collect();
    let index: Vec<DateTime<Utc>> = kept.iter().map(|(ts, _)| *ts).collect();

    let mut out = Vec::with_capacity(columns.len());
    out.push(Column::new(
        opts.value_field,
        ColumnData::Float(positions.iter().map(|&i| floats[i]).collect()),
    ));
    for (j, c) in columns.iter().enumerate() {
        if j == value_idx || ts_src == TsSource::Column(j) {
            continue;
        }
        out.push(Column::new(c.name.clone(), c.data.take(&positions)));
    }

    Ok(CanonicalTable::from_parts_unchecked(
        opts.timestamp_field.to_string(),
        index,
        out,
    ))
}

fn resolve(
    key: &RowKey,
    columns: &[Column],
    opts: &NormalizeOptions<'_>,
) -> (Option<TsSource>, Option<usize>) {
    let mut ts_src = if key.name() == Some(opts.timestamp_field) {
        Some(TsSource::Key)
    } else {
        columns
            .iter()
            .position(|c| c.name == opts.timestamp_field)
            .map(TsSource::Column)
    };
    let mut value_idx = columns
        .iter()
        .enumerate()
        .position(|(i, c)| c.name == opts.value_field && ts_src != Some(TsSource::Column(i)));

    // Positional fallbacks never reuse a column claimed by the other dimension.
    if opts.force_column_names {
        if ts_src.is_none() {
            ts_src = if matches!(key, RowKey::Temporal { .. }) {
                Some(TsSource::Key)
            } else {
                (0..columns.len())
                    .find(|&i| value_idx != Some(i))
                    .map(TsSource::Column)
            };
        }
        if value_idx.is_none() {
            value_idx = (0..columns.len()).find(|&i| ts_src != Some(TsSource::Column(i)));
        }
    }
    (ts_src, value_idx)
}

fn coerce_values(column: &Column, warnings: &mut Vec<Warning>) -> Vec<Option<f64>> {
    let mut failed = 0usize;
    let out: Vec<Option<f64>> = match &column.data {
        ColumnData::Float(v) => v.iter().map(|x| x.filter(|f| !f.is_nan())).collect(),
        ColumnData::Int(v) => v.iter().map(|x| x.map(|i| i as f64)).collect(),
        ColumnData::Bool(v) => v
            .iter()
            .map(|x| x.map(|b| if b { 1.0 } else { 0.0 }))
            .collect(),
        ColumnData::Text(v) => v
            .iter()
            .map(|x| {
                let s = x.as_deref()?.trim();
                if s.is_empty() {
                    return None;
                }
                let parsed = s.parse::<f64>().ok().filter(|f| !f.is_nan());
                if parsed.is_none() && !s.eq_ignore_ascii_case("nan") {
                    failed += 1;
                }
                parsed
            })
            .collect(),
        ColumnData::Timestamp(v) => {
            failed = v.iter().filter(|x| x.is_some()).count();
            vec![None; v.len()]
        }
    };
    if failed > 0 {
        push_warning(
            warnings,
            Warning::ValueCoercion {
                column: column.name.clone(),
                failed,
            },
        );
    }
    out
}

/// Timestamps of one column. Text cells try the strict format, then the
/// lenient parser; a warning is recorded once if any cell missed the format.
fn coerce_timestamps(
    name: &str,
    data: &ColumnData,
    opts: &NormalizeOptions<'_>,
    warnings: &mut Vec<Warning>,
) -> Vec<Option<DateTime<Utc>>> {
    let (out, failed, warn) = match data {
        ColumnData::Timestamp(v) => (v.clone(), 0, false),
        ColumnData::Int(v) => {
            let out: Vec<_> = v
                .iter()
                .map(|x| x.and_then(|s| DateTime::from_timestamp(s, 0)))
                .collect();
            let failed = count_lost(v.iter().map(Option::is_some), &out);
            (out, failed, failed > 0)
        }
        ColumnData::Float(v) => {
            let out: Vec<_> = v.iter().map(|x| x.and_then(from_epoch_seconds)).collect();
            let failed = count_lost(v.iter().map(Option::is_some), &out);
            (out, failed, failed > 0)
        }
        ColumnData::Bool(v) => {
            let failed = v.iter().filter(|x| x.is_some()).count();
            (vec![None; v.len()], failed, failed > 0)
        }
        ColumnData::Text(v) => {
            let mut strict_missed = false;
            let out: Vec<Option<DateTime<Utc>>> = v
                .iter()
                .map(|x| {
                    let s = x.as_deref()?;
                    opts.parser
                        .parse_strict(s, opts.source_time_format, opts.timezone)
                        .or_else(|| {
                            strict_missed = true;
                            opts.parser.parse_lenient(s, opts.timezone)
                        })
                })
                .collect();
            let failed = count_lost(v.iter().map(Option::is_some), &out);
            (out, failed, strict_missed)
        }
    };
    if warn {
        push_warning(
            warnings,
            Warning::TimestampCoercion {
                column: name.to_string(),
                failed,
            },
        );
    }
    out
}

fn count_lost(present: impl Iterator<Item = bool>, parsed: &[Option<DateTime<Utc>>]) -> usize {
    present
        .zip(parsed)
        .filter(|(was, now)| *was && now.is_none())
        .count()
}
