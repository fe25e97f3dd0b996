use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::datetime::localize;
use crate::table::{CanonicalTable, Column, ColumnData};
use crate::timeseries::util::push_warning;
use crate::{Stat, StatSet, TsIdxError, Warning};

/// Output naming for [`downsample`].
#[derive(Debug, Clone, Copy)]
pub struct StatNames<'a> {
    /// Container name; suffix of the `min_`/`max_`/`mean_`/`std_` columns.
    pub name: &'a str,
    /// Name of the `value` statistic column.
    pub value_field: &'a str,
}

/// Parse a statistics selector, defaulting to mean.
///
/// A blank or missing selector selects mean silently; a selector that names
/// nothing known selects mean and records [`Warning::UnrecognizedStats`].
pub fn stats_from_selector(selector: Option<&str>, warnings: &mut Vec<Warning>) -> StatSet {
    let Some(text) = selector.map(str::trim).filter(|s| !s.is_empty()) else {
        return StatSet::MEAN;
    };
    StatSet::parse_selector(text).unwrap_or_else(|| {
        push_warning(
            warnings,
            Warning::UnrecognizedStats {
                selector: text.to_string(),
            },
        );
        StatSet::MEAN
    })
}

fn period_millis(period: TimeDelta) -> Result<i64, TsIdxError> {
    let p = period.num_milliseconds();
    if p <= 0 {
        return Err(TsIdxError::resample(format!(
            "period must be at least 1ms, got {period}"
        )));
    }
    if period != TimeDelta::milliseconds(p) {
        return Err(TsIdxError::resample(format!(
            "period must be a whole number of milliseconds, got {period}"
        )));
    }
    Ok(p)
}

/// Grid of step `p` milliseconds through `origin`.
#[derive(Debug, Clone, Copy)]
struct Grid {
    origin: i64,
    p: i64,
}

impl Grid {
    /// Grid anchored at local midnight of the day holding `first`.
    fn starting_day(first: DateTime<Utc>, p: i64, tz: Tz) -> Self {
        let midnight = first
            .with_timezone(&tz)
            .date_naive()
            .and_time(NaiveTime::MIN);
        Self {
            origin: localize(midnight, tz).timestamp_millis(),
            p,
        }
    }

    const fn floor(self, ms: i64) -> i64 {
        ms - (ms - self.origin).rem_euclid(self.p)
    }

    fn ceil(self, ms: i64) -> Result<i64, TsIdxError> {
        let r = (ms - self.origin).rem_euclid(self.p);
        if r == 0 {
            Ok(ms)
        } else {
            (ms - r)
                .checked_add(self.p)
                .ok_or_else(|| TsIdxError::resample("timestamp overflow"))
        }
    }
}

fn grid_len(first: i64, last: i64, p: i64, max_rows: usize) -> Result<usize, TsIdxError> {
    if last < first {
        return Ok(0);
    }
    let steps = (last - first) / p;
    let n = usize::try_from(steps)
        .ok()
        .and_then(|s| s.checked_add(1))
        .ok_or_else(|| TsIdxError::resample("output row count overflows"))?;
    if n > max_rows {
        return Err(TsIdxError::resample(format!(
            "resample would produce {n} rows (limit {max_rows})"
        )));
    }
    Ok(n)
}

fn tick(ms: i64) -> Result<DateTime<Utc>, TsIdxError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| TsIdxError::resample(format!("timestamp {ms}ms is out of range")))
}

/// Upsample onto a grid of step `period` anchored at midnight.
///
/// The grid passes through midnight, in `tz`, of the day holding the first
/// timestamp. Ticks run from the first grid point at or after the first
/// timestamp to the last grid point at or before the last timestamp. Each
/// tick carries the first column's value from the most recent row at or
/// before it. The output has a single column named `value_name`.
///
/// # Errors
/// Returns `TsIdxError::Resample` for a period that is not a positive whole
/// number of milliseconds, for more than `max_rows` output rows, or when a
/// tick is out of range.
pub fn upsample(
    table: &CanonicalTable,
    period: TimeDelta,
    tz: Tz,
    value_name: &str,
    max_rows: usize,
) -> Result<CanonicalTable, TsIdxError> {
    let p = period_millis(period)?;
    let index = table.index();
    let values = table.values();
    let (Some(first), Some(last)) = (index.first(), index.last()) else {
        return Ok(CanonicalTable::empty(table.index_name(), value_name));
    };

    let grid = Grid::starting_day(*first, p, tz);
    let start = grid.ceil(first.timestamp_millis())?;
    let end = grid.floor(last.timestamp_millis());
    let n = grid_len(start, end, p, max_rows)?;

    let mut out_index = Vec::with_capacity(n);
    let mut out_values = Vec::with_capacity(n);
    let mut row = 0usize;
    for k in 0..n {
        let ms = start + (k as i64) * p;
        let ts = tick(ms)?;
        while row + 1 < index.len() && index[row + 1] <= ts {
            row += 1;
        }
        out_index.push(ts);
        out_values.push(Some(values[row]).filter(|v| !v.is_nan()));
    }

    Ok(CanonicalTable::from_parts_unchecked(
        table.index_name().to_string(),
        out_index,
        vec![Column::new(value_name, ColumnData::Float(out_values))],
    ))
}

#[derive(Debug, Clone, Copy)]
struct BucketAgg {
    last: f64,
    min: f64,
    max: f64,
    count: usize,
    mean: f64,
    m2: f64,
}

impl BucketAgg {
    const fn new(v: f64) -> Self {
        Self {
            last: v,
            min: v,
            max: v,
            count: 1,
            mean: v,
            m2: 0.0,
        }
    }

    fn push(&mut self, v: f64) {
        self.last = v;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        self.count += 1;
        let delta = v - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (v - self.mean);
    }

    fn stat(&self, s: Stat) -> Option<f64> {
        match s {
            Stat::Value => Some(self.last),
            Stat::Min => Some(self.min),
            Stat::Max => Some(self.max),
            Stat::Mean => Some(self.mean),
            Stat::Std => (self.count > 1).then(|| (self.m2 / (self.count - 1) as f64).sqrt()),
        }
    }
}

/// Downsample onto right-closed, right-labeled buckets anchored at midnight.
///
/// Bucket edges pass through midnight, in `tz`, of the day holding the first
/// timestamp. A row at `t` belongs to the bucket labeled with the first edge
/// at or after `t`. Every label from the first row's to the last row's is
/// emitted; empty buckets hold nulls, as does the standard deviation of a
/// single-value bucket. Columns follow [`StatSet::stats`] order.
///
/// # Errors
/// Returns `TsIdxError::Resample` for a period that is not a positive whole
/// number of milliseconds, for more than `max_rows` output rows, or when a
/// label is out of range.
pub fn downsample(
    table: &CanonicalTable,
    period: TimeDelta,
    tz: Tz,
    stats: StatSet,
    names: StatNames<'_>,
    max_rows: usize,
) -> Result<CanonicalTable, TsIdxError> {
    let p = period_millis(period)?;
    let stats: Vec<Stat> = stats.stats().collect();
    let index = table.index();
    let values = table.values();

    let (Some(first), Some(last)) = (index.first(), index.last()) else {
        let columns = stats
            .iter()
            .map(|s| {
                Column::new(
                    s.column_name(names.name, names.value_field),
                    ColumnData::Float(Vec::new()),
                )
            })
            .collect();
        return Ok(CanonicalTable::from_parts_unchecked(
            table.index_name().to_string(),
            Vec::new(),
            columns,
        ));
    };

    let grid = Grid::starting_day(*first, p, tz);
    let start = grid.ceil(first.timestamp_millis())?;
    let end = grid.ceil(last.timestamp_millis())?;
    let n = grid_len(start, end, p, max_rows)?;

    let mut buckets: Vec<Option<BucketAgg>> = vec![None; n];
    for (ts, v) in index.iter().zip(values) {
        if v.is_nan() {
            continue;
        }
        let label = grid.ceil(ts.timestamp_millis())?;
        let Ok(slot) = usize::try_from((label - start) / p) else {
            continue;
        };
        match buckets.get_mut(slot) {
            Some(Some(agg)) => agg.push(v),
            Some(empty) => *empty = Some(BucketAgg::new(v)),
            None => {}
        }
    }

    let mut out_index = Vec::with_capacity(n);
    for k in 0..n {
        out_index.push(tick(start + (k as i64) * p)?);
    }
    let columns = stats
        .iter()
        .map(|&s| {
            Column::new(
                s.column_name(names.name, names.value_field),
                ColumnData::Float(
                    buckets
                        .iter()
                        .map(|b| b.as_ref().and_then(|agg| agg.stat(s)))
                        .collect(),
                ),
            )
        })
        .collect();

    Ok(CanonicalTable::from_parts_unchecked(
        table.index_name().to_string(),
        out_index,
        columns,
    ))
}
