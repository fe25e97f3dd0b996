// Shared fixtures so tests can `use helpers::*;`
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use tsidx::{SourceTable, TsIdxData};

// ---------- Lightweight fixtures and helpers for tests ----------

/// Series name used across tests.
pub const TEMP: &str = "temp";
/// Header of the CSV-like fixtures.
pub const HEADER: [&str; 2] = ["timestamp", "temp"];
/// Units row that sits under the header in instrument exports.
pub const UNITS: [&str; 2] = ["", "degC"];

/// Construct a UTC `DateTime` from components for readability in tests.
pub const fn dt(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> DateTime<Utc> {
    let date = chrono::NaiveDate::from_ymd_opt(y, m, d).expect("invalid date");
    let naive = date
        .and_hms_opt(hh, mm, ss)
        .expect("invalid time components");
    DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
}

/// UTC `DateTime` from Unix epoch milliseconds.
pub fn ms(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).expect("timestamp in range")
}

/// `(timestamp, value)` pairs from `(epoch seconds, value)` tuples.
pub fn pairs(points: &[(i64, f64)]) -> Vec<(DateTime<Utc>, f64)> {
    points.iter().map(|&(s, v)| (ms(s * 1000), v)).collect()
}

/// String records under [`HEADER`], timestamps in the default source format.
pub fn records(rows: &[(&str, &str)]) -> SourceTable {
    let rows: Vec<[&str; 2]> = rows.iter().map(|&(t, v)| [t, v]).collect();
    SourceTable::from_records(&HEADER, &rows).expect("rectangular records")
}

/// Like [`records`], with the [`UNITS`] row first.
pub fn records_with_units(rows: &[(&str, &str)]) -> SourceTable {
    let mut all: Vec<[&str; 2]> = vec![UNITS];
    all.extend(rows.iter().map(|&(t, v)| [t, v]));
    SourceTable::from_records(&HEADER, &all).expect("rectangular records")
}

/// Four one-second samples starting at 2020-01-01 00:00:00.
pub fn four_seconds() -> SourceTable {
    records(&[
        ("01/01/2020 00:00:00", "1.0"),
        ("01/01/2020 00:00:01", "2.0"),
        ("01/01/2020 00:00:02", "3.0"),
        ("01/01/2020 00:00:03", "4.0"),
    ])
}

/// Container named [`TEMP`] holding `points` (epoch seconds, value).
pub fn container(points: &[(i64, f64)]) -> TsIdxData {
    TsIdxData::builder(TEMP)
        .data(pairs(points))
        .build()
        .expect("container builds")
}

/// Values of the first column, nulls as NaN.
pub fn values(data: &TsIdxData) -> Vec<f64> {
    data.as_table().values()
}
