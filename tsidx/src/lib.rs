//! tsidx keeps a single time series in a canonical, timestamp-indexed table.
//!
//! Overview
//! - Accepts heterogeneous tabular input (string records, typed columns,
//!   timestamp/value pairs) and normalizes it: timestamp and value columns
//!   are located by name or position, coerced, rounded to the millisecond,
//!   de-duplicated (last occurrence wins) and sorted.
//! - Applies an optional value predicate and an inclusive time window.
//! - Infers the sampling period and resamples onto a new period, forward
//!   filling when upsampling and computing per-bucket statistics when
//!   downsampling.
//! - Appends or replaces data in place, keeping the table canonical.
//!
//! Key behaviors and trade-offs
//! - Non-fatal problems (unparsable bounds, invalid filters, failed
//!   resamples, non-tabular sources) never abort an operation: the container
//!   keeps a safe default and reports a [`Warning`] in the operation's report.
//! - Only a missing timestamp or value dimension is a hard error; the
//!   container is left unchanged when it happens.
//! - Resampling uses a grid anchored at local midnight of the first day.
//!   Downsampled buckets are right closed and right labeled; empty buckets
//!   hold nulls.
//!
//! Examples
//! Building a container from string records and downsampling it:
//! ```rust
//! use tsidx::{SourceTable, TsIdxData};
//!
//! let table = SourceTable::from_records(
//!     &["timestamp", "temp"],
//!     &[
//!         ["01/01/2020 00:00:00", "1.0"],
//!         ["01/01/2020 00:00:01", "2.0"],
//!         ["01/01/2020 00:00:02", "3.0"],
//!         ["01/01/2020 00:00:03", "4.0"],
//!     ],
//! )?;
//! let mut temp = TsIdxData::builder("temp").data(table).build()?;
//! assert_eq!(temp.row_count(), 4);
//!
//! let report = temp.resample(Some("2S"), Some("min, max"));
//! assert!(report.changed());
//! assert_eq!(temp.columns(), vec!["min_temp", "max_temp"]);
//! # Ok::<(), tsidx::TsIdxError>(())
//! ```
//!
//! Logging
//! -------
//! With the default `tracing` feature, warnings are emitted with
//! `tracing::warn!` where they occur and operation summaries with
//! `tracing::info!`. Install a subscriber (for example `tracing-subscriber`)
//! to see them.
#![warn(missing_docs)]

pub(crate) mod core;
mod ops;

pub use crate::core::{TsIdxData, TsIdxDataBuilder};

pub use tsidx_core::{
    CanonicalTable, Column, ColumnData, DataType, DateParser, FieldNames, IntoSourceTable,
    LenientDateParser, RowKey, Scalar, SourceTable, Tz, ValueFilter, ValuePredicate,
    format_period, parse_period, reconcile_bounds,
};
pub use tsidx_types::{
    BoundSide, BuildReport, ContainerConfig, DEFAULT_MAX_RESAMPLE_ROWS, DEFAULT_SKIP_LEADING_ROWS,
    DEFAULT_SOURCE_TIME_FORMAT, DEFAULT_TIMESTAMP_FIELD, FallbackRule, FieldRole, MutationReport,
    ResampleOutcome, ResampleReport, Stat, StatSet, TsIdxError, Warning,
};
