//! tsidx-core
//!
//! Tabular adapters, the canonical table, and the algorithms behind the
//! `tsidx` container.
//!
//! - `table`: typed source tables and the canonical time-indexed table.
//! - `datetime`: swappable date parsing, timezone localization, rounding.
//! - `timeseries`: normalization, filtering, inference, resampling, merging.
//!
//! Logging
//! -------
//! With the `tracing` feature enabled, every [`Warning`] recorded by these
//! functions is also emitted with `tracing::warn!`.
#![warn(missing_docs)]

/// Datetime parsing and rounding.
pub mod datetime;
/// Typed tabular input and the canonical table.
pub mod table;
/// Time-series algorithms over canonical tables.
pub mod timeseries;

pub use datetime::{DateParser, LenientDateParser, parse_bound, round_to_millis};
pub use table::{
    CanonicalTable, Column, ColumnData, DataType, FieldNames, IntoSourceTable, RowKey, Scalar,
    SourceTable,
};
pub use timeseries::bounds::reconcile_bounds;
pub use timeseries::expr::Expr;
pub use timeseries::filter::{ValueFilter, ValuePredicate, filter_table};
pub use timeseries::infer::{estimate_step, infer_sample_period};
pub use timeseries::merge::merge_last_wins;
pub use timeseries::normalize::{NormalizeOptions, normalize};
pub use timeseries::period::{format_period, parse_period};
pub use timeseries::resample::{StatNames, downsample, stats_from_selector, upsample};
pub use tsidx_types::*;

pub use chrono_tz::Tz;
