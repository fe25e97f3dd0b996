//! Time-series algorithms over canonical tables.
//!
//! Modules include:
//! - `normalize`: turn a source table into canonical form
//! - `filter` / `expr`: value predicates and time-range restriction
//! - `infer`: sample period inference
//! - `period`: resample period parsing and formatting
//! - `resample`: up/downsampling onto a midnight-anchored grid
//! - `merge`: timestamp-keyed merge, last writer wins
//! - `bounds`: reconciliation of nested time ranges
/// Reconciliation of a range with an auxiliary inner range.
pub mod bounds;
/// Value filter expression language.
pub mod expr;
/// Value and time-range filtering.
pub mod filter;
/// Sample period inference.
pub mod infer;
/// Timestamp-keyed merge of canonical tables.
pub mod merge;
/// Source-to-canonical normalization pipeline.
pub mod normalize;
/// Resample period parsing.
pub mod period;
/// Up- and downsampling.
pub mod resample;
/// Warning collection helpers.
pub mod util;
