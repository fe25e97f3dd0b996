use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which dimension of the input a required field plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldRole {
    /// The timestamp (row key) dimension.
    Timestamp,
    /// The primary value dimension.
    Value,
}

impl core::fmt::Display for FieldRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timestamp => f.write_str("timestamp"),
            Self::Value => f.write_str("value"),
        }
    }
}

/// Unified error type for the tsidx workspace.
///
/// Only conditions that make an operation meaningless are reported as errors.
/// Degraded-but-continues situations are surfaced as
/// [`Warning`](crate::Warning)s inside the operation's report instead.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TsIdxError {
    /// Normalization could not locate a required dimension in the input.
    #[error("missing required {role} field \"{field}\" (available: {available:?})")]
    MissingField {
        /// Role the missing field plays.
        role: FieldRole,
        /// Field name that was looked for.
        field: String,
        /// Column names (and key name, if any) that were present.
        available: Vec<String>,
    },

    /// The supplied source cannot be adapted into a table.
    #[error("source is not tabular: {0}")]
    NotTabular(String),

    /// The value filter expression could not be compiled or evaluated.
    #[error("invalid value filter: {0}")]
    InvalidFilter(String),

    /// A resample period string is unparsable or unsupported.
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// A datetime string could not be interpreted.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The table holds no rows, so the requested value does not exist.
    #[error("table is empty: no {what}")]
    EmptyTable {
        /// Description of the value that was requested, e.g. "start timestamp".
        what: String,
    },

    /// Resampling could not be carried out.
    #[error("resample failed: {0}")]
    Resample(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),
}

impl TsIdxError {
    /// Helper: build a `MissingField` error.
    pub fn missing_field(
        role: FieldRole,
        field: impl Into<String>,
        available: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::MissingField {
            role,
            field: field.into(),
            available: available.into_iter().collect(),
        }
    }

    /// Helper: build an `EmptyTable` error for a description of the missing value.
    pub fn empty_table(what: impl Into<String>) -> Self {
        Self::EmptyTable { what: what.into() }
    }

    /// Helper: build a `NotTabular` error.
    pub fn not_tabular(msg: impl Into<String>) -> Self {
        Self::NotTabular(msg.into())
    }

    /// Helper: build a `Resample` error.
    pub fn resample(msg: impl Into<String>) -> Self {
        Self::Resample(msg.into())
    }

    /// True when the error is the non-recoverable missing-field precondition.
    #[must_use]
    pub const fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }
}
