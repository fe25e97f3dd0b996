//! Warning and report envelopes produced by container operations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which side of the time range a bound belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundSide {
    /// Inclusive lower bound.
    Start,
    /// Inclusive upper bound.
    End,
}

/// Rule used when the statistical frequency estimate was unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FallbackRule {
    /// Delta between the rows at positions 3 and 2.
    Rows3And2,
    /// Delta between the rows at positions 1 and 0.
    Rows1And0,
    /// Not enough rows; one second assumed.
    OneSecond,
}

/// A non-fatal condition encountered while processing.
///
/// The operation carried on with a safe default or a best-effort result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Warning {
    /// A construction bound could not be parsed and was ignored.
    InvalidBound {
        /// Side the bound belonged to.
        side: BoundSide,
        /// Original text.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// The configured source timezone is unknown; UTC was used.
    UnknownTimezone {
        /// Timezone name as configured.
        name: String,
    },
    /// Some values could not be converted to floating point and became null.
    ValueCoercion {
        /// Column being coerced.
        column: String,
        /// Number of non-null cells that failed conversion.
        failed: usize,
    },
    /// The strict timestamp format did not match every entry; lenient parsing
    /// was used and unparsable entries became null.
    TimestampCoercion {
        /// Column being coerced.
        column: String,
        /// Number of non-null cells that remained unparsable.
        failed: usize,
    },
    /// The value filter expression is invalid; value filtering was skipped.
    InvalidFilter {
        /// Expression text.
        expr: String,
        /// Compiler diagnostic.
        reason: String,
    },
    /// The sampling frequency could not be inferred statistically.
    FrequencyFallback {
        /// Rows in the table at inference time.
        rows: usize,
        /// Rule that produced the period.
        rule: FallbackRule,
    },
    /// Two rows share a timestamp; a one second period was assumed.
    ZeroSamplePeriod,
    /// No resample period was given; one second was used.
    MissingPeriod,
    /// The resample period could not be parsed; one second was used.
    InvalidPeriod {
        /// Original period text.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// The statistics selector named nothing known; mean was used.
    UnrecognizedStats {
        /// Selector text.
        selector: String,
    },
    /// Statistics were requested for an upsample and were ignored.
    StatsIgnoredOnUpsample {
        /// Selector text.
        selector: String,
    },
    /// Resampling failed; data and period are unchanged.
    ResampleFailed {
        /// Failure description.
        reason: String,
    },
    /// The source passed to append/replace could not be made into a table.
    SourceNotTabular {
        /// Adapter diagnostic.
        reason: String,
    },
}

impl core::fmt::Display for Warning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidBound {
                side,
                input,
                reason,
            } => write!(f, "invalid {side:?} bound {input:?} ignored: {reason}"),
            Self::UnknownTimezone { name } => {
                write!(f, "unknown timezone {name:?}; interpreting timestamps as UTC")
            }
            Self::ValueCoercion { column, failed } => write!(
                f,
                "{failed} value(s) in column {column:?} could not be converted to float"
            ),
            Self::TimestampCoercion { column, failed } => write!(
                f,
                "timestamps in column {column:?} did not match the source format; \
                 {failed} entry(ies) could not be parsed"
            ),
            Self::InvalidFilter { expr, reason } => {
                write!(f, "invalid value filter {expr:?} ignored: {reason}")
            }
            Self::FrequencyFallback { rows, rule } => write!(
                f,
                "could not infer sampling frequency from {rows} row(s); used {rule:?}"
            ),
            Self::ZeroSamplePeriod => {
                f.write_str("two rows share a timestamp; assuming a 1 second period")
            }
            Self::MissingPeriod => f.write_str("no resample period specified; using 1 second"),
            Self::InvalidPeriod { input, reason } => {
                write!(f, "invalid resample period {input:?} ({reason}); using 1 second")
            }
            Self::UnrecognizedStats { selector } => {
                write!(f, "unrecognized stats selector {selector:?}; using mean")
            }
            Self::StatsIgnoredOnUpsample { selector } => write!(
                f,
                "data is being upsampled; stats selector {selector:?} ignored"
            ),
            Self::ResampleFailed { reason } => {
                write!(f, "unable to resample, data unchanged: {reason}")
            }
            Self::SourceNotTabular { reason } => {
                write!(f, "source data could not be used as a table: {reason}")
            }
        }
    }
}

/// Summary of container construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BuildReport {
    /// Rows in the canonical table after normalization and filtering.
    pub rows: usize,
    /// Inferred sampling period, if data was supplied.
    pub sample_period: Option<Duration>,
    /// Non-fatal issues encountered while building.
    pub warnings: Vec<Warning>,
}

/// Summary of an append or replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MutationReport {
    /// Whether the table was modified.
    pub applied: bool,
    /// Row count before the operation.
    pub rows_before: usize,
    /// Rows that survived normalization and filtering of the source.
    pub rows_ingested: usize,
    /// Row count after the operation.
    pub rows_after: usize,
    /// Non-fatal issues encountered.
    pub warnings: Vec<Warning>,
}

/// What a resample did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ResampleOutcome {
    /// Target equals the current period; nothing changed.
    #[default]
    Unchanged,
    /// Forward-filled onto a finer grid.
    Upsampled {
        /// Previous period.
        from: Duration,
        /// New period.
        to: Duration,
    },
    /// Aggregated onto a coarser grid.
    Downsampled {
        /// Previous period.
        from: Duration,
        /// New period.
        to: Duration,
    },
    /// Resampling failed; nothing changed.
    Failed,
}

/// Summary of a resample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResampleReport {
    /// Branch taken.
    pub outcome: ResampleOutcome,
    /// Non-fatal issues encountered.
    pub warnings: Vec<Warning>,
}

impl ResampleReport {
    /// True if the table was rewritten.
    #[must_use]
    pub const fn changed(&self) -> bool {
        matches!(
            self.outcome,
            ResampleOutcome::Upsampled { .. } | ResampleOutcome::Downsampled { .. }
        )
    }
}
