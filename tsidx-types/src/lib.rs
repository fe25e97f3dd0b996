//! Error, configuration, and report types shared across the tsidx workspace.
#![warn(missing_docs)]

mod config;
mod error;
mod reports;

pub use config::{
    ContainerConfig, DEFAULT_MAX_RESAMPLE_ROWS, DEFAULT_SKIP_LEADING_ROWS,
    DEFAULT_SOURCE_TIME_FORMAT, DEFAULT_TIMESTAMP_FIELD, Stat, StatSet,
};
pub use error::{FieldRole, TsIdxError};
pub use reports::{
    BoundSide, BuildReport, FallbackRule, MutationReport, ResampleOutcome, ResampleReport, Warning,
};
