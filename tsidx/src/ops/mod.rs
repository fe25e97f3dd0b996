//! Operations on [`TsIdxData`](crate::TsIdxData), one concern per module.

mod display;
mod mutate;
mod resample;
