use chrono::TimeDelta;
use tsidx_core::timeseries::period::period_to_std;
use tsidx_core::timeseries::util::push_warning;
use tsidx_core::{StatNames, downsample, parse_period, stats_from_selector, upsample};
use tsidx_types::{ResampleOutcome, ResampleReport, StatSet, TsIdxError, Warning};

use crate::TsIdxData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Same,
    Up,
    Down,
}

impl TsIdxData {
    /// Resample onto a new period given as text, e.g. `"15min"`, `"2S"` or `"1h 30m"`.
    ///
    /// Behavior and trade-offs:
    /// - A missing or unparsable period falls back to one second with a warning.
    /// - A target equal to the current period changes nothing.
    /// - A finer target upsamples: each tick carries the most recent value
    ///   forward. A non-empty `stats` selector is ignored with a warning.
    /// - A coarser target downsamples, computing the statistics named by
    ///   `stats` (see [`StatSet::parse_selector`]; mean when blank or unknown).
    /// - On failure the table and period stay as they were and the report
    ///   carries [`Warning::ResampleFailed`].
    pub fn resample(&mut self, period: Option<&str>, stats: Option<&str>) -> ResampleReport {
        let mut warnings = Vec::new();
        let target = match period.map(str::trim).filter(|p| !p.is_empty()) {
            None => {
                push_warning(&mut warnings, Warning::MissingPeriod);
                TimeDelta::seconds(1)
            }
            Some(text) => parse_period(text).unwrap_or_else(|e| {
                push_warning(
                    &mut warnings,
                    Warning::InvalidPeriod {
                        input: text.to_string(),
                        reason: e.to_string(),
                    },
                );
                TimeDelta::seconds(1)
            }),
        };

        let selector = stats.map(str::trim).filter(|s| !s.is_empty());
        let stat_set = match self.direction(target) {
            Some(Direction::Down) => stats_from_selector(selector, &mut warnings),
            Some(Direction::Up) => {
                if let Some(sel) = selector {
                    push_warning(
                        &mut warnings,
                        Warning::StatsIgnoredOnUpsample {
                            selector: sel.to_string(),
                        },
                    );
                }
                StatSet::MEAN
            }
            Some(Direction::Same) | None => StatSet::MEAN,
        };
        self.resample_with(target, stat_set, warnings)
    }

    /// Resample onto `period` with a typed statistics selection.
    ///
    /// An empty `stats` set selects mean. See [`resample`](Self::resample).
    pub fn resample_to(&mut self, period: TimeDelta, stats: StatSet) -> ResampleReport {
        let stats = if stats.is_empty() { StatSet::MEAN } else { stats };
        self.resample_with(period, stats, Vec::new())
    }

    fn direction(&self, target: TimeDelta) -> Option<Direction> {
        let current = self.sample_period?;
        Some(match target.cmp(&current) {
            std::cmp::Ordering::Equal => Direction::Same,
            std::cmp::Ordering::Less => Direction::Up,
            std::cmp::Ordering::Greater => Direction::Down,
        })
    }

    fn resample_with(
        &mut self,
        target: TimeDelta,
        stats: StatSet,
        warnings: Vec<Warning>,
    ) -> ResampleReport {
        let (Some(current), Some(direction)) = (self.sample_period, self.direction(target)) else {
            return failed(
                TsIdxError::resample("sample period is unknown; the container holds no data"),
                warnings,
            );
        };

        let resampled = match direction {
            Direction::Same => {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    name = self.cfg.name.as_str(),
                    period = %tsidx_core::format_period(current),
                    "tsidx: already at the requested period; data unchanged"
                );
                return ResampleReport {
                    outcome: ResampleOutcome::Unchanged,
                    warnings,
                };
            }
            Direction::Up => upsample(
                &self.table,
                target,
                self.tz,
                &self.value_field,
                self.cfg.max_resample_rows,
            ),
            Direction::Down => downsample(
                &self.table,
                target,
                self.tz,
                stats,
                StatNames {
                    name: &self.cfg.name,
                    value_field: &self.value_field,
                },
                self.cfg.max_resample_rows,
            ),
        };

        let table = match resampled {
            Ok(table) => table,
            Err(e) => return failed(e, warnings),
        };

        let from = period_to_std(current).unwrap_or_default();
        let to = period_to_std(target).unwrap_or_default();
        let outcome = if direction == Direction::Up {
            ResampleOutcome::Upsampled { from, to }
        } else {
            ResampleOutcome::Downsampled { from, to }
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            name = self.cfg.name.as_str(),
            from = %tsidx_core::format_period(current),
            to = %tsidx_core::format_period(target),
            rows = table.len(),
            "tsidx: {}",
            if direction == Direction::Up { "upsampled" } else { "downsampled" }
        );

        self.table = table;
        self.sample_period = Some(target);
        ResampleReport { outcome, warnings }
    }
}

fn failed(err: TsIdxError, mut warnings: Vec<Warning>) -> ResampleReport {
    push_warning(
        &mut warnings,
        Warning::ResampleFailed {
            reason: err.to_string(),
        },
    );
    ResampleReport {
        outcome: ResampleOutcome::Failed,
        warnings,
    }
}
