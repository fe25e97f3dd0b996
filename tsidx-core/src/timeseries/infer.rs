use chrono::{DateTime, TimeDelta, Utc};

use crate::timeseries::util::push_warning;
use crate::{FallbackRule, Warning};

/// Estimate the sampling step of an ascending index from its positive
/// adjacent deltas.
///
/// Returns the unique mode of the deltas. Returns `None` when fewer than
/// three rows are present or when two or more deltas tie for most frequent.
///
/// ```
/// use chrono::{DateTime, TimeDelta};
/// use tsidx_core::timeseries::infer::estimate_step;
///
/// let t = |s: i64| DateTime::from_timestamp(s, 0).unwrap();
/// // deltas 60,60,60,120,180 => 60
/// let idx = vec![t(0), t(60), t(120), t(180), t(300), t(480)];
/// assert_eq!(estimate_step(&idx), Some(TimeDelta::seconds(60)));
/// // deltas 60,60,120,120 => tie
/// let idx = vec![t(0), t(60), t(120), t(240), t(360)];
/// assert_eq!(estimate_step(&idx), None);
/// ```
#[must_use]
pub fn estimate_step(index: &[DateTime<Utc>]) -> Option<TimeDelta> {
    if index.len() < 3 {
        return None;
    }

    let mut deltas: Vec<TimeDelta> = index
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > TimeDelta::zero())
        .collect();
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();

    let mut best_delta = deltas[0];
    let mut best_count: usize = 0;
    let mut num_best_candidates: usize = 0;

    let mut cur_delta = deltas[0];
    let mut cur_count: usize = 1;
    for &d in deltas.iter().skip(1) {
        if d == cur_delta {
            cur_count += 1;
            continue;
        }
        if cur_count > best_count {
            best_count = cur_count;
            best_delta = cur_delta;
            num_best_candidates = 1;
        } else if cur_count == best_count {
            num_best_candidates = num_best_candidates.saturating_add(1);
        }
        cur_delta = d;
        cur_count = 1;
    }
    if cur_count > best_count {
        best_delta = cur_delta;
        num_best_candidates = 1;
    } else if cur_count == best_count {
        num_best_candidates = num_best_candidates.saturating_add(1);
    }

    (num_best_candidates == 1).then_some(best_delta)
}

/// Infer the sample period of an ascending index. Never fails.
///
/// Uses [`estimate_step`] first. Without a statistical estimate it falls
/// back to the delta between rows 3 and 2 (four or more rows), then rows 1
/// and 0 (two or three rows), then one second; each fallback records a
/// [`Warning::FrequencyFallback`]. A zero delta becomes one second with a
/// [`Warning::ZeroSamplePeriod`].
pub fn infer_sample_period(index: &[DateTime<Utc>], warnings: &mut Vec<Warning>) -> TimeDelta {
    if let Some(step) = estimate_step(index) {
        return step;
    }

    let rows = index.len();
    let (rule, delta) = if rows >= 4 {
        (FallbackRule::Rows3And2, index[3] - index[2])
    } else if rows >= 2 {
        (FallbackRule::Rows1And0, index[1] - index[0])
    } else {
        (FallbackRule::OneSecond, TimeDelta::seconds(1))
    };
    push_warning(warnings, Warning::FrequencyFallback { rows, rule });

    if delta <= TimeDelta::zero() {
        push_warning(warnings, Warning::ZeroSamplePeriod);
        return TimeDelta::seconds(1);
    }
    delta
}
