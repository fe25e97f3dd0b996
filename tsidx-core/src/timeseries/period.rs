//! Parsing and formatting of fixed-length resample periods.

use chrono::TimeDelta;

use crate::TsIdxError;

/// Parse a resample period.
///
/// Accepts pandas-style aliases with an optional integer multiplier
/// (`"L"`/`"ms"`, `"S"`/`"s"`/`"sec"`, `"T"`/`"min"`, `"H"`/`"h"`,
/// `"D"`/`"d"`, `"W"`/`"w"`, e.g. `"15T"`, `"2H"`) and any duration that
/// `humantime` understands (`"1h 30m"`, `"250ms"`).
///
/// ```
/// use chrono::TimeDelta;
/// use tsidx_core::timeseries::period::parse_period;
///
/// assert_eq!(parse_period("S").unwrap(), TimeDelta::seconds(1));
/// assert_eq!(parse_period("15T").unwrap(), TimeDelta::minutes(15));
/// assert_eq!(parse_period("1h 30m").unwrap(), TimeDelta::minutes(90));
/// assert!(parse_period("0S").is_err());
/// assert!(parse_period("M").is_err());
/// ```
///
/// # Errors
/// Returns `TsIdxError::InvalidPeriod` for unparsable text and for periods
/// that are zero, negative, not a whole number of milliseconds, or calendar
/// based (months, quarters, years).
pub fn parse_period(text: &str) -> Result<TimeDelta, TsIdxError> {
    let s = text.trim();
    if s.is_empty() {
        return Err(TsIdxError::InvalidPeriod("empty period".into()));
    }
    if s.starts_with('-') {
        return Err(TsIdxError::InvalidPeriod(format!("{s:?} is negative")));
    }

    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let unit = unit.trim();

    if is_calendar_unit(unit) {
        return Err(TsIdxError::InvalidPeriod(format!(
            "{s:?} is a calendar period, not a fixed duration"
        )));
    }

    let delta = match alias_unit(unit) {
        Some(base) => {
            let mult: i32 = if digits.is_empty() {
                1
            } else {
                digits
                    .parse()
                    .map_err(|_| TsIdxError::InvalidPeriod(format!("bad multiplier in {s:?}")))?
            };
            base.checked_mul(mult)
                .ok_or_else(|| TsIdxError::InvalidPeriod(format!("{s:?} is too large")))?
        }
        None => {
            if s.split(|c: char| !c.is_ascii_alphabetic())
                .any(is_calendar_unit)
            {
                return Err(TsIdxError::InvalidPeriod(format!(
                    "{s:?} is a calendar period, not a fixed duration"
                )));
            }
            let std = humantime::parse_duration(s)
                .map_err(|e| TsIdxError::InvalidPeriod(format!("{s:?}: {e}")))?;
            TimeDelta::from_std(std)
                .map_err(|_| TsIdxError::InvalidPeriod(format!("{s:?} is too large")))?
        }
    };

    if delta <= TimeDelta::zero() {
        return Err(TsIdxError::InvalidPeriod(format!("{s:?} is zero")));
    }
    if delta.subsec_nanos() % 1_000_000 != 0 {
        return Err(TsIdxError::InvalidPeriod(format!(
            "{s:?} is not a whole number of milliseconds"
        )));
    }
    Ok(delta)
}

fn alias_unit(unit: &str) -> Option<TimeDelta> {
    Some(match unit {
        "L" | "ms" => TimeDelta::milliseconds(1),
        "S" | "s" | "sec" => TimeDelta::seconds(1),
        "T" | "min" => TimeDelta::minutes(1),
        "H" | "h" => TimeDelta::hours(1),
        "D" | "d" => TimeDelta::days(1),
        "W" | "w" => TimeDelta::weeks(1),
        _ => return None,
    })
}

fn is_calendar_unit(unit: &str) -> bool {
    matches!(
        unit,
        "M" | "MS" | "BM" | "BMS" | "Q" | "QS" | "BQ" | "A" | "AS" | "Y" | "YS" | "y"
            | "month" | "months" | "year" | "years"
    )
}

/// Render a period for display, e.g. `"15m"` or `"1h 30m"`.
#[must_use]
pub fn format_period(period: TimeDelta) -> String {
    period.to_std().map_or_else(
        |_| format!("{period}"),
        |d| humantime::format_duration(d).to_string(),
    )
}

/// Convert a period into a `std::time::Duration` for reports.
#[must_use]
pub fn period_to_std(period: TimeDelta) -> Option<std::time::Duration> {
    period.to_std().ok()
}
