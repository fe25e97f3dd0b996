//! Datetime parsing, timezone localization and millisecond rounding.

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::timeseries::util::push_warning;
use crate::{TsIdxError, Warning};

/// Datetime formats tried, in order, by [`LenientDateParser::parse_lenient`].
///
/// Month-first numeric dates are tried before day-first ones.
pub const LENIENT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m-%d-%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M:%S%.f",
    "%d-%b-%Y %H:%M:%S%.f",
    "%d %b %Y %H:%M:%S%.f",
    "%b %d %Y %H:%M:%S%.f",
    "%b %d, %Y %H:%M:%S%.f",
    "%Y%m%dT%H%M%S",
    "%Y%m%d %H%M%S",
];

/// Date-only formats tried after [`LENIENT_DATETIME_FORMATS`].
pub const LENIENT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%Y%m%d",
];

/// Swappable date parsing strategy.
pub trait DateParser: Send + Sync + core::fmt::Debug {
    /// Parse `text` with exactly `format`, interpreting naive results in `tz`.
    fn parse_strict(&self, text: &str, format: &str, tz: Tz) -> Option<DateTime<Utc>>;

    /// Best-effort parse of `text`, interpreting naive results in `tz`.
    fn parse_lenient(&self, text: &str, tz: Tz) -> Option<DateTime<Utc>>;
}

/// Default parser built on `chrono` format strings.
///
/// Strict parsing tries `format` as a datetime and then as a date. Lenient
/// parsing tries RFC 3339, RFC 2822, [`LENIENT_DATETIME_FORMATS`],
/// [`LENIENT_DATE_FORMATS`] and finally Unix epoch seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientDateParser;

impl DateParser for LenientDateParser {
    fn parse_strict(&self, text: &str, format: &str, tz: Tz) -> Option<DateTime<Utc>> {
        let s = text.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(localize(dt, tz));
        }
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(s, format)
            .ok()
            .map(|d| localize(d.and_time(NaiveTime::MIN), tz))
    }

    fn parse_lenient(&self, text: &str, tz: Tz) -> Option<DateTime<Utc>> {
        let s = text.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in LENIENT_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(localize(dt, tz));
            }
        }
        for fmt in LENIENT_DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return Some(localize(d.and_time(NaiveTime::MIN), tz));
            }
        }
        s.parse::<f64>().ok().and_then(from_epoch_seconds)
    }
}

/// Interpret a naive local datetime in `tz`.
///
/// Ambiguous local times resolve to the earlier instant; nonexistent local
/// times (inside a DST gap) are read as UTC.
#[must_use]
pub fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(a, b) => a.with_timezone(&Utc).min(b.with_timezone(&Utc)),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

/// Resolve an optional IANA timezone name. Unknown names record a warning and yield UTC.
pub fn resolve_timezone(name: Option<&str>, warnings: &mut Vec<Warning>) -> Tz {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        None => Tz::UTC,
        Some(n) => n.parse::<Tz>().unwrap_or_else(|_| {
            push_warning(
                warnings,
                Warning::UnknownTimezone {
                    name: n.to_string(),
                },
            );
            Tz::UTC
        }),
    }
}

/// Unix epoch seconds (fractional allowed) to a UTC datetime.
#[must_use]
pub fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = ((secs - whole) * 1e9).round() as i64;
    DateTime::from_timestamp(whole as i64, 0)?.checked_add_signed(TimeDelta::nanoseconds(nanos))
}

/// Round to the nearest millisecond, ties to even.
#[must_use]
pub fn round_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = i64::from(ts.timestamp_subsec_nanos());
    let rem = nanos % 1_000_000;
    if rem == 0 {
        return ts;
    }
    let Some(floor) = ts.checked_sub_signed(TimeDelta::nanoseconds(rem)) else {
        return ts;
    };
    let ms_is_odd = (nanos / 1_000_000) % 2 == 1;
    let round_up = rem > 500_000 || (rem == 500_000 && ms_is_odd);
    if round_up {
        floor
            .checked_add_signed(TimeDelta::milliseconds(1))
            .unwrap_or(floor)
    } else {
        floor
    }
}

/// If `ts` falls exactly on local midnight in `tz`, move it to the last
/// millisecond of that local day.
#[must_use]
pub fn end_of_day_if_midnight(ts: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local = ts.with_timezone(&tz);
    if local.time() != NaiveTime::MIN {
        return ts;
    }
    local
        .date_naive()
        .succ_opt()
        .map(|next| localize(next.and_time(NaiveTime::MIN), tz))
        .and_then(|next| next.checked_sub_signed(TimeDelta::milliseconds(1)))
        .unwrap_or(ts)
}

/// Parse a construction time bound.
///
/// End bounds that land on midnight are extended through the end of the day,
/// so `end = "2020-01-31"` includes every sample on January 31st.
///
/// # Errors
/// Returns `TsIdxError::InvalidDate` when the text cannot be parsed.
pub fn parse_bound(
    parser: &dyn DateParser,
    text: &str,
    is_end: bool,
    tz: Tz,
) -> Result<DateTime<Utc>, TsIdxError> {
    let ts = parser
        .parse_lenient(text, tz)
        .ok_or_else(|| TsIdxError::InvalidDate(format!("unrecognized datetime {text:?}")))?;
    let ts = round_to_millis(ts);
    Ok(if is_end {
        end_of_day_if_midnight(ts, tz)
    } else {
        ts
    })
}
