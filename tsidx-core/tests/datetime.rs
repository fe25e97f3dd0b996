use chrono::{DateTime, TimeZone, Utc};
use tsidx_core::datetime::{end_of_day_if_midnight, localize, resolve_timezone};
use tsidx_core::{DateParser, LenientDateParser, Tz, Warning, parse_bound, round_to_millis};

fn ns(n: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(n)
}

#[test]
fn millisecond_rounding_is_half_even() {
    assert_eq!(round_to_millis(ns(1_400_000)), ns(1_000_000));
    assert_eq!(round_to_millis(ns(1_600_000)), ns(2_000_000));
    assert_eq!(round_to_millis(ns(1_500_000)), ns(2_000_000));
    assert_eq!(round_to_millis(ns(2_500_000)), ns(2_000_000));
    assert_eq!(round_to_millis(ns(999_500_000)), ns(1_000_000_000));
    assert_eq!(round_to_millis(ns(-1_500_000)), ns(-2_000_000));
}

#[test]
fn lenient_formats() {
    let p = LenientDateParser;
    let utc = Tz::UTC;
    let expect = Utc.with_ymd_and_hms(1990, 4, 20, 0, 0, 0).unwrap();
    for s in ["4/20/1990", "1990-04-20", "20-Apr-1990", "Apr 20, 1990", "1990/04/20", "19900420"] {
        assert_eq!(p.parse_lenient(s, utc), Some(expect), "{s}");
    }
    assert_eq!(
        p.parse_lenient("2020-01-02T03:04:05.678+01:00", utc),
        Some(Utc.with_ymd_and_hms(2020, 1, 2, 2, 4, 5).unwrap() + chrono::TimeDelta::milliseconds(678))
    );
    assert_eq!(p.parse_lenient("86400", utc), Some(Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap()));
    assert_eq!(p.parse_lenient("not a date", utc), None);
    assert_eq!(p.parse_lenient("", utc), None);
}

#[test]
fn strict_parse_requires_format() {
    let p = LenientDateParser;
    let fmt = "%m/%d/%Y %H:%M:%S%.f";
    assert!(p.parse_strict("01/02/2020 10:00:00.5", fmt, Tz::UTC).is_some());
    assert!(p.parse_strict("2020-01-02 10:00:00", fmt, Tz::UTC).is_none());
}

#[test]
fn end_bounds_at_midnight_cover_the_day() {
    let end = parse_bound(&LenientDateParser, "2020-01-31", true, Tz::UTC).unwrap();
    assert_eq!(end, Utc.with_ymd_and_hms(2020, 1, 31, 23, 59, 59).unwrap() + chrono::TimeDelta::milliseconds(999));
    let start = parse_bound(&LenientDateParser, "2020-01-31", false, Tz::UTC).unwrap();
    assert_eq!(start, Utc.with_ymd_and_hms(2020, 1, 31, 0, 0, 0).unwrap());
    let noon = parse_bound(&LenientDateParser, "2020-01-31 12:00", true, Tz::UTC).unwrap();
    assert_eq!(noon, Utc.with_ymd_and_hms(2020, 1, 31, 12, 0, 0).unwrap());
    assert!(parse_bound(&LenientDateParser, "someday", false, Tz::UTC).is_err());
}

#[test]
fn end_of_day_follows_local_calendar() {
    let tz: Tz = "Europe/Berlin".parse().unwrap();
    let midnight = localize(
        chrono::NaiveDate::from_ymd_opt(2021, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        tz,
    );
    let eod = end_of_day_if_midnight(midnight, tz);
    assert_eq!(eod, Utc.with_ymd_and_hms(2021, 6, 1, 21, 59, 59).unwrap() + chrono::TimeDelta::milliseconds(999));
}

#[test]
fn ambiguous_local_time_takes_earlier_instant() {
    let tz: Tz = "America/New_York".parse().unwrap();
    // 2021-11-07 01:30 occurs twice (EDT then EST).
    let naive = chrono::NaiveDate::from_ymd_opt(2021, 11, 7).unwrap().and_hms_opt(1, 30, 0).unwrap();
    assert_eq!(localize(naive, tz), Utc.with_ymd_and_hms(2021, 11, 7, 5, 30, 0).unwrap());
}

#[test]
fn unknown_timezone_warns_and_uses_utc() {
    let mut warnings = Vec::new();
    assert_eq!(resolve_timezone(Some("Mars/Olympus"), &mut warnings), Tz::UTC);
    assert_eq!(warnings, vec![Warning::UnknownTimezone { name: "Mars/Olympus".into() }]);
    assert_eq!(resolve_timezone(None, &mut warnings), Tz::UTC);
    assert_eq!(warnings.len(), 1);
}
