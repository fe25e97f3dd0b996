use chrono::TimeDelta;
use tsidx_core::{TsIdxError, format_period, parse_period};

#[test]
fn pandas_aliases() {
    assert_eq!(parse_period("L").unwrap(), TimeDelta::milliseconds(1));
    assert_eq!(parse_period("250ms").unwrap(), TimeDelta::milliseconds(250));
    assert_eq!(parse_period("S").unwrap(), TimeDelta::seconds(1));
    assert_eq!(parse_period("2S").unwrap(), TimeDelta::seconds(2));
    assert_eq!(parse_period("30s").unwrap(), TimeDelta::seconds(30));
    assert_eq!(parse_period("5sec").unwrap(), TimeDelta::seconds(5));
    assert_eq!(parse_period("15T").unwrap(), TimeDelta::minutes(15));
    assert_eq!(parse_period("5min").unwrap(), TimeDelta::minutes(5));
    assert_eq!(parse_period("H").unwrap(), TimeDelta::hours(1));
    assert_eq!(parse_period("D").unwrap(), TimeDelta::days(1));
    assert_eq!(parse_period("2W").unwrap(), TimeDelta::weeks(2));
}

#[test]
fn humantime_durations() {
    assert_eq!(parse_period("1h 30m").unwrap(), TimeDelta::minutes(90));
    assert_eq!(parse_period("2days").unwrap(), TimeDelta::days(2));
    assert_eq!(parse_period("1s 500ms").unwrap(), TimeDelta::milliseconds(1500));
}

#[test]
fn rejected_periods() {
    for bad in ["", "0S", "-1S", "M", "3M", "1month", "2 years", "1y", "10us", "1.5h", "fortnight"] {
        assert!(
            matches!(parse_period(bad), Err(TsIdxError::InvalidPeriod(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn formatting() {
    assert_eq!(format_period(TimeDelta::seconds(1)), "1s");
    assert_eq!(format_period(TimeDelta::minutes(90)), "1h 30m");
    assert_eq!(format_period(TimeDelta::milliseconds(250)), "250ms");
}
