mod helpers;

use chrono::TimeDelta;
use helpers::*;
use tsidx::{
    BoundSide, ContainerConfig, FallbackRule, FieldRole, Scalar, SourceTable, TsIdxData,
    TsIdxError, Warning,
};

#[test]
fn builds_from_string_records() {
    let data = TsIdxData::builder(TEMP)
        .data(four_seconds())
        .build()
        .unwrap();

    assert_eq!(data.name(), TEMP);
    assert_eq!(data.timestamp_field(), "timestamp");
    assert_eq!(data.value_field(), TEMP);
    assert_eq!(data.row_count(), 4);
    assert_eq!(data.columns(), vec![TEMP]);
    assert_eq!(values(&data), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(data.start_ts().unwrap(), dt(2020, 1, 1, 0, 0, 0));
    assert_eq!(data.end_ts().unwrap(), dt(2020, 1, 1, 0, 0, 3));
    assert_eq!(data.sample_period(), Some(TimeDelta::seconds(1)));
    assert!(data.value_filter().is_none());
}

#[test]
fn build_report_counts_rows_and_period() {
    let (data, report) = TsIdxData::builder(TEMP)
        .data(four_seconds())
        .build_with_report()
        .unwrap();
    assert_eq!(report.rows, data.row_count());
    assert_eq!(report.sample_period, Some(std::time::Duration::from_secs(1)));
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn duplicate_timestamps_keep_the_last_row() {
    let data = container(&[(0, 1.0), (0, 2.0), (1, 3.0)]);
    assert_eq!(data.index(), &[ms(0), ms(1000)]);
    assert_eq!(values(&data), vec![2.0, 3.0]);
}

#[test]
fn missing_value_field_is_an_error() {
    let err = TsIdxData::builder(TEMP)
        .value_field("reading")
        .data(four_seconds())
        .build()
        .unwrap_err();
    assert!(err.is_missing_field());
    match err {
        TsIdxError::MissingField {
            role,
            field,
            available,
        } => {
            assert_eq!(role, FieldRole::Value);
            assert_eq!(field, "reading");
            assert_eq!(available, vec!["timestamp".to_string(), TEMP.to_string()]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn missing_timestamp_field_is_an_error() {
    let table = SourceTable::from_records(&["time", TEMP], &[["01/01/2020 00:00:00", "1"]]).unwrap();
    let err = TsIdxData::builder(TEMP).data(table).build().unwrap_err();
    match err {
        TsIdxError::MissingField { role, .. } => assert_eq!(role, FieldRole::Timestamp),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn forced_column_names_are_positional() {
    let table = SourceTable::from_records(
        &["time", "reading"],
        &[["01/01/2020 00:00:00", "1"], ["01/01/2020 00:00:01", "2"]],
    )
    .unwrap();
    let data = TsIdxData::builder(TEMP)
        .force_column_names(true)
        .data(table)
        .build()
        .unwrap();
    assert_eq!(data.columns(), vec![TEMP]);
    assert_eq!(values(&data), vec![1.0, 2.0]);
}

#[test]
fn scalar_data_is_not_tabular() {
    let err = TsIdxData::builder(TEMP)
        .data(Scalar::Float(1.0))
        .build()
        .unwrap_err();
    assert!(matches!(err, TsIdxError::NotTabular(_)), "{err:?}");
}

#[test]
fn container_without_data_is_empty() {
    let data = TsIdxData::builder(TEMP).build().unwrap();
    assert!(data.is_empty());
    assert_eq!(data.sample_period(), None);
    assert_eq!(data.columns(), vec![TEMP]);
    assert!(matches!(
        data.start_ts(),
        Err(TsIdxError::EmptyTable { .. })
    ));
    assert!(matches!(data.end_ts(), Err(TsIdxError::EmptyTable { .. })));
}

#[test]
fn config_from_json_applies_filter_and_start() {
    let cfg: ContainerConfig = serde_json::from_str(
        r#"{"name":"temp","value_filter":"val > 1.5","start":"2020-01-01 00:00:01"}"#,
    )
    .unwrap();
    let data = tsidx::TsIdxDataBuilder::from_config(cfg)
        .data(four_seconds())
        .build()
        .unwrap();
    assert_eq!(data.start_bound(), Some(dt(2020, 1, 1, 0, 0, 1)));
    assert_eq!(values(&data), vec![2.0, 3.0, 4.0]);
}

#[test]
fn date_only_end_bound_covers_the_whole_day() {
    let data = TsIdxData::builder(TEMP)
        .end("2020-01-31")
        .data(vec![
            (dt(2020, 1, 31, 12, 0, 0), 1.0),
            (dt(2020, 1, 31, 23, 59, 59), 2.0),
            (dt(2020, 2, 1, 0, 0, 0), 3.0),
        ])
        .build()
        .unwrap();
    assert_eq!(
        data.end_bound(),
        Some(dt(2020, 2, 1, 0, 0, 0) - TimeDelta::milliseconds(1))
    );
    assert_eq!(values(&data), vec![1.0, 2.0]);
}

#[test]
fn unparsable_bound_is_ignored_with_a_warning() {
    let (data, report) = TsIdxData::builder(TEMP)
        .start("not a date")
        .data(four_seconds())
        .build_with_report()
        .unwrap();
    assert_eq!(data.start_bound(), None);
    assert_eq!(data.row_count(), 4);
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        Warning::InvalidBound {
            side: BoundSide::Start,
            ..
        }
    )));
}

#[test]
fn within_clamps_bounds_to_the_outer_window() {
    let data = TsIdxData::builder(TEMP)
        .start("2020-01-01 00:00:01")
        .within(Some("2020-01-01 00:00:00"), Some("2020-01-01 00:00:02"))
        .data(four_seconds())
        .build()
        .unwrap();
    assert_eq!(data.start_bound(), Some(dt(2020, 1, 1, 0, 0, 1)));
    assert_eq!(data.end_bound(), Some(dt(2020, 1, 1, 0, 0, 2)));
    assert_eq!(values(&data), vec![2.0, 3.0]);
}

#[test]
fn naive_timestamps_use_the_source_timezone() {
    let data = TsIdxData::builder(TEMP)
        .source_timezone("America/New_York")
        .data(four_seconds())
        .build()
        .unwrap();
    assert_eq!(data.start_ts().unwrap(), dt(2020, 1, 1, 5, 0, 0));
}

#[test]
fn unknown_timezone_falls_back_to_utc() {
    let (data, report) = TsIdxData::builder(TEMP)
        .source_timezone("Mars/Olympus_Mons")
        .data(four_seconds())
        .build_with_report()
        .unwrap();
    assert_eq!(data.start_ts().unwrap(), dt(2020, 1, 1, 0, 0, 0));
    assert!(
        report
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::UnknownTimezone { .. }))
    );
}

#[test]
fn invalid_filter_keeps_every_row() {
    let (data, report) = TsIdxData::builder(TEMP)
        .value_filter("val >")
        .data(four_seconds())
        .build_with_report()
        .unwrap();
    assert_eq!(data.row_count(), 4);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::InvalidFilter { .. }))
    );
}

#[test]
fn closure_filter_selects_rows() {
    let data = TsIdxData::builder(TEMP)
        .value_filter_fn(|v| v % 2.0 == 0.0)
        .data(four_seconds())
        .build()
        .unwrap();
    assert_eq!(values(&data), vec![2.0, 4.0]);
}

#[test]
fn filter_rejecting_everything_yields_an_empty_table() {
    let (data, report) = TsIdxData::builder(TEMP)
        .value_filter("val > 100")
        .data(four_seconds())
        .build_with_report()
        .unwrap();
    assert!(data.is_empty());
    assert_eq!(data.columns(), vec![TEMP]);
    assert_eq!(data.sample_period(), Some(TimeDelta::seconds(1)));
    assert!(report.warnings.contains(&Warning::FrequencyFallback {
        rows: 0,
        rule: FallbackRule::OneSecond,
    }));
    assert!(data.start_ts().is_err());
}

#[test]
fn container_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TsIdxData>();
}
